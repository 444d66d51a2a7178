//! Output formatting and display system
//!
//! Terminal rendering of result cards and the history table, in plain or
//! colored form.

mod colored;
mod formatter;

pub use colored::{ColorScheme, ColoredFormatter, SpeedLevel};
pub use formatter::{
    Alignment, Column, FormattingOptions, OutputFormatter, PlainFormatter, RowData, TableFormat,
    NO_HISTORY_MESSAGE,
};

use crate::{
    controller::RunCompletion,
    error::Result,
    models::MeasurementRecord,
    presenter::ResultsPresenter,
};

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            ..FormattingOptions::default()
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }

    /// Create a plain text formatter for scripts/logs
    pub fn create_plain_formatter() -> Box<dyn OutputFormatter> {
        Self::create_formatter(false)
    }
}

/// Coordinates the terminal modes' output
pub struct OutputCoordinator {
    formatter: Box<dyn OutputFormatter>,
}

impl OutputCoordinator {
    pub fn new(formatter: Box<dyn OutputFormatter>) -> Self {
        Self { formatter }
    }

    /// Report of a single headless run
    pub fn display_run(&self, presenter: &ResultsPresenter, completion: &RunCompletion) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.formatter.format_header("Speed Test Results")?);
        output.push_str("\n\n");
        output.push_str(&self.formatter.format_results(presenter)?);
        output.push_str("\n\n");

        match completion {
            RunCompletion::Succeeded(record) => {
                output.push_str(&self.formatter.format_success(&format!("Test recorded at {}", record.timestamp_label()))?);
            }
            RunCompletion::Failed(err) => {
                output.push_str(&self.formatter.format_error(&format!("Speed test error: {}", err))?);
            }
        }

        Ok(output)
    }

    /// History listing with a header
    pub fn display_history(&self, records: &[MeasurementRecord]) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.formatter.format_header("Speed Test History")?);
        output.push_str("\n\n");
        output.push_str(&self.formatter.format_history_table(records)?);

        Ok(output)
    }

    pub fn display_warning(&self, warning: &str) -> Result<String> {
        self.formatter.format_warning(warning)
    }
}
