//! Core formatting traits and implementations
//!
//! Defines the output formatting interface and a plain text implementation
//! with table formatting.

use crate::{
    error::{AppError, Result},
    models::MeasurementRecord,
    presenter::{format_ping, format_speed, ResultsPresenter},
};
use std::fmt::Write as _;

/// Printed instead of an empty history table
pub const NO_HISTORY_MESSAGE: &str = "No speed tests recorded yet";

/// Main trait for output formatting
pub trait OutputFormatter {
    /// Format a header section
    fn format_header(&self, title: &str) -> Result<String>;

    /// Format the three result cards as currently shown
    fn format_results(&self, presenter: &ResultsPresenter) -> Result<String>;

    /// Format recorded tests as a table, oldest first
    fn format_history_table(&self, records: &[MeasurementRecord]) -> Result<String>;

    /// Format error messages
    fn format_error(&self, error: &str) -> Result<String>;

    /// Format warning messages
    fn format_warning(&self, warning: &str) -> Result<String>;

    /// Format success messages
    fn format_success(&self, message: &str) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Show table borders
    pub table_borders: bool,
    /// Maximum output width
    pub max_width: usize,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            table_borders: true,
            max_width: 120,
        }
    }
}

/// Table formatting configuration
#[derive(Debug, Clone)]
pub struct TableFormat {
    pub columns: Vec<Column>,
    pub show_borders: bool,
    pub show_header: bool,
}

/// Column definition for table formatting
#[derive(Debug, Clone)]
pub struct Column {
    pub header: String,
    pub alignment: Alignment,
    pub min_width: usize,
}

impl Column {
    pub fn new(header: &str, alignment: Alignment, min_width: usize) -> Self {
        Self { header: header.to_string(), alignment, min_width }
    }
}

/// Text alignment options
#[derive(Debug, Clone, Copy)]
pub enum Alignment {
    Left,
    Right,
}

/// Row data for table formatting
pub type RowData = Vec<String>;

/// Column layout of the history table
pub(crate) fn history_table_format(show_borders: bool) -> TableFormat {
    TableFormat {
        columns: vec![
            Column::new("#", Alignment::Right, 2),
            Column::new("Time", Alignment::Left, 16),
            Column::new("Ping", Alignment::Right, 6),
            Column::new("Download", Alignment::Right, 12),
            Column::new("Upload", Alignment::Right, 12),
        ],
        show_borders,
        show_header: true,
    }
}

/// One table row per record, numbered from 1
pub(crate) fn history_rows(records: &[MeasurementRecord]) -> Vec<RowData> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            vec![
                (i + 1).to_string(),
                record.timestamp_label(),
                format_ping(record.ping_ms()),
                format_speed(record.download_mbps()),
                format_speed(record.upload_mbps()),
            ]
        })
        .collect()
}

fn fmt_err(e: std::fmt::Error) -> AppError {
    AppError::io(format!("Failed to format output: {}", e))
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    /// Create a table with the given format and data
    pub(crate) fn create_table(&self, format: &TableFormat, rows: &[RowData]) -> String {
        if rows.is_empty() {
            return String::new();
        }

        let column_widths = self.calculate_column_widths(format, rows);
        let mut output = String::new();

        if format.show_header && !format.columns.is_empty() {
            if format.show_borders {
                output.push_str(&self.create_horizontal_border(&column_widths));
                output.push('\n');
            }

            let headers: Vec<String> = format.columns.iter().map(|c| c.header.clone()).collect();
            output.push_str(&self.create_row(&headers, &column_widths, format));
            output.push('\n');

            if format.show_borders {
                output.push_str(&self.create_horizontal_border(&column_widths));
                output.push('\n');
            }
        }

        for row in rows {
            output.push_str(&self.create_row(row, &column_widths, format));
            output.push('\n');
        }

        if format.show_borders {
            output.push_str(&self.create_horizontal_border(&column_widths));
        }

        output
    }

    fn calculate_column_widths(&self, format: &TableFormat, rows: &[RowData]) -> Vec<usize> {
        let num_columns = format.columns.len().max(rows.iter().map(|r| r.len()).max().unwrap_or(0));
        let cap = self.options.max_width / num_columns.max(1);

        (0..num_columns)
            .map(|col_idx| {
                let mut width = format
                    .columns
                    .get(col_idx)
                    .map(|c| c.min_width.max(c.header.len()))
                    .unwrap_or(0);

                for row in rows {
                    if let Some(cell) = row.get(col_idx) {
                        width = width.max(cell.chars().count());
                    }
                }

                width.min(cap)
            })
            .collect()
    }

    fn create_row(&self, data: &[String], widths: &[usize], format: &TableFormat) -> String {
        let mut row = String::new();

        if format.show_borders {
            row.push('|');
        }

        for (idx, (cell, &width)) in data.iter().zip(widths.iter()).enumerate() {
            let alignment = format.columns.get(idx).map(|c| c.alignment).unwrap_or(Alignment::Left);

            if format.show_borders {
                row.push(' ');
            }
            row.push_str(&align_text(cell, width, alignment));
            if format.show_borders {
                row.push_str(" |");
            } else {
                row.push_str("  ");
            }
        }

        row.trim_end().to_string()
    }

    fn create_horizontal_border(&self, widths: &[usize]) -> String {
        let mut border = String::new();

        if !widths.is_empty() {
            border.push('+');
            for &width in widths {
                border.push_str(&"-".repeat(width + 2));
                border.push('+');
            }
        }

        border
    }
}

/// Align text within specified width, truncating if needed
pub(crate) fn align_text(text: &str, width: usize, alignment: Alignment) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.chars().take(width).collect();
    }

    let padding = width - len;
    match alignment {
        Alignment::Left => format!("{}{}", text, " ".repeat(padding)),
        Alignment::Right => format!("{}{}", " ".repeat(padding), text),
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let mut output = String::new();
        let border = "=".repeat(title.chars().count() + 4);

        writeln!(output, "{}", border).map_err(fmt_err)?;
        writeln!(output, "  {}  ", title).map_err(fmt_err)?;
        write!(output, "{}", border).map_err(fmt_err)?;

        Ok(output)
    }

    fn format_results(&self, presenter: &ResultsPresenter) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "Ping:      {}", presenter.ping_text()).map_err(fmt_err)?;
        writeln!(output, "Download:  {}", presenter.download_text()).map_err(fmt_err)?;
        write!(output, "Upload:    {}", presenter.upload_text()).map_err(fmt_err)?;

        Ok(output)
    }

    fn format_history_table(&self, records: &[MeasurementRecord]) -> Result<String> {
        if records.is_empty() {
            return Ok(NO_HISTORY_MESSAGE.to_string());
        }

        let format = history_table_format(self.options.table_borders);
        Ok(self.create_table(&format, &history_rows(records)))
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("ERROR: {}", error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("WARNING: {}", warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("SUCCESS: {}", message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SpeedSample;
    use chrono::NaiveDate;

    fn formatter() -> PlainFormatter {
        PlainFormatter::new(FormattingOptions { enable_color: false, ..Default::default() })
    }

    fn record(minute: u32, down: f64) -> MeasurementRecord {
        let at = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(21, minute, 0).unwrap();
        SpeedSample::new(18.2, down, 9.5).into_record(at)
    }

    #[test]
    fn test_header() {
        let header = formatter().format_header("Speed Test").unwrap();
        assert_eq!(header, "==============\n  Speed Test  \n==============");
    }

    #[test]
    fn test_results_use_presenter_text() {
        let mut presenter = ResultsPresenter::new();
        presenter.show_result(23.6, 94.2137, 11.25);

        let output = formatter().format_results(&presenter).unwrap();
        assert!(output.contains("Ping:      24 ms"));
        assert!(output.contains("Download:  94.21 Mbps"));
        assert!(output.contains("Upload:    11.25 Mbps"));
    }

    #[test]
    fn test_failed_run_shows_error_on_download() {
        let mut presenter = ResultsPresenter::new();
        presenter.show_running();
        presenter.show_error();

        let output = formatter().format_results(&presenter).unwrap();
        assert!(output.contains("Ping:      -- ms"));
        assert!(output.contains("Download:  Error"));
        assert!(output.contains("Upload:    -- Mbps"));
    }

    #[test]
    fn test_empty_history_message() {
        assert_eq!(formatter().format_history_table(&[]).unwrap(), NO_HISTORY_MESSAGE);
    }

    #[test]
    fn test_history_table_layout() {
        let table = formatter()
            .format_history_table(&[record(1, 120.0), record(2, 95.456)])
            .unwrap();
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("+----+"));
        assert!(lines[1].contains("Time"));
        assert!(lines[3].contains("2024-03-09 21:01"));
        assert!(lines[3].contains("120.00 Mbps"));
        assert!(lines[4].contains("95.46 Mbps"));
        assert!(lines[4].contains("18 ms"));
        assert!(lines.iter().all(|l| l.chars().count() == lines[0].chars().count()));
    }

    #[test]
    fn test_table_without_borders() {
        let plain = PlainFormatter::new(FormattingOptions { table_borders: false, ..Default::default() });
        let table = plain.format_history_table(&[record(5, 1.0)]).unwrap();
        assert!(!table.contains('|'));
        assert!(table.lines().next().unwrap().starts_with(" #"));
    }

    #[test]
    fn test_align_text() {
        assert_eq!(align_text("ab", 4, Alignment::Left), "ab  ");
        assert_eq!(align_text("ab", 4, Alignment::Right), "  ab");
        assert_eq!(align_text("abcdef", 3, Alignment::Left), "abc");
    }
}
