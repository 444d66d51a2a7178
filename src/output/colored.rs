//! Colored formatter implementation with terminal color support

use super::formatter::{
    align_text, history_rows, history_table_format, FormattingOptions, OutputFormatter, PlainFormatter,
    NO_HISTORY_MESSAGE,
};
use crate::{
    error::Result,
    models::MeasurementRecord,
    presenter::{ResultsPresenter, ERROR_INDICATOR},
};
use colored::*;

/// Throughput classification for color coding
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedLevel {
    Excellent, // >= 100 Mbps
    Good,      // 25-100 Mbps
    Fair,      // 5-25 Mbps
    Poor,      // < 5 Mbps
}

impl SpeedLevel {
    pub fn from_mbps(mbps: f64) -> Self {
        if mbps >= 100.0 {
            Self::Excellent
        } else if mbps >= 25.0 {
            Self::Good
        } else if mbps >= 5.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Red,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        }
    }
}

/// Latency color: green under 30 ms, yellow under 100 ms, red above
fn ping_color(ping_ms: f64) -> Color {
    if ping_ms < 30.0 {
        Color::Green
    } else if ping_ms < 100.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub muted: Color,
    pub border: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            muted: Color::BrightBlack,
            border: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    plain_formatter: PlainFormatter,
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self::with_color_scheme(options, ColorScheme::default())
    }

    pub fn with_color_scheme(options: FormattingOptions, color_scheme: ColorScheme) -> Self {
        let plain_formatter = PlainFormatter::new(options.clone());
        Self { plain_formatter, options, color_scheme }
    }

    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    /// Color a card value; placeholders are muted and the error marker is red
    fn card_value(&self, text: &str, color: Color) -> ColoredString {
        if text == ERROR_INDICATOR {
            self.colorize(text, self.color_scheme.error).bold()
        } else if text.starts_with("--") {
            self.colorize(text, self.color_scheme.muted)
        } else {
            self.colorize(text, color)
        }
    }

    fn leading_number(text: &str) -> Option<f64> {
        text.split_whitespace().next()?.parse().ok()
    }

    fn speed_value(&self, text: &str) -> ColoredString {
        let color = Self::leading_number(text)
            .map(|mbps| SpeedLevel::from_mbps(mbps).color())
            .unwrap_or(self.color_scheme.muted);
        self.card_value(text, color)
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        if !self.options.enable_color {
            return self.plain_formatter.format_header(title);
        }

        let border = "═".repeat(title.chars().count() + 4);
        Ok(format!(
            "{}\n  {}  \n{}",
            border.color(self.color_scheme.header),
            title.bold().color(self.color_scheme.header),
            border.color(self.color_scheme.header)
        ))
    }

    fn format_results(&self, presenter: &ResultsPresenter) -> Result<String> {
        let ping_color = Self::leading_number(presenter.ping_text())
            .map(ping_color)
            .unwrap_or(self.color_scheme.muted);

        Ok(format!(
            "📍 {}      {}\n⬇️  {}  {}\n⬆️  {}    {}",
            self.bold("Ping:"),
            self.card_value(presenter.ping_text(), ping_color),
            self.bold("Download:"),
            self.speed_value(presenter.download_text()),
            self.bold("Upload:"),
            self.speed_value(presenter.upload_text()),
        ))
    }

    fn format_history_table(&self, records: &[MeasurementRecord]) -> Result<String> {
        if records.is_empty() {
            return Ok(self.colorize(NO_HISTORY_MESSAGE, self.color_scheme.muted).to_string());
        }
        if !self.options.enable_color {
            return self.plain_formatter.format_history_table(records);
        }

        let format = history_table_format(false);
        let rows = history_rows(records);

        let widths: Vec<usize> = format
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                rows.iter()
                    .map(|r| r[i].chars().count())
                    .chain([col.min_width, col.header.len()])
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut output = String::new();

        let header: Vec<String> = format
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, &w)| align_text(&col.header, w, col.alignment).bold().color(self.color_scheme.header).to_string())
            .collect();
        output.push_str(&header.join("  "));
        output.push('\n');

        let rule: Vec<String> = widths.iter().map(|&w| "─".repeat(w)).collect();
        output.push_str(&rule.join("  ").color(self.color_scheme.border).to_string());

        for (record, row) in records.iter().zip(&rows) {
            let cells: Vec<String> = format
                .columns
                .iter()
                .zip(&widths)
                .zip(row)
                .enumerate()
                .map(|(i, ((col, &w), cell))| {
                    let padded = align_text(cell, w, col.alignment);
                    match i {
                        0 => padded.color(self.color_scheme.muted).to_string(),
                        2 => padded.color(ping_color(record.ping_ms())).to_string(),
                        3 => padded.color(SpeedLevel::from_mbps(record.download_mbps()).color()).to_string(),
                        4 => padded.color(SpeedLevel::from_mbps(record.upload_mbps()).color()).to_string(),
                        _ => padded,
                    }
                })
                .collect();
            output.push('\n');
            output.push_str(&cells.join("  "));
        }

        Ok(output)
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("{} {}", self.colorize("✗ Error:", self.color_scheme.error).bold(), error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("{} {}", self.colorize("⚠ Warning:", self.color_scheme.warning).bold(), warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("{} {}", self.colorize("✓", self.color_scheme.success).bold(), message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SpeedSample;
    use chrono::NaiveDate;

    fn formatter() -> ColoredFormatter {
        ColoredFormatter::new(FormattingOptions::default())
    }

    #[test]
    fn test_speed_levels() {
        assert_eq!(SpeedLevel::from_mbps(250.0), SpeedLevel::Excellent);
        assert_eq!(SpeedLevel::from_mbps(100.0), SpeedLevel::Excellent);
        assert_eq!(SpeedLevel::from_mbps(40.0), SpeedLevel::Good);
        assert_eq!(SpeedLevel::from_mbps(5.0), SpeedLevel::Fair);
        assert_eq!(SpeedLevel::from_mbps(0.5), SpeedLevel::Poor);
        assert_eq!(SpeedLevel::Good.description(), "Good");
    }

    #[test]
    fn test_results_keep_card_text() {
        let mut presenter = ResultsPresenter::new();
        presenter.show_result(12.0, 300.123, 40.0);

        let output = formatter().format_results(&presenter).unwrap();
        assert!(output.contains("12 ms"));
        assert!(output.contains("300.12 Mbps"));
        assert!(output.contains("40.00 Mbps"));
    }

    #[test]
    fn test_error_marker_survives_coloring() {
        let mut presenter = ResultsPresenter::new();
        presenter.show_error();

        let output = formatter().format_results(&presenter).unwrap();
        assert!(output.contains("Error"));
        assert!(output.contains("-- ms"));
    }

    #[test]
    fn test_history_table_rows() {
        let at = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(7, 30, 0).unwrap();
        let records = vec![SpeedSample::new(8.0, 512.0, 64.0).into_record(at)];

        let table = formatter().format_history_table(&records).unwrap();
        assert!(table.contains("2024-05-01 07:30"));
        assert!(table.contains("512.00 Mbps"));
        assert!(table.contains("Download"));
    }

    #[test]
    fn test_empty_history() {
        let table = formatter().format_history_table(&[]).unwrap();
        assert!(table.contains(NO_HISTORY_MESSAGE));
    }

    #[test]
    fn test_disabled_color_falls_back_to_plain() {
        let colorless = ColoredFormatter::new(FormattingOptions { enable_color: false, ..Default::default() });
        assert_eq!(colorless.format_header("X").unwrap(), "=====\n  X  \n=====");
    }
}
