//! Trend chart data
//!
//! Turns the tail of the history into two plottable series. Timestamps are
//! categorical: record `i` of the window sits at `x = i` and is labelled with
//! its timestamp string.

use crate::models::MeasurementRecord;

pub const CHART_TITLE: &str = "Recent Speed Tests";
pub const X_AXIS_LABEL: &str = "Test Time";
pub const Y_AXIS_LABEL: &str = "Speed (Mbps)";
pub const DOWNLOAD_SERIES: &str = "Download (Mbps)";
pub const UPLOAD_SERIES: &str = "Upload (Mbps)";

/// Plot-ready download/upload series over a shared categorical x-axis
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrendSeries {
    labels: Vec<String>,
    download: Vec<[f64; 2]>,
    upload: Vec<[f64; 2]>,
}

impl TrendSeries {
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn download_points(&self) -> &[[f64; 2]] {
        &self.download
    }

    pub fn upload_points(&self) -> &[[f64; 2]] {
        &self.upload
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label for an x position, if it falls on a data point
    pub fn label_at(&self, x: f64) -> Option<&str> {
        if x < 0.0 || x.fract() != 0.0 {
            return None;
        }
        self.labels.get(x as usize).map(String::as_str)
    }

    /// Largest y value across both series
    pub fn max_speed(&self) -> f64 {
        self.download
            .iter()
            .chain(self.upload.iter())
            .map(|p| p[1])
            .fold(0.0, f64::max)
    }
}

/// Builds trend series from the most recent records
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendChart {
    max_points: usize,
}

impl Default for TrendChart {
    fn default() -> Self {
        Self::new(crate::defaults::DEFAULT_CHART_POINTS)
    }
}

impl TrendChart {
    pub fn new(max_points: usize) -> Self {
        Self { max_points }
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }

    /// Series for the last `max_points` records of `history`
    pub fn render(&self, history: &[MeasurementRecord]) -> TrendSeries {
        let start = history.len().saturating_sub(self.max_points);
        let window = &history[start..];

        let mut series = TrendSeries {
            labels: Vec::with_capacity(window.len()),
            download: Vec::with_capacity(window.len()),
            upload: Vec::with_capacity(window.len()),
        };

        for (i, record) in window.iter().enumerate() {
            let x = i as f64;
            series.labels.push(record.timestamp_label());
            series.download.push([x, record.download_mbps()]);
            series.upload.push([x, record.upload_mbps()]);
        }

        series
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SpeedSample;
    use chrono::NaiveDate;

    fn history(n: usize) -> Vec<MeasurementRecord> {
        (0..n)
            .map(|i| {
                let at = NaiveDate::from_ymd_opt(2024, 1, 1 + (i / 60) as u32)
                    .unwrap()
                    .and_hms_opt(8, (i % 60) as u32, 0)
                    .unwrap();
                SpeedSample::new(15.0, 100.0 + i as f64, 10.0 + i as f64).into_record(at)
            })
            .collect()
    }

    #[test]
    fn test_empty_history_renders_empty_chart() {
        let series = TrendChart::default().render(&[]);
        assert!(series.is_empty());
        assert!(series.download_points().is_empty());
        assert!(series.upload_points().is_empty());
        assert_eq!(series.max_speed(), 0.0);
    }

    #[test]
    fn test_short_history_keeps_everything() {
        let records = history(4);
        let series = TrendChart::default().render(&records);

        assert_eq!(series.len(), 4);
        assert_eq!(series.download_points()[0], [0.0, 100.0]);
        assert_eq!(series.download_points()[3], [3.0, 103.0]);
        assert_eq!(series.upload_points()[3], [3.0, 13.0]);
        assert_eq!(series.labels()[0], "2024-01-01 08:00");
    }

    #[test]
    fn test_long_history_keeps_last_ten() {
        let records = history(25);
        let series = TrendChart::default().render(&records);

        assert_eq!(series.len(), 10);
        assert_eq!(series.download_points().len(), 10);
        assert_eq!(series.upload_points().len(), 10);
        assert_eq!(series.download_points()[0][1], 115.0);
        assert_eq!(series.download_points()[9][1], 124.0);
        assert_eq!(series.labels()[9], "2024-01-01 08:24");
    }

    #[test]
    fn test_label_lookup() {
        let series = TrendChart::new(3).render(&history(3));
        assert_eq!(series.label_at(1.0), Some("2024-01-01 08:01"));
        assert_eq!(series.label_at(1.5), None);
        assert_eq!(series.label_at(-1.0), None);
        assert_eq!(series.label_at(3.0), None);
    }

    #[test]
    fn test_max_speed() {
        let series = TrendChart::default().render(&history(3));
        assert_eq!(series.max_speed(), 102.0);
    }
}
