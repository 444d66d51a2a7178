//! Text shown on the three result cards and the trigger control

use crate::models::SpeedSample;

pub const PING_PLACEHOLDER: &str = "-- ms";
pub const SPEED_PLACEHOLDER: &str = "-- Mbps";
pub const ERROR_INDICATOR: &str = "Error";

pub const TRIGGER_IDLE_LABEL: &str = "Run Speed Test";
pub const TRIGGER_RUNNING_LABEL: &str = "Running Test...";

/// Holds the "current" ping/download/upload text
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsPresenter {
    ping: String,
    download: String,
    upload: String,
    trigger_enabled: bool,
}

impl Default for ResultsPresenter {
    fn default() -> Self {
        Self {
            ping: PING_PLACEHOLDER.to_string(),
            download: SPEED_PLACEHOLDER.to_string(),
            upload: SPEED_PLACEHOLDER.to_string(),
            trigger_enabled: true,
        }
    }
}

impl ResultsPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all cards to placeholders and lock the trigger
    pub fn show_running(&mut self) {
        self.ping = PING_PLACEHOLDER.to_string();
        self.download = SPEED_PLACEHOLDER.to_string();
        self.upload = SPEED_PLACEHOLDER.to_string();
        self.trigger_enabled = false;
    }

    pub fn show_result(&mut self, ping_ms: f64, download_mbps: f64, upload_mbps: f64) {
        self.ping = format_ping(ping_ms);
        self.download = format_speed(download_mbps);
        self.upload = format_speed(upload_mbps);
        self.trigger_enabled = true;
    }

    pub fn show_sample(&mut self, sample: &SpeedSample) {
        self.show_result(sample.ping_ms, sample.download_mbps, sample.upload_mbps);
    }

    /// Only the download card reports the failure
    pub fn show_error(&mut self) {
        self.download = ERROR_INDICATOR.to_string();
        self.trigger_enabled = true;
    }

    pub fn ping_text(&self) -> &str {
        &self.ping
    }

    pub fn download_text(&self) -> &str {
        &self.download
    }

    pub fn upload_text(&self) -> &str {
        &self.upload
    }

    pub fn trigger_enabled(&self) -> bool {
        self.trigger_enabled
    }

    pub fn trigger_label(&self) -> &'static str {
        if self.trigger_enabled {
            TRIGGER_IDLE_LABEL
        } else {
            TRIGGER_RUNNING_LABEL
        }
    }

    /// The progress indicator shows while the trigger is locked
    pub fn progress_visible(&self) -> bool {
        !self.trigger_enabled
    }
}

pub fn format_ping(ping_ms: f64) -> String {
    format!("{:.0} ms", ping_ms)
}

pub fn format_speed(mbps: f64) -> String {
    format!("{:.2} Mbps", mbps)
}
