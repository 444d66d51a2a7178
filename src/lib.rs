//! SpeedCheck
//!
//! A desktop internet speed tester. Runs ping/download/upload measurements on a
//! background worker, shows the latest result, keeps an append-only JSON history
//! of past runs and renders a trend chart of the most recent ones.

pub mod chart;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod gui;
pub mod history;
pub mod logging;
pub mod models;
pub mod output;
pub mod presenter;
pub mod runner;
pub mod types;

// Re-export commonly used types
pub use chart::{TrendChart, TrendSeries};
pub use controller::AppController;
pub use error::{AppError, HistoryError, MeasurementError, Result};
pub use history::HistoryStore;
pub use models::{Config, MeasurementRecord, SpeedSample};
pub use presenter::ResultsPresenter;
pub use runner::{BackendFactory, HttpBackendFactory, MeasurementRunner, SpeedTestBackend, SpeedTestResults};
pub use types::{AppearanceMode, RunState};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build metadata exported by build.rs
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const GIT_COMMIT: &str = env!("GIT_COMMIT");
pub const TARGET_TRIPLE: &str = env!("TARGET_TRIPLE");

/// One-line version banner
pub fn version_banner() -> String {
    format!("{} v{} ({} {}, built {})", PKG_NAME, VERSION, GIT_COMMIT, TARGET_TRIPLE, BUILD_TIME)
}

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_HISTORY_FILE: &str = "speed_history.json";
    pub const DEFAULT_SERVERS: &[&str] = &["https://speed.cloudflare.com"];
    pub const DEFAULT_CHART_POINTS: usize = 10;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_PING_SAMPLES: u32 = 5;
    pub const DEFAULT_DOWNLOAD_BYTES: u64 = 25_000_000;
    pub const DEFAULT_UPLOAD_BYTES: u64 = 10_000_000;
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    /// Timestamp layout used in the history file
    pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";
}
