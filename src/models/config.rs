//! Configuration data model and validation

use crate::types::{AppError, AppearanceMode, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Largest transfer a single download/upload phase may request
pub const MAX_TRANSFER_BYTES: u64 = 1_000_000_000;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path of the JSON history file
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,

    /// Candidate speed test server base URLs
    #[serde(default = "default_servers")]
    pub servers: Vec<String>,

    /// Number of most recent records drawn in the trend chart
    #[serde(default = "default_chart_points")]
    pub chart_points: usize,

    /// Per-request timeout for the HTTP capability
    #[serde(default = "default_timeout_secs")]
    pub timeout_seconds: u64,

    /// Latency probes sent to each candidate server
    #[serde(default = "default_ping_samples")]
    pub ping_samples: u32,

    /// Bytes requested during the download phase
    #[serde(default = "default_download_bytes")]
    pub download_bytes: u64,

    /// Bytes sent during the upload phase
    #[serde(default = "default_upload_bytes")]
    pub upload_bytes: u64,

    /// Initial window appearance
    #[serde(default)]
    pub appearance: AppearanceMode,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_file: default_history_file(),
            servers: default_servers(),
            chart_points: default_chart_points(),
            timeout_seconds: default_timeout_secs(),
            ping_samples: default_ping_samples(),
            download_bytes: default_download_bytes(),
            upload_bytes: default_upload_bytes(),
            appearance: AppearanceMode::default(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.history_file.as_os_str().is_empty() {
            return Err(AppError::config("History file path cannot be empty"));
        }

        if self.servers.is_empty() {
            return Err(AppError::config("At least one speed test server is required"));
        }

        for server in &self.servers {
            if server.is_empty() {
                return Err(AppError::config("Server URL cannot be empty"));
            }

            match url::Url::parse(server) {
                Ok(parsed) => {
                    if parsed.scheme() != "http" && parsed.scheme() != "https" {
                        return Err(AppError::config(format!("Server URL must use http or https: {}", server)));
                    }
                }
                Err(e) => {
                    return Err(AppError::config(format!("Invalid server URL '{}': {}", server, e)));
                }
            }
        }

        if self.chart_points == 0 {
            return Err(AppError::config("Chart points must be greater than 0"));
        }

        if self.chart_points > 100 {
            return Err(AppError::config("Chart points cannot exceed 100"));
        }

        if self.timeout_seconds == 0 {
            return Err(AppError::config("Timeout must be greater than 0"));
        }

        if self.timeout_seconds > 300 {
            return Err(AppError::config("Timeout cannot exceed 300 seconds"));
        }

        if self.ping_samples == 0 {
            return Err(AppError::config("Ping samples must be greater than 0"));
        }

        if self.ping_samples > 50 {
            return Err(AppError::config("Ping samples cannot exceed 50"));
        }

        for (name, bytes) in [("Download", self.download_bytes), ("Upload", self.upload_bytes)] {
            if bytes == 0 {
                return Err(AppError::config(format!("{} size must be greater than 0", name)));
            }
            if bytes > MAX_TRANSFER_BYTES {
                return Err(AppError::config(format!(
                    "{} size cannot exceed {} bytes",
                    name, MAX_TRANSFER_BYTES
                )));
            }
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("SPEEDCHECK_HISTORY_FILE") {
            let path = path.trim();
            if !path.is_empty() {
                self.history_file = PathBuf::from(path);
            }
        }

        if let Ok(servers) = std::env::var("SPEEDCHECK_SERVERS") {
            self.servers = servers
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(points) = std::env::var("SPEEDCHECK_CHART_POINTS") {
            self.chart_points = points.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid SPEEDCHECK_CHART_POINTS value '{}': {}", points, e)))?;
        }

        if let Ok(timeout) = std::env::var("SPEEDCHECK_TIMEOUT") {
            self.timeout_seconds = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid SPEEDCHECK_TIMEOUT value '{}': {}", timeout, e)))?;
        }

        if let Ok(samples) = std::env::var("SPEEDCHECK_PING_SAMPLES") {
            self.ping_samples = samples.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid SPEEDCHECK_PING_SAMPLES value '{}': {}", samples, e)))?;
        }

        if let Ok(bytes) = std::env::var("SPEEDCHECK_DOWNLOAD_BYTES") {
            self.download_bytes = bytes.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid SPEEDCHECK_DOWNLOAD_BYTES value '{}': {}", bytes, e)))?;
        }

        if let Ok(bytes) = std::env::var("SPEEDCHECK_UPLOAD_BYTES") {
            self.upload_bytes = bytes.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid SPEEDCHECK_UPLOAD_BYTES value '{}': {}", bytes, e)))?;
        }

        if let Ok(appearance) = std::env::var("SPEEDCHECK_APPEARANCE") {
            self.appearance = appearance.parse()
                .map_err(|e: AppError| AppError::config(format!("Invalid SPEEDCHECK_APPEARANCE value: {}", e)))?;
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_history_file() -> PathBuf {
    PathBuf::from(crate::defaults::DEFAULT_HISTORY_FILE)
}

fn default_servers() -> Vec<String> {
    crate::defaults::DEFAULT_SERVERS
        .iter()
        .map(|&s| s.to_string())
        .collect()
}

fn default_chart_points() -> usize {
    crate::defaults::DEFAULT_CHART_POINTS
}

fn default_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_TIMEOUT.as_secs()
}

fn default_ping_samples() -> u32 {
    crate::defaults::DEFAULT_PING_SAMPLES
}

fn default_download_bytes() -> u64 {
    crate::defaults::DEFAULT_DOWNLOAD_BYTES
}

fn default_upload_bytes() -> u64 {
    crate::defaults::DEFAULT_UPLOAD_BYTES
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
