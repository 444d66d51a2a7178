//! Command-line interface

use crate::types::AppearanceMode;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Modern Wi-Fi Speed Tester - measure ping, download and upload and keep a history
#[derive(Parser, Debug, Clone)]
#[command(name = "speedcheck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path of the JSON history file
    #[arg(long, value_name = "PATH")]
    pub history_file: Option<PathBuf>,

    /// Speed test server base URL (can be used multiple times)
    #[arg(long = "server", value_name = "URL", action = ArgAction::Append)]
    pub servers: Vec<String>,

    /// Number of recent tests shown in the trend chart and history table
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..=100))]
    pub chart_points: Option<u16>,

    /// Request timeout in seconds
    #[arg(short, long, value_name = "SECONDS", value_parser = parse_duration)]
    pub timeout: Option<u64>,

    /// Latency probes sent to each candidate server
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=50))]
    pub ping_samples: Option<u32>,

    /// Bytes requested during the download phase
    #[arg(long, value_name = "BYTES")]
    pub download_bytes: Option<u64>,

    /// Bytes sent during the upload phase
    #[arg(long, value_name = "BYTES")]
    pub upload_bytes: Option<u64>,

    /// Window appearance (system, light, dark)
    #[arg(long, value_name = "MODE", value_parser = parse_appearance)]
    pub appearance: Option<AppearanceMode>,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Run a single test in the terminal instead of opening the window
    #[arg(long, conflicts_with = "history")]
    pub headless: bool,

    /// Print the recorded history and exit
    #[arg(long)]
    pub history: bool,

    /// List supported environment variables and exit
    #[arg(long)]
    pub env_help: bool,

    /// Write an example .env file to PATH and exit
    #[arg(long, value_name = "PATH")]
    pub create_env_example: Option<PathBuf>,
}

impl Cli {
    /// Validate CLI arguments for conflicts and requirements
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        for server in &self.servers {
            let parsed = url::Url::parse(server)
                .map_err(|e| format!("Invalid --server URL '{}': {}", server, e))?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(format!("--server must use http or https: {}", server));
            }
        }

        for (flag, bytes) in [("--download-bytes", self.download_bytes), ("--upload-bytes", self.upload_bytes)] {
            if bytes == Some(0) {
                return Err(format!("{} must be greater than 0", flag));
            }
        }

        Ok(())
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }

    /// True when no window should be opened
    pub fn is_terminal_mode(&self) -> bool {
        self.headless || self.history || self.env_help || self.create_env_example.is_some()
    }
}

/// Parse duration from seconds string
fn parse_duration(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Duration must be greater than 0".to_string())
            } else if secs > 300 {
                Err("Duration cannot exceed 300 seconds".to_string())
            } else {
                Ok(secs)
            }
        })
}

fn parse_appearance(s: &str) -> Result<AppearanceMode, String> {
    s.parse::<AppearanceMode>().map_err(|e| e.to_string())
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}
