//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use crate::types::AppearanceMode;
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env file if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        if Path::new(".env").exists() {
            dotenv::from_filename(".env")
                .map_err(|e| AppError::config(format!("Failed to load .env file: {}", e)))?;

            if debug {
                eprintln!("Loaded configuration from .env file");
            }
        } else if debug {
            eprintln!("No .env file found, using defaults and CLI arguments");
        }

        Ok(())
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        r#"# Speed Check Configuration
#
# Values here are used as defaults and can be overridden by
# command-line arguments.

# History file location
# SPEEDCHECK_HISTORY_FILE=speed_history.json

# Speed test servers (comma-separated base URLs)
# SPEEDCHECK_SERVERS=https://speed.cloudflare.com

# Number of recent tests drawn in the trend chart (1-100)
# SPEEDCHECK_CHART_POINTS=10

# Request timeout in seconds (1-300)
# SPEEDCHECK_TIMEOUT=30

# Latency probes per server (1-50)
# SPEEDCHECK_PING_SAMPLES=5

# Transfer sizes in bytes
# SPEEDCHECK_DOWNLOAD_BYTES=25000000
# SPEEDCHECK_UPLOAD_BYTES=10000000

# Window appearance: system, light or dark
# SPEEDCHECK_APPEARANCE=system

# Enable colored output (true/false)
# ENABLE_COLOR=true
"#
        .to_string()
    }

    /// Save example .env file to disk
    pub fn save_example_env_file(path: &Path) -> Result<()> {
        let content = Self::create_example_env_content();
        std::fs::write(path, content)
            .map_err(|e| AppError::config(format!("Failed to write example .env file: {}", e)))?;

        Ok(())
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "SPEEDCHECK_HISTORY_FILE" => {
                if value.trim().is_empty() {
                    return Err(AppError::config("SPEEDCHECK_HISTORY_FILE cannot be empty"));
                }
            }
            "SPEEDCHECK_SERVERS" => {
                for server in value.split(',') {
                    let server = server.trim();
                    if !server.is_empty() {
                        url::Url::parse(server)
                            .map_err(|e| AppError::config(format!("Invalid SPEEDCHECK_SERVERS entry '{}': {}", server, e)))?;
                    }
                }
            }
            "SPEEDCHECK_CHART_POINTS" => Self::validate_range(key, value, 1, 100)?,
            "SPEEDCHECK_TIMEOUT" => Self::validate_range(key, value, 1, 300)?,
            "SPEEDCHECK_PING_SAMPLES" => Self::validate_range(key, value, 1, 50)?,
            "SPEEDCHECK_DOWNLOAD_BYTES" | "SPEEDCHECK_UPLOAD_BYTES" => {
                Self::validate_range(key, value, 1, crate::models::config::MAX_TRANSFER_BYTES)?
            }
            "SPEEDCHECK_APPEARANCE" => {
                value.parse::<AppearanceMode>()
                    .map_err(|e| AppError::config(format!("Invalid SPEEDCHECK_APPEARANCE value '{}': {}", value, e)))?;
            }
            "ENABLE_COLOR" => {
                value.trim().parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", value, e)))?;
            }
            _ => {}
        }

        Ok(())
    }

    fn validate_range(key: &str, value: &str, min: u64, max: u64) -> Result<()> {
        let n: u64 = value.trim().parse()
            .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
        if n < min || n > max {
            return Err(AppError::config(format!("{} must be between {} and {}, got: {}", key, min, max, n)));
        }
        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("SPEEDCHECK_HISTORY_FILE", "Path of the JSON history file", "speed_history.json"),
            ("SPEEDCHECK_SERVERS", "Comma-separated speed test server URLs", "https://speed.cloudflare.com"),
            ("SPEEDCHECK_CHART_POINTS", "Tests drawn in the trend chart (1-100)", "10"),
            ("SPEEDCHECK_TIMEOUT", "Request timeout in seconds (1-300)", "30"),
            ("SPEEDCHECK_PING_SAMPLES", "Latency probes per server (1-50)", "5"),
            ("SPEEDCHECK_DOWNLOAD_BYTES", "Bytes requested during download", "25000000"),
            ("SPEEDCHECK_UPLOAD_BYTES", "Bytes sent during upload", "10000000"),
            ("SPEEDCHECK_APPEARANCE", "Window appearance (system, light, dark)", "system"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<26} {}\n", var, description));
            help.push_str(&format!("  {:<26} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Validate all currently set environment variables
    pub fn validate_current_env() -> Vec<String> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(var_name, _, _)| {
                let value = std::env::var(var_name).ok()?;
                Self::validate_env_var(var_name, &value).err()
            })
            .map(|e| format!("Warning: {}", e))
            .collect()
    }
}
