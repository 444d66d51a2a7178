//! Configuration validation utilities and rules

use crate::{
    error::{AppError, Result},
    models::Config,
};
use colored::Colorize;

/// Transfers above this size get a warning; they take a while on slow links
const LARGE_TRANSFER_BYTES: u64 = 200_000_000;

/// Configuration validator with advisory checks on top of `Config::validate`
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration and collect non-fatal warnings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        let mut warnings = Vec::new();

        config.validate()?;

        warnings.extend(Self::validate_servers(&config.servers)?);
        warnings.extend(Self::validate_transfer_settings(config));
        warnings.extend(Self::validate_history_file(config));

        Ok(warnings)
    }

    fn validate_servers(servers: &[String]) -> Result<Vec<ValidationWarning>> {
        let mut warnings = Vec::new();

        for server in servers {
            let parsed = url::Url::parse(server)
                .map_err(|e| AppError::config(format!("Invalid server URL '{}': {}", server, e)))?;

            if parsed.scheme() == "http" {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!("Server '{}' uses HTTP instead of HTTPS", server),
                ));
            }

            match parsed.host() {
                Some(url::Host::Ipv4(ip)) if ip.is_private() || ip.is_loopback() => {
                    warnings.push(ValidationWarning::new(
                        ValidationLevel::Info,
                        format!("Server '{}' is on a private/local network; results will not reflect internet speed", server),
                    ));
                }
                Some(url::Host::Domain("localhost")) => {
                    warnings.push(ValidationWarning::new(
                        ValidationLevel::Info,
                        format!("Server '{}' is localhost; results will not reflect internet speed", server),
                    ));
                }
                _ => {}
            }

            if parsed.query().is_some() {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!("Server '{}' includes query parameters, which are dropped when building test URLs", server),
                ));
            }
        }

        Ok(warnings)
    }

    fn validate_transfer_settings(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for (name, bytes) in [("Download", config.download_bytes), ("Upload", config.upload_bytes)] {
            if bytes > LARGE_TRANSFER_BYTES {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!("{} size of {} bytes may take a long time on slow connections", name, bytes),
                ));
            } else if bytes < 1_000_000 {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!("{} size of {} bytes is too small for a stable throughput reading", name, bytes),
                ));
            }
        }

        if config.timeout_seconds < 10 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Timeout of {}s may cut off transfers on slow connections", config.timeout_seconds),
            ));
        }

        if config.ping_samples < 3 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("{} ping sample(s) may give a noisy latency figure", config.ping_samples),
            ));
        }

        warnings
    }

    fn validate_history_file(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.history_file.is_dir() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Error,
                format!("History path {} is a directory; results cannot be saved", config.history_file.display()),
            ));
        } else if config.history_file.extension().and_then(|e| e.to_str()) != Some("json") {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("History file {} does not end in .json", config.history_file.display()),
            ));
        }

        warnings
    }
}

/// Validation warning levels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValidationLevel {
    Info,
    Warning,
    Error,
}

impl ValidationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        if !use_color {
            return format!("{} {}", tag, self.message);
        }

        let tag = match self.level {
            ValidationLevel::Info => tag.blue(),
            ValidationLevel::Warning => tag.yellow(),
            ValidationLevel::Error => tag.red().bold(),
        };
        format!("{} {}", tag, self.message)
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_has_no_warnings() {
        let warnings = validate_config(&Config::default()).unwrap();
        assert!(warnings.is_empty(), "{:?}", warnings);
    }

    #[test]
    fn test_plain_http_and_local_servers_warn() {
        let mut config = Config::default();
        config.servers = vec!["http://127.0.0.1:8080".to_string()];

        let warnings = validate_config(&config).unwrap();
        assert!(warnings.iter().any(|w| w.level == ValidationLevel::Warning && w.message.contains("HTTP")));
        assert!(warnings.iter().any(|w| w.level == ValidationLevel::Info && w.message.contains("private/local")));
    }

    #[test]
    fn test_transfer_size_warnings() {
        let mut config = Config::default();
        config.download_bytes = 500_000_000;
        config.upload_bytes = 1_000;

        let warnings = validate_config(&config).unwrap();
        assert!(warnings.iter().any(|w| w.message.starts_with("Download size")));
        assert!(warnings.iter().any(|w| w.message.starts_with("Upload size")));
    }

    #[test]
    fn test_history_directory_is_flagged() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.history_file = dir.path().to_path_buf();

        let warnings = validate_config(&config).unwrap();
        assert!(warnings.iter().any(|w| w.level == ValidationLevel::Error));
    }

    #[test]
    fn test_invalid_config_is_error() {
        let mut config = Config::default();
        config.servers.clear();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_warning_format_without_color() {
        let warning = ValidationWarning::new(ValidationLevel::Warning, "slow".to_string());
        assert_eq!(warning.format(false), "[WARNING] slow");
    }
}
