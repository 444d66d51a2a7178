//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::{AppError, Result},
    models::Config,
};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        self.load_env_file()?;
        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config)?;

        config.validate()?;

        Ok(config)
    }

    fn load_env_file(&self) -> Result<()> {
        EnvManager::load_env_file(self.cli.debug)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) -> Result<()> {
        self.cli.validate().map_err(AppError::validation)?;

        if let Some(ref path) = self.cli.history_file {
            config.history_file = path.clone();
        }

        if !self.cli.servers.is_empty() {
            config.servers = self.cli.servers.clone();
        }

        if let Some(points) = self.cli.chart_points {
            config.chart_points = usize::from(points);
        }

        if let Some(timeout) = self.cli.timeout {
            config.timeout_seconds = timeout;
        }

        if let Some(samples) = self.cli.ping_samples {
            config.ping_samples = samples;
        }

        if let Some(bytes) = self.cli.download_bytes {
            config.download_bytes = bytes;
        }

        if let Some(bytes) = self.cli.upload_bytes {
            config.upload_bytes = bytes;
        }

        if let Some(mode) = self.cli.appearance {
            config.appearance = mode;
        }

        if self.cli.no_color {
            config.enable_color = false;
        } else if self.cli.color {
            config.enable_color = true;
        }

        // CLI-only
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;

        if config.debug {
            eprintln!("Applied CLI overrides to configuration");
            eprintln!(
                "Final config: history_file={}, servers={}, timeout={}s",
                config.history_file.display(),
                config.servers.len(),
                config.timeout_seconds
            );
        }

        Ok(())
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("History file: {}", config.history_file.display()));
    summary.push(format!("Servers: {}", config.servers.join(", ")));
    summary.push(format!("Chart points: {}", config.chart_points));
    summary.push(format!("Timeout: {}s", config.timeout_seconds));
    summary.push(format!("Ping samples: {}", config.ping_samples));
    summary.push(format!("Download bytes: {}", config.download_bytes));
    summary.push(format!("Upload bytes: {}", config.upload_bytes));
    summary.push(format!("Appearance: {}", config.appearance));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}
