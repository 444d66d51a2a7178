//! Structured logging for the speed checker
//!
//! This module provides:
//! - Structured logging with levels, fields and correlation IDs
//! - Console, JSON and compact output formats
//! - A measurement logger for run lifecycle and history writes
//! - An error event logger with error category context
//!
//! Everything is synchronous: entries are written from the UI thread and from
//! measurement worker threads alike.

use crate::error::{AppError, MeasurementError, Result};
use crate::models::{Config, SpeedSample};
use crate::runner::{ServerInfo, SpeedTestResults};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Trace level - most detailed
    Trace = 0,
    /// Debug level - detailed information for debugging
    Debug = 1,
    /// Info level - general application information
    Info = 2,
    /// Warning level - potentially harmful situations
    Warn = 3,
    /// Error level - error events but application can continue
    Error = 4,
    /// Fatal level - severe error events that cause application termination
    Fatal = 5,
}

impl LogLevel {
    /// Get log level name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Get ANSI color code for console output
    pub fn color_code(&self) -> &'static str {
        match self {
            LogLevel::Trace => "\x1b[37m",    // White
            LogLevel::Debug => "\x1b[36m",    // Cyan
            LogLevel::Info => "\x1b[32m",     // Green
            LogLevel::Warn => "\x1b[33m",     // Yellow
            LogLevel::Error => "\x1b[31m",    // Red
            LogLevel::Fatal => "\x1b[35m",    // Magenta
        }
    }

    /// Reset ANSI color code
    pub fn reset_code() -> &'static str {
        "\x1b[0m"
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(AppError::parse(format!("Invalid log level: {}", s))),
        }
    }
}

/// Log entry structure for structured logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Logger name/component
    pub logger: String,
    /// Correlation ID for tracking one measurement run
    pub correlation_id: Option<String>,
    pub fields: BTreeMap<String, serde_json::Value>,
    pub thread: Option<String>,
    /// Call site, recorded only when the logger includes locations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LogLocation>,
}

/// Source code location of a log call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogLocation {
    pub file: String,
    pub line: u32,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// JSON format for structured logging
    Json,
}

/// Where formatted entries go
#[derive(Debug, Clone)]
pub enum LogSink {
    Stderr,
    /// Collected in memory, for tests and diagnostics panels
    Memory(Arc<Mutex<Vec<String>>>),
}

impl LogSink {
    fn write_line(&self, line: &str) {
        match self {
            LogSink::Stderr => {
                let _ = writeln!(io::stderr(), "{}", line);
            }
            LogSink::Memory(lines) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.push(line.to_string());
                }
            }
        }
    }
}

/// Logger implementation with multiple output formats
#[derive(Debug)]
pub struct Logger {
    min_level: LogLevel,
    use_color: bool,
    include_location: bool,
    format: LogFormat,
    name: String,
    sink: LogSink,
    /// Fields attached to every entry
    context: RwLock<BTreeMap<String, serde_json::Value>>,
}

impl Logger {
    /// Create a new logger
    pub fn new(name: &str) -> Self {
        Self {
            min_level: LogLevel::Info,
            use_color: true,
            include_location: false,
            format: LogFormat::Console,
            name: name.to_string(),
            sink: LogSink::Stderr,
            context: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create a logger with specific configuration
    pub fn with_config(name: &str, config: &Config) -> Self {
        let min_level = if config.debug {
            LogLevel::Debug
        } else if config.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };

        Self {
            min_level,
            use_color: config.enable_color,
            include_location: config.debug,
            format: if config.debug { LogFormat::Json } else { LogFormat::Console },
            ..Self::new(name)
        }
    }

    /// Set minimum log level
    pub fn set_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    /// Set output format
    pub fn set_format(&mut self, format: LogFormat) {
        self.format = format;
    }

    /// Record the call site of each entry
    pub fn set_include_location(&mut self, include_location: bool) {
        self.include_location = include_location;
    }

    /// Enable or disable colored output
    pub fn set_color(&mut self, use_color: bool) {
        self.use_color = use_color;
    }

    /// Redirect output
    pub fn set_sink(&mut self, sink: LogSink) {
        self.sink = sink;
    }

    /// Add context field for all subsequent log entries
    pub fn add_context_field<T: Serialize>(&self, key: &str, value: T) {
        if let Ok(json_value) = serde_json::to_value(value) {
            if let Ok(mut context) = self.context.write() {
                context.insert(key.to_string(), json_value);
            }
        }
    }

    /// Create a log entry builder
    #[track_caller]
    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        let builder = LogEntryBuilder::new(self, level, message.to_string());
        if self.include_location {
            let caller = std::panic::Location::caller();
            builder.location(caller.file(), caller.line())
        } else {
            builder
        }
    }

    /// Convenience methods for different log levels
    #[track_caller]
    pub fn trace(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Trace, message)
    }

    #[track_caller]
    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    #[track_caller]
    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    #[track_caller]
    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    #[track_caller]
    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    #[track_caller]
    pub fn fatal(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Fatal, message)
    }

    /// Check if a log level would be output
    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    fn write_entry(&self, mut entry: LogEntry) {
        if !self.would_log(entry.level) {
            return;
        }

        if let Ok(context) = self.context.read() {
            for (key, value) in context.iter() {
                entry.fields.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }

        let output = match self.format {
            LogFormat::Console => self.format_console(&entry),
            LogFormat::Json => self.format_json(&entry),
        };

        self.sink.write_line(&output);
    }

    /// Format log entry for console output
    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let level_str = entry.level.as_str();

        let formatted_level = if self.use_color {
            format!("{}{:>5}{}", entry.level.color_code(), level_str, LogLevel::reset_code())
        } else {
            format!("{:>5}", level_str)
        };

        let mut output = format!("{} {} [{}] {}", timestamp, formatted_level, entry.logger, entry.message);

        if let Some(correlation_id) = &entry.correlation_id {
            let short: String = correlation_id.chars().take(8).collect();
            output.push_str(&format!(" [{}]", short));
        }

        if !entry.fields.is_empty() {
            let fields_str: Vec<String> = entry.fields.iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            output.push_str(&format!(" {{{}}}", fields_str.join(", ")));
        }

        if let Some(location) = &entry.location {
            output.push_str(&format!(" @ {}:{}", location.file, location.line));
        }

        output
    }

    /// Format log entry as JSON
    fn format_json(&self, entry: &LogEntry) -> String {
        match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(_) => format!("{{\"error\": \"Failed to serialize log entry\", \"message\": \"{}\"}}", entry.message),
        }
    }
}

/// Builder pattern for creating log entries
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                correlation_id: None,
                fields: BTreeMap::new(),
                thread: std::thread::current().name().map(String::from),
                location: None,
            },
        }
    }

    /// Add a correlation ID
    pub fn correlation_id(mut self, id: &str) -> Self {
        self.entry.correlation_id = Some(id.to_string());
        self
    }

    /// Add the source location
    pub fn location(mut self, file: &str, line: u32) -> Self {
        self.entry.location = Some(LogLocation { file: file.to_string(), line });
        self
    }

    /// Add a structured field
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    /// Add the converted figures of a run
    pub fn sample(self, sample: &SpeedSample) -> Self {
        self.field("ping_ms", sample.ping_ms)
            .field("download_mbps", sample.download_mbps)
            .field("upload_mbps", sample.upload_mbps)
    }

    /// Add error information
    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_recoverable", error.is_recoverable())
            .field("error_exit_code", error.exit_code())
    }

    /// Finalize and write the log entry
    pub fn log(self) {
        self.logger.write_entry(self.entry);
    }
}

/// Logger for measurement runs and history writes
#[derive(Debug)]
pub struct MeasurementLogger {
    logger: Logger,
}

impl MeasurementLogger {
    pub fn new(config: &Config) -> Self {
        Self {
            logger: Logger::with_config("RUN", config),
        }
    }

    /// Logger that only emits entries at `min_level` or above
    pub fn quiet(min_level: LogLevel) -> Self {
        let mut logger = Logger::new("RUN");
        logger.set_level(min_level);
        logger.set_color(false);
        Self { logger }
    }

    /// Logger writing into a shared buffer
    pub fn capturing(min_level: LogLevel, lines: Arc<Mutex<Vec<String>>>) -> Self {
        let mut logger = Logger::new("RUN");
        logger.set_level(min_level);
        logger.set_color(false);
        logger.set_sink(LogSink::Memory(lines));
        Self { logger }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn log_run_started(&self, run_id: Uuid) {
        self.logger.info("Speed test started")
            .correlation_id(&run_id.to_string())
            .log();
    }

    pub fn log_server_selected(&self, server: &ServerInfo) {
        self.logger.debug(&format!("Selected server {} ({:.1}ms)", server.url, server.latency_ms))
            .field("server", &server.url)
            .field("latency_ms", server.latency_ms)
            .log();
    }

    /// Raw capability figures, before unit conversion
    pub fn log_raw_results(&self, results: &SpeedTestResults) {
        let mut entry = self.logger.trace("Raw speed test results");
        for (key, value) in results.as_map() {
            entry = entry.field(&key, value);
        }
        entry.log();
    }

    pub fn log_run_finished(&self, run_id: Uuid, outcome: &std::result::Result<SpeedSample, MeasurementError>) {
        let id = run_id.to_string();
        match outcome {
            Ok(sample) => {
                self.logger.info("Speed test completed")
                    .correlation_id(&id)
                    .sample(sample)
                    .log();
            }
            Err(err) => {
                self.logger.error(&format!("Speed test error: {}", err))
                    .correlation_id(&id)
                    .log();
            }
        }
    }

    pub fn log_history_appended(&self, path: &Path, revision: u64) {
        self.logger.debug(&format!("Appended result to {}", path.display()))
            .field("revision", revision)
            .log();
    }

    pub fn log_history_write_failed(&self, path: &Path, error: &AppError) {
        self.logger.error(&format!("Could not save result to {}: {}", path.display(), error))
            .error_info(error)
            .log();
    }

    pub fn log_history_unreadable(&self, path: &Path, reason: &str) {
        self.logger.debug(&format!("Treating {} as empty history: {}", path.display(), reason))
            .log();
    }
}

/// Error event logger with enhanced context
#[derive(Debug)]
pub struct ErrorEventLogger {
    logger: Logger,
}

impl ErrorEventLogger {
    pub fn new(config: &Config) -> Self {
        Self {
            logger: Logger::with_config("ERR", config),
        }
    }

    /// Log an application error with full context
    pub fn log_error(&self, error: &AppError, context: Option<&str>, correlation_id: Option<&str>) {
        let message = if let Some(ctx) = context {
            format!("{}: {}", ctx, error)
        } else {
            error.to_string()
        };

        let mut builder = self.logger.error(&message).error_info(error);

        if let Some(id) = correlation_id {
            builder = builder.correlation_id(id);
        }

        if let Some(ctx) = context {
            builder = builder.field("context", ctx);
        }

        builder.log();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_logger(level: LogLevel) -> (Logger, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let mut logger = Logger::new("TEST");
        logger.set_level(level);
        logger.set_color(false);
        logger.set_sink(LogSink::Memory(lines.clone()));
        (logger, lines)
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_level_filtering() {
        let (logger, lines) = memory_logger(LogLevel::Warn);
        logger.info("hidden").log();
        logger.warn("shown").log();

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("WARN [TEST] shown"));
    }

    #[test]
    fn test_console_fields_and_correlation() {
        let (logger, lines) = memory_logger(LogLevel::Trace);
        logger.info("measured")
            .correlation_id("0123456789abcdef")
            .field("ping_ms", 12.5)
            .log();

        let line = lines.lock().unwrap()[0].clone();
        assert!(line.contains("[01234567]"));
        assert!(line.contains("{ping_ms=12.5}"));
    }

    #[test]
    fn test_json_format() {
        let (mut logger, lines) = memory_logger(LogLevel::Trace);
        logger.set_format(LogFormat::Json);
        logger.add_context_field("app", "speedcheck");
        logger.error("boom").field("code", 4).log();

        let line = lines.lock().unwrap()[0].clone();
        let entry: LogEntry = serde_json::from_str(&line).unwrap();
        assert_eq!(entry.level, LogLevel::Error);
        assert_eq!(entry.fields["code"], 4);
        assert_eq!(entry.fields["app"], "speedcheck");
    }

    #[test]
    fn test_config_levels() {
        let mut config = Config::default();
        assert!(!Logger::with_config("X", &config).would_log(LogLevel::Info));

        config.verbose = true;
        assert!(Logger::with_config("X", &config).would_log(LogLevel::Info));

        config.debug = true;
        assert!(Logger::with_config("X", &config).would_log(LogLevel::Debug));
    }

    #[test]
    fn test_debug_config_records_call_site() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let config = Config { debug: true, ..Config::default() };
        let mut logger = Logger::with_config("X", &config);
        logger.set_sink(LogSink::Memory(lines.clone()));

        logger.debug("located").log();
        let expected_line = line!() - 1;

        let entry: LogEntry = serde_json::from_str(&lines.lock().unwrap()[0]).unwrap();
        let location = entry.location.unwrap();
        assert!(location.file.ends_with("logging.rs"));
        assert_eq!(location.line, expected_line);
    }

    #[test]
    fn test_console_location_only_when_enabled() {
        let (mut logger, lines) = memory_logger(LogLevel::Trace);
        logger.info("plain").log();
        logger.set_include_location(true);
        logger.info("located").log();

        let lines = lines.lock().unwrap();
        assert!(!lines[0].contains(" @ "));
        assert!(lines[1].contains(" @ "));
        assert!(lines[1].contains("logging.rs:"));
    }

    #[test]
    fn test_run_failure_is_logged_as_error() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let logger = MeasurementLogger::capturing(LogLevel::Error, lines.clone());
        logger.log_run_finished(Uuid::new_v4(), &Err(MeasurementError::transfer("reset by peer")));

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Speed test error: transfer failed: reset by peer"));
    }
}
