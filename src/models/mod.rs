//! Data models and structures for the speed checker

pub mod config;
pub mod record;

// Re-export main model types
pub use config::Config;
pub use record::{MeasurementRecord, SpeedSample};
