//! The external measurement capability consumed by the runner

use crate::error::MeasurementError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result alias for capability calls
pub type MeasureResult<T> = std::result::Result<T, MeasurementError>;

/// The server chosen by `best_server`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub url: String,
    pub latency_ms: f64,
}

/// Raw results accumulated by a backend over one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedTestResults {
    /// Round-trip latency to the chosen server in ms
    pub ping: f64,
    /// Download throughput in bits per second
    pub download: f64,
    /// Upload throughput in bits per second
    pub upload: f64,
    pub server: Option<ServerInfo>,
    pub bytes_received: u64,
    pub bytes_sent: u64,
    pub timestamp: DateTime<Utc>,
}

impl Default for SpeedTestResults {
    fn default() -> Self {
        Self {
            ping: 0.0,
            download: 0.0,
            upload: 0.0,
            server: None,
            bytes_received: 0,
            bytes_sent: 0,
            timestamp: Utc::now(),
        }
    }
}

impl SpeedTestResults {
    /// Results as a key/value mapping
    pub fn as_map(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }
}

/// A speed-test capability. One instance serves one run and accumulates
/// its results; the calls are made in order `best_server`, `measure_download`,
/// `measure_upload`, then `results`.
#[async_trait]
pub trait SpeedTestBackend: Send {
    /// Pick the server with the lowest latency
    async fn best_server(&mut self) -> MeasureResult<ServerInfo>;

    /// Measure download throughput, returning bits per second
    async fn measure_download(&mut self) -> MeasureResult<f64>;

    /// Measure upload throughput, returning bits per second
    async fn measure_upload(&mut self) -> MeasureResult<f64>;

    /// Everything measured so far
    fn results(&self) -> SpeedTestResults;
}

/// Produces a fresh backend for every run
pub trait BackendFactory: Send + Sync {
    fn create(&self) -> MeasureResult<Box<dyn SpeedTestBackend>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_mapping_keys() {
        let results = SpeedTestResults {
            ping: 14.0,
            download: 120_000_000.0,
            upload: 30_000_000.0,
            server: Some(ServerInfo { url: "https://speed.example.com".to_string(), latency_ms: 14.0 }),
            ..Default::default()
        };

        let map = results.as_map();
        assert_eq!(map["ping"], 14.0);
        assert_eq!(map["download"], 120_000_000.0);
        assert_eq!(map["upload"], 30_000_000.0);
        assert_eq!(map["server"]["url"], "https://speed.example.com");
        assert!(map.contains_key("timestamp"));
    }
}
