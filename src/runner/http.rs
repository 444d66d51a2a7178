//! HTTP speed-test capability
//!
//! Talks to servers exposing `GET /__down?bytes=N` and `POST /__up`.
//! Latency is the mean round trip of empty downloads; throughput is the
//! number of bits moved divided by the wall time of the transfer.

use super::backend::{BackendFactory, MeasureResult, ServerInfo, SpeedTestBackend, SpeedTestResults};
use crate::error::MeasurementError;
use crate::models::Config;
use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use reqwest::Client;
use std::time::{Duration, Instant};

/// Settings for the HTTP capability
#[derive(Debug, Clone, PartialEq)]
pub struct HttpBackendSettings {
    pub servers: Vec<String>,
    pub timeout: Duration,
    pub ping_samples: u32,
    pub download_bytes: u64,
    pub upload_bytes: u64,
}

impl From<&Config> for HttpBackendSettings {
    fn from(config: &Config) -> Self {
        Self {
            servers: config.servers.clone(),
            timeout: config.timeout(),
            ping_samples: config.ping_samples,
            download_bytes: config.download_bytes,
            upload_bytes: config.upload_bytes,
        }
    }
}

/// Creates an `HttpSpeedTestBackend` per run
#[derive(Debug, Clone)]
pub struct HttpBackendFactory {
    settings: HttpBackendSettings,
}

impl HttpBackendFactory {
    pub fn new(settings: HttpBackendSettings) -> Self {
        Self { settings }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(HttpBackendSettings::from(config))
    }

    pub fn settings(&self) -> &HttpBackendSettings {
        &self.settings
    }
}

impl BackendFactory for HttpBackendFactory {
    fn create(&self) -> MeasureResult<Box<dyn SpeedTestBackend>> {
        Ok(Box::new(HttpSpeedTestBackend::new(self.settings.clone())?))
    }
}

/// reqwest-based implementation of the capability
pub struct HttpSpeedTestBackend {
    client: Client,
    settings: HttpBackendSettings,
    results: SpeedTestResults,
}

impl HttpSpeedTestBackend {
    pub fn new(settings: HttpBackendSettings) -> MeasureResult<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(format!("{}/{}", crate::PKG_NAME, crate::VERSION))
            .build()
            .map_err(|e| MeasurementError::runtime(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            settings,
            results: SpeedTestResults::default(),
        })
    }

    fn endpoint(base: &str, path: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), path)
    }

    fn selected_server(&self) -> MeasureResult<&ServerInfo> {
        self.results
            .server
            .as_ref()
            .ok_or_else(|| MeasurementError::no_server("no server selected; call best_server first"))
    }

    /// Mean round trip of `ping_samples` empty downloads, if any succeeded
    async fn probe_latency(&self, base: &str) -> Option<f64> {
        let url = Self::endpoint(base, "__down");
        let mut samples = Vec::new();

        for _ in 0..self.settings.ping_samples {
            let started = Instant::now();
            let response = match self.client.get(&url).query(&[("bytes", 0u64)]).send().await {
                Ok(response) if response.status().is_success() => response,
                _ => continue,
            };
            if response.bytes().await.is_err() {
                continue;
            }
            samples.push(started.elapsed().as_secs_f64() * 1000.0);
        }

        if samples.is_empty() {
            None
        } else {
            Some(samples.iter().sum::<f64>() / samples.len() as f64)
        }
    }
}

fn bits_per_second(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64().max(f64::EPSILON);
    (bytes as f64 * 8.0) / secs
}

#[async_trait]
impl SpeedTestBackend for HttpSpeedTestBackend {
    async fn best_server(&mut self) -> MeasureResult<ServerInfo> {
        let mut best: Option<ServerInfo> = None;

        for base in &self.settings.servers {
            if let Some(latency_ms) = self.probe_latency(base).await {
                let better = best.as_ref().map_or(true, |b| latency_ms < b.latency_ms);
                if better {
                    best = Some(ServerInfo { url: base.clone(), latency_ms });
                }
            }
        }

        let server = best.ok_or_else(|| {
            MeasurementError::no_server(format!(
                "none of {} candidate server(s) answered",
                self.settings.servers.len()
            ))
        })?;

        self.results.ping = server.latency_ms;
        self.results.server = Some(server.clone());
        Ok(server)
    }

    async fn measure_download(&mut self) -> MeasureResult<f64> {
        let url = Self::endpoint(&self.selected_server()?.url, "__down");

        let started = Instant::now();
        let response = self
            .client
            .get(&url)
            .query(&[("bytes", self.settings.download_bytes)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MeasurementError::transfer(format!(
                "download returned HTTP {}",
                response.status().as_u16()
            )));
        }

        let mut received: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            received += chunk?.len() as u64;
        }

        if received == 0 {
            return Err(MeasurementError::transfer("download returned an empty body"));
        }

        let bps = bits_per_second(received, started.elapsed());
        self.results.download = bps;
        self.results.bytes_received += received;
        Ok(bps)
    }

    async fn measure_upload(&mut self) -> MeasureResult<f64> {
        let url = Self::endpoint(&self.selected_server()?.url, "__up");
        let payload = vec![0u8; self.settings.upload_bytes as usize];
        let sent = payload.len() as u64;

        let started = Instant::now();
        let response = self.client.post(&url).body(payload).send().await?;

        if !response.status().is_success() {
            return Err(MeasurementError::transfer(format!(
                "upload returned HTTP {}",
                response.status().as_u16()
            )));
        }
        // Count the server's acknowledgement in the timing
        response.bytes().await?;

        let bps = bits_per_second(sent, started.elapsed());
        self.results.upload = bps;
        self.results.bytes_sent += sent;
        Ok(bps)
    }

    fn results(&self) -> SpeedTestResults {
        SpeedTestResults {
            timestamp: Utc::now(),
            ..self.results.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(servers: Vec<String>) -> HttpBackendSettings {
        HttpBackendSettings {
            servers,
            timeout: Duration::from_secs(2),
            ping_samples: 2,
            download_bytes: 4096,
            upload_bytes: 2048,
        }
    }

    #[test]
    fn test_endpoint_joins_paths() {
        assert_eq!(
            HttpSpeedTestBackend::endpoint("https://speed.example.com/", "__down"),
            "https://speed.example.com/__down"
        );
        assert_eq!(
            HttpSpeedTestBackend::endpoint("http://127.0.0.1:8080", "__up"),
            "http://127.0.0.1:8080/__up"
        );
    }

    #[test]
    fn test_bits_per_second() {
        assert_eq!(bits_per_second(1_000_000, Duration::from_secs(1)), 8_000_000.0);
        assert_eq!(bits_per_second(500_000, Duration::from_millis(500)), 8_000_000.0);
        assert!(bits_per_second(10, Duration::ZERO).is_finite());
    }

    #[test]
    fn test_settings_from_config() {
        let config = Config::default();
        let settings = HttpBackendSettings::from(&config);
        assert_eq!(settings.servers, config.servers);
        assert_eq!(settings.timeout, config.timeout());
        assert_eq!(settings.download_bytes, config.download_bytes);
    }

    #[test]
    fn test_transfer_before_server_selection_fails() {
        let mut backend = HttpSpeedTestBackend::new(settings(vec!["http://127.0.0.1:9".to_string()])).unwrap();
        let err = tokio_test::block_on(backend.measure_download()).unwrap_err();
        assert!(matches!(err, MeasurementError::NoServer(_)));
    }

    #[test]
    fn test_factory_creates_fresh_backend() {
        let factory = HttpBackendFactory::new(settings(vec!["http://127.0.0.1:9".to_string()]));
        let backend = factory.create().unwrap();
        let results = backend.results();
        assert_eq!(results.server, None);
        assert_eq!(results.bytes_received, 0);
    }
}
