//! Measurement records stored in the history file

use crate::defaults::TIMESTAMP_FORMAT;
use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Bits per second in one megabit per second
pub const BITS_PER_MEGABIT: f64 = 1_000_000.0;

/// Convert a raw bits-per-second figure to Mbps
pub fn bits_to_mbps(bits_per_second: f64) -> f64 {
    bits_per_second / BITS_PER_MEGABIT
}

/// Converted result of one successful run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedSample {
    pub ping_ms: f64,
    pub download_mbps: f64,
    pub upload_mbps: f64,
}

impl SpeedSample {
    pub fn new(ping_ms: f64, download_mbps: f64, upload_mbps: f64) -> Self {
        Self { ping_ms, download_mbps, upload_mbps }
    }

    /// Build a sample from raw capability output (throughput in bits/s)
    pub fn from_raw(ping_ms: f64, download_bps: f64, upload_bps: f64) -> Self {
        Self {
            ping_ms,
            download_mbps: bits_to_mbps(download_bps),
            upload_mbps: bits_to_mbps(upload_bps),
        }
    }

    /// Stamp the sample with the given time, truncated to the minute
    pub fn into_record(self, at: NaiveDateTime) -> MeasurementRecord {
        MeasurementRecord::new(at, self.ping_ms, self.download_mbps, self.upload_mbps)
    }

    /// Stamp the sample with the current local time
    pub fn into_record_now(self) -> MeasurementRecord {
        self.into_record(Local::now().naive_local())
    }
}

/// One entry of the history log. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    #[serde(with = "minute_timestamp")]
    timestamp: NaiveDateTime,
    #[serde(rename = "ping")]
    ping_ms: f64,
    #[serde(rename = "download")]
    download_mbps: f64,
    #[serde(rename = "upload")]
    upload_mbps: f64,
}

impl MeasurementRecord {
    pub fn new(timestamp: NaiveDateTime, ping_ms: f64, download_mbps: f64, upload_mbps: f64) -> Self {
        Self {
            timestamp: truncate_to_minute(timestamp),
            ping_ms,
            download_mbps,
            upload_mbps,
        }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Timestamp as written in the history file
    pub fn timestamp_label(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn ping_ms(&self) -> f64 {
        self.ping_ms
    }

    pub fn download_mbps(&self) -> f64 {
        self.download_mbps
    }

    pub fn upload_mbps(&self) -> f64 {
        self.upload_mbps
    }
}

fn truncate_to_minute(at: NaiveDateTime) -> NaiveDateTime {
    at.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(at)
}

/// "YYYY-MM-DD HH:MM" (de)serialization
mod minute_timestamp {
    use crate::defaults::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(de::Error::custom)
    }
}
