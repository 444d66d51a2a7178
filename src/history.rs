//! Append-only history of measurement results
//!
//! The whole log lives in one pretty-printed JSON array. Every append reads the
//! current array, pushes the new record and rewrites the file. A missing or
//! unreadable file is treated as an empty history.

use crate::error::{AppError, HistoryError, Result};
use crate::models::MeasurementRecord;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// JSON-file backed measurement log
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Create a store backed by `path`. The file is not touched until used.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the log, distinguishing why it could not be read
    pub fn try_load(&self) -> std::result::Result<Vec<MeasurementRecord>, HistoryError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(HistoryError::Missing(self.path.clone()));
            }
            Err(source) => {
                return Err(HistoryError::Io { path: self.path.clone(), source });
            }
        };

        serde_json::from_str(&content).map_err(|source| HistoryError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    /// Read the log; absent or corrupt files yield an empty history
    pub fn load(&self) -> Vec<MeasurementRecord> {
        self.try_load().unwrap_or_default()
    }

    /// The last `n` records in chronological order
    pub fn recent(&self, n: usize) -> Vec<MeasurementRecord> {
        let mut records = self.load();
        let skip = records.len().saturating_sub(n);
        records.drain(..skip);
        records
    }

    /// Append one record and rewrite the file
    pub fn append(&self, record: MeasurementRecord) -> Result<()> {
        let mut records = self.load();
        records.push(record);
        self.write_all(&records)
    }

    fn write_all(&self, records: &[MeasurementRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    AppError::history(format!("Failed to create history directory '{}': {}", parent.display(), e))
                })?;
            }
        }

        let content = serde_json::to_string_pretty(records)
            .map_err(|e| AppError::history(format!("Failed to serialize history: {}", e)))?;

        fs::write(&self.path, content)
            .map_err(|e| AppError::history(format!("Failed to write history file '{}': {}", self.path.display(), e)))
    }
}
