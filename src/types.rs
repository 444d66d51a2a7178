//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Measurement trigger state.
///
/// Only one run may be in flight; the trigger is accepted in `Idle` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// Waiting for the user
    #[default]
    Idle,
    /// A worker thread is measuring
    Running { run_id: Uuid },
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running { .. })
    }

    /// Correlation id of the in-flight run, if any
    pub fn run_id(&self) -> Option<Uuid> {
        match self {
            RunState::Idle => None,
            RunState::Running { run_id } => Some(*run_id),
        }
    }
}

/// Window appearance selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppearanceMode {
    /// Follow the operating system
    #[default]
    System,
    Light,
    Dark,
}

impl AppearanceMode {
    pub const ALL: [AppearanceMode; 3] = [AppearanceMode::System, AppearanceMode::Light, AppearanceMode::Dark];

    /// Label shown in the selector
    pub fn label(&self) -> &'static str {
        match self {
            AppearanceMode::System => "System",
            AppearanceMode::Light => "Light",
            AppearanceMode::Dark => "Dark",
        }
    }
}

impl fmt::Display for AppearanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AppearanceMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "system" => Ok(AppearanceMode::System),
            "light" => Ok(AppearanceMode::Light),
            "dark" => Ok(AppearanceMode::Dark),
            _ => Err(AppError::parse(format!("Invalid appearance mode: {} (expected system, light or dark)", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_state_default_is_idle() {
        let state = RunState::default();
        assert!(!state.is_running());
        assert_eq!(state.run_id(), None);
    }

    #[test]
    fn test_running_carries_id() {
        let id = Uuid::new_v4();
        let state = RunState::Running { run_id: id };
        assert!(state.is_running());
        assert_eq!(state.run_id(), Some(id));
    }

    #[test]
    fn test_appearance_parse() {
        assert_eq!("Dark".parse::<AppearanceMode>().unwrap(), AppearanceMode::Dark);
        assert_eq!(" light ".parse::<AppearanceMode>().unwrap(), AppearanceMode::Light);
        assert_eq!("SYSTEM".parse::<AppearanceMode>().unwrap(), AppearanceMode::System);
        assert!("sepia".parse::<AppearanceMode>().is_err());
    }

    #[test]
    fn test_appearance_labels() {
        let labels: Vec<_> = AppearanceMode::ALL.iter().map(|m| m.to_string()).collect();
        assert_eq!(labels, vec!["System", "Light", "Dark"]);
    }
}
