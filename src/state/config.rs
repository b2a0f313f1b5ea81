// Monitor configuration
// JSON config file with environment overrides; every field has a default

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use super::storage::{self, StorageError};
use crate::alert::{AlertPolicy, AlertThresholdOverrides, AlertThresholds};
use crate::classify::EngineBackend;
use crate::pipeline::Trigger;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for {key}: {value}")]
    InvalidOverride { key: &'static str, value: String },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub const ENV_SAMPLES: &str = "ECG_SAMPLES";
pub const ENV_MODEL: &str = "ECG_MODEL";
pub const ENV_INTERVAL_MS: &str = "ECG_INTERVAL_MS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// CSV of labelled beats
    pub samples_path: PathBuf,

    /// Model artifact
    pub model_path: PathBuf,

    pub backend: EngineBackend,

    pub trigger: Trigger,

    /// Delay between periodic cycles
    pub interval_ms: u64,

    pub alert_policy: AlertPolicy,

    /// Overrides the policy's default thresholds field by field
    pub thresholds: Option<AlertThresholdOverrides>,

    /// JSONL session trace, disabled when unset
    pub trace_path: Option<PathBuf>,

    /// Stop after this many cycles
    pub max_cycles: Option<u64>,

    /// Log filter used when RUST_LOG is unset
    pub log_level: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            samples_path: PathBuf::from("data.csv"),
            model_path: PathBuf::from("model.json"),
            backend: EngineBackend::default(),
            trigger: Trigger::default(),
            interval_ms: 3000,
            alert_policy: AlertPolicy::default(),
            thresholds: None,
            trace_path: None,
            max_cycles: None,
            log_level: "info".to_string(),
        }
    }
}

impl MonitorConfig {
    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = storage::read_file(path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Resolve configuration: explicit file, else the per-user config file if
    /// present, else defaults. Environment overrides and validation follow.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match storage::default_config_path() {
                Ok(path) if path.is_file() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in practice)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_SAMPLES) {
            self.samples_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_MODEL) {
            self.model_path = PathBuf::from(path);
        }
        if let Some(value) = lookup(ENV_INTERVAL_MS) {
            self.interval_ms = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidOverride {
                    key: ENV_INTERVAL_MS,
                    value,
                })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trigger == Trigger::Periodic && self.interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "interval_ms must be greater than zero".to_string(),
            ));
        }
        let thresholds = self.thresholds();
        if thresholds.orange == 0 || thresholds.red == 0 || thresholds.grey == Some(0) {
            return Err(ConfigError::Invalid(
                "alert thresholds must be greater than zero".to_string(),
            ));
        }
        if thresholds.orange > thresholds.red {
            return Err(ConfigError::Invalid(format!(
                "orange threshold {} is above red threshold {}",
                thresholds.orange, thresholds.red
            )));
        }
        Ok(())
    }

    /// Configured thresholds, missing fields taken from the policy defaults
    pub fn thresholds(&self) -> AlertThresholds {
        self.thresholds
            .unwrap_or_default()
            .resolve(self.alert_policy)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}
