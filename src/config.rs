//! Guard configuration
//!
//! Thresholds and loop settings with serde defaults, loadable from a
//! JSON or YAML file selected by extension.

use crate::error::{GuardError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Classification thresholds
///
/// All comparisons are strict `>`; a score exactly at a threshold stays
/// in the lower band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Stress level above which the loop trips critical
    #[serde(default = "default_stress_critical")]
    pub stress_critical: f64,

    /// Volatility level above which the loop trips critical
    #[serde(default = "default_volatility_critical")]
    pub volatility_critical: f64,

    /// Stress level above which a warning is raised
    #[serde(default = "default_stress_warning")]
    pub stress_warning: f64,

    /// Volatility level above which a warning is raised
    #[serde(default = "default_volatility_warning")]
    pub volatility_warning: f64,
}

fn default_stress_critical() -> f64 {
    0.80
}

fn default_volatility_critical() -> f64 {
    0.70
}

fn default_stress_warning() -> f64 {
    0.60
}

fn default_volatility_warning() -> f64 {
    0.50
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            stress_critical: default_stress_critical(),
            volatility_critical: default_volatility_critical(),
            stress_warning: default_stress_warning(),
            volatility_warning: default_volatility_warning(),
        }
    }
}

/// Full guard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Inter-cycle sleep in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Classification thresholds
    #[serde(default)]
    pub thresholds: Thresholds,

    /// Maximum snapshots retained in the history ring
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Directory for emergency artifacts, current directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_dir: Option<PathBuf>,

    /// Explicit kernel plugin path, overrides executable-directory search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernel_path: Option<PathBuf>,

    /// Consecutive failed cycles tolerated before the loop aborts
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
}

fn default_interval_ms() -> u64 {
    2000
}

fn default_history_capacity() -> usize {
    crate::engine::DEFAULT_HISTORY_CAPACITY
}

fn default_max_consecutive_failures() -> u32 {
    5
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            thresholds: Thresholds::default(),
            history_capacity: default_history_capacity(),
            artifact_dir: None,
            kernel_path: None,
            max_consecutive_failures: default_max_consecutive_failures(),
        }
    }
}

impl GuardConfig {
    /// Load configuration from a JSON or YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| GuardError::Config(format!("{}: {}", path.display(), e)))?;

        let config = if matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        ) {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        Ok(config)
    }

    /// Inter-cycle sleep as a duration
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}
