//! Emergency capture
//!
//! Persists the triggering snapshot as a JSON artifact named from the
//! event time. A failed write is reported to the caller but must never
//! keep the loop from stopping.

use crate::contracts::{EmergencyArtifact, Snapshot};
use crate::error::{GuardError, Result};
use std::path::{Path, PathBuf};
use tracing::error;

/// Writes emergency artifacts to a fixed directory
#[derive(Debug, Clone)]
pub struct EmergencyHandler {
    dir: PathBuf,
}

impl EmergencyHandler {
    /// Capture into the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Capture into the current working directory
    pub fn in_current_dir() -> Self {
        Self::new(".")
    }

    /// Artifact directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist the triggering snapshot and return the artifact path
    ///
    /// Called at most once per emergency event; the loop stops right
    /// after regardless of the outcome here.
    pub fn on_critical(&self, snapshot: &Snapshot) -> Result<PathBuf> {
        error!(
            stress = snapshot.stress,
            volatility = snapshot.volatility,
            status = %snapshot.verdict,
            "EMERGENCY STOP triggered"
        );

        let artifact = EmergencyArtifact::from_snapshot(snapshot);
        let name = format!("emergency_{}.json", snapshot.timestamp.timestamp());
        let path = self.dir.join(name);

        let body = serde_json::to_string_pretty(&artifact)
            .map_err(|e| GuardError::artifact_write(e.to_string()))?;
        std::fs::write(&path, body)
            .map_err(|e| GuardError::artifact_write(format!("{}: {}", path.display(), e)))?;

        error!(path = %path.display(), "emergency snapshot saved");
        Ok(path)
    }
}

impl Default for EmergencyHandler {
    fn default() -> Self {
        Self::in_current_dir()
    }
}
