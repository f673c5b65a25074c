//! Error types for the guard
//!
//! Structured errors for scoring, plugin resolution, artifact capture,
//! and downstream submission.

use thiserror::Error;

/// Main error type for guard operations
#[derive(Error, Debug)]
pub enum GuardError {
    /// A signal required by the scoring kernel was absent from the sample
    #[error("missing required signal: {name}")]
    MissingSignal { name: String },

    /// A kernel plugin was present but could not be loaded or is malformed
    #[error("kernel plugin load failed: {0}")]
    PluginLoad(String),

    /// Signal acquisition failed for the current cycle
    #[error("signal acquisition failed: {0}")]
    SignalAcquisition(String),

    /// The emergency artifact could not be persisted
    #[error("emergency artifact write failed: {0}")]
    ArtifactWrite(String),

    /// Downstream frame/receipt delivery failed
    #[error("submission failed: {0}")]
    Submission(String),

    /// Too many consecutive cycles aborted
    #[error("aborted after {count} consecutive failed cycles")]
    ConsecutiveFailures { count: u32 },

    /// Configuration loading or parsing error
    #[error("configuration error: {0}")]
    Config(String),
}

impl GuardError {
    /// Create a missing signal error
    pub fn missing_signal(name: impl Into<String>) -> Self {
        GuardError::MissingSignal { name: name.into() }
    }

    /// Create a plugin load error
    pub fn plugin_load(msg: impl Into<String>) -> Self {
        GuardError::PluginLoad(msg.into())
    }

    /// Create an artifact write error
    pub fn artifact_write(msg: impl Into<String>) -> Self {
        GuardError::ArtifactWrite(msg.into())
    }

    /// Create a submission error
    pub fn submission(msg: impl Into<String>) -> Self {
        GuardError::Submission(msg.into())
    }

    /// Check whether the process should exit non-zero on this error
    ///
    /// Artifact and submission failures are reported but stay contained;
    /// everything in this set means the monitor cannot be trusted to
    /// continue.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            GuardError::PluginLoad(_)
                | GuardError::ConsecutiveFailures { .. }
                | GuardError::Config(_)
        )
    }
}

impl From<serde_json::Error> for GuardError {
    fn from(err: serde_json::Error) -> Self {
        GuardError::Config(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for GuardError {
    fn from(err: serde_yaml::Error) -> Self {
        GuardError::Config(format!("YAML error: {}", err))
    }
}

/// Result type alias for guard operations
pub type Result<T> = std::result::Result<T, GuardError>;
