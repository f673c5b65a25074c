//! Guard contracts
//!
//! Defines the signal sample, score classification, per-cycle snapshot,
//! and the emergency artifact document.

mod frame;

pub use frame::*;

use crate::error::{GuardError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Signals the built-in fallback kernel requires, in canonical order.
///
/// The order matters: kernel plugins receive the values as a flat array
/// indexed by this list.
pub const REQUIRED_SIGNALS: [&str; 8] = [
    "cpu_load",
    "memory_usage",
    "network_io",
    "error_rate",
    "response_variance",
    "token_entropy",
    "pattern_deviation",
    "recursion_depth",
];

/// One sample of named numeric signals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalSet(HashMap<String, f64>);

impl SignalSet {
    /// Create an empty signal set
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Insert or overwrite a signal value
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    /// Look up a signal value
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// Look up a signal the caller cannot proceed without
    pub fn require(&self, name: &str) -> Result<f64> {
        self.get(name)
            .ok_or_else(|| GuardError::missing_signal(name))
    }

    /// Collect the required signals as a flat array in canonical order
    ///
    /// This is the calling convention for kernel plugins.
    pub fn canonical_values(&self) -> Result<[f64; 8]> {
        let mut values = [0.0; 8];
        for (slot, name) in values.iter_mut().zip(REQUIRED_SIGNALS) {
            *slot = self.require(name)?;
        }
        Ok(values)
    }

    /// Number of signals in the sample
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the sample is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for SignalSet {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[(&str, f64); N]> for SignalSet {
    fn from(pairs: [(&str, f64); N]) -> Self {
        pairs
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }
}

/// Clamp a raw kernel output into the score range
///
/// NaN maps to 0.0 rather than poisoning downstream comparisons.
pub fn clamp_score(raw: f64) -> f64 {
    if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, 1.0)
    }
}

/// Round a score to three decimal places for logging and snapshots
pub fn round_score(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}

/// Severity levels, ordered
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Both scores within nominal bands
    Safe,
    /// At least one score elevated past its warning threshold
    Warning,
    /// A score crossed its critical threshold; the loop must stop
    Critical,
}

/// What tripped a non-safe classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cause {
    /// Warning band entered
    Elevated,
    /// Stress crossed its critical threshold
    HighStress,
    /// Volatility crossed its critical threshold
    HighVolatility,
}

/// Classification result: severity plus the cause that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Severity level
    pub severity: Severity,

    /// Trigger cause, absent when safe
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Cause>,
}

impl Verdict {
    /// Safe verdict
    pub fn safe() -> Self {
        Self {
            severity: Severity::Safe,
            cause: None,
        }
    }

    /// Warning verdict
    pub fn warning() -> Self {
        Self {
            severity: Severity::Warning,
            cause: Some(Cause::Elevated),
        }
    }

    /// Critical verdict triggered by stress
    pub fn critical_stress() -> Self {
        Self {
            severity: Severity::Critical,
            cause: Some(Cause::HighStress),
        }
    }

    /// Critical verdict triggered by volatility
    pub fn critical_volatility() -> Self {
        Self {
            severity: Severity::Critical,
            cause: Some(Cause::HighVolatility),
        }
    }

    /// Whether this verdict stops the loop
    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.severity, self.cause) {
            (Severity::Safe, _) => write!(f, "SAFE"),
            (Severity::Warning, _) => write!(f, "WARNING - ELEVATED"),
            (Severity::Critical, Some(Cause::HighVolatility)) => {
                write!(f, "CRITICAL - HIGH VOLATILITY")
            }
            (Severity::Critical, _) => write!(f, "CRITICAL - HIGH STRESS"),
        }
    }
}

/// One cycle's immutable record of scores, verdict, and raw signals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Aggregate pressure score in [0, 1]
    pub stress: f64,

    /// Aggregate unpredictability score in [0, 1]
    pub volatility: f64,

    /// Classification for this cycle
    pub verdict: Verdict,

    /// Cycle timestamp
    pub timestamp: DateTime<Utc>,

    /// Raw signals the scores were derived from
    pub signals: SignalSet,
}

impl Snapshot {
    /// Create a snapshot stamped with the current time
    pub fn new(stress: f64, volatility: f64, verdict: Verdict, signals: SignalSet) -> Self {
        Self {
            stress,
            volatility,
            verdict,
            timestamp: Utc::now(),
            signals,
        }
    }
}

/// Durable capture of the snapshot that tripped an emergency stop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyArtifact {
    /// Event time, ISO-8601
    pub timestamp: DateTime<Utc>,

    /// Stress score at the event
    pub stress: f64,

    /// Volatility score at the event
    pub volatility: f64,

    /// Human-readable severity label
    pub status: String,

    /// Raw signals at the event
    pub signals: SignalSet,
}

impl EmergencyArtifact {
    /// Build the artifact document from the triggering snapshot
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            timestamp: snapshot.timestamp,
            stress: snapshot.stress,
            volatility: snapshot.volatility,
            status: snapshot.verdict.to_string(),
            signals: snapshot.signals.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_present_and_missing() {
        let signals = SignalSet::from([("cpu_load", 0.4)]);
        assert_eq!(signals.require("cpu_load").unwrap(), 0.4);

        let err = signals.require("token_entropy").unwrap_err();
        assert!(matches!(err, GuardError::MissingSignal { name } if name == "token_entropy"));
    }

    #[test]
    fn test_canonical_values_order() {
        let mut signals = SignalSet::new();
        for (i, name) in REQUIRED_SIGNALS.iter().enumerate() {
            signals.insert(*name, i as f64 / 10.0);
        }

        let values = signals.canonical_values().unwrap();
        assert_eq!(values[0], 0.0); // cpu_load
        assert_eq!(values[5], 0.5); // token_entropy
        assert_eq!(values[7], 0.7); // recursion_depth
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(1.7), 1.0);
        assert_eq!(clamp_score(-0.2), 0.0);
        assert_eq!(clamp_score(0.42), 0.42);
        assert_eq!(clamp_score(f64::NAN), 0.0);
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.8512), 0.851);
        assert_eq!(round_score(0.85), 0.85);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Safe < Severity::Warning);
        assert!(Severity::Warning < Severity::Critical);
    }

    #[test]
    fn test_verdict_labels() {
        assert_eq!(Verdict::safe().to_string(), "SAFE");
        assert_eq!(Verdict::warning().to_string(), "WARNING - ELEVATED");
        assert_eq!(
            Verdict::critical_stress().to_string(),
            "CRITICAL - HIGH STRESS"
        );
        assert_eq!(
            Verdict::critical_volatility().to_string(),
            "CRITICAL - HIGH VOLATILITY"
        );
    }

    #[test]
    fn test_artifact_from_snapshot() {
        let signals = SignalSet::from([("cpu_load", 0.9)]);
        let snapshot = Snapshot::new(0.85, 0.3, Verdict::critical_stress(), signals);

        let artifact = EmergencyArtifact::from_snapshot(&snapshot);
        assert_eq!(artifact.stress, 0.85);
        assert_eq!(artifact.status, "CRITICAL - HIGH STRESS");
        assert_eq!(artifact.signals.get("cpu_load"), Some(0.9));

        let json = serde_json::to_value(&artifact).unwrap();
        assert!(json["timestamp"].is_string());
        assert_eq!(json["stress"], 0.85);
    }
}
