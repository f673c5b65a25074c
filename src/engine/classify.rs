//! Threshold classifier
//!
//! Pure mapping from the two scores to a verdict. Stress is checked
//! before volatility at every tier so simultaneous breaches classify
//! reproducibly.

use crate::config::Thresholds;
use crate::contracts::Verdict;

/// Classify a (stress, volatility) pair
///
/// First match wins; all comparisons are strict `>`.
pub fn classify(stress: f64, volatility: f64, thresholds: &Thresholds) -> Verdict {
    if stress > thresholds.stress_critical {
        return Verdict::critical_stress();
    }
    if volatility > thresholds.volatility_critical {
        return Verdict::critical_volatility();
    }
    if stress > thresholds.stress_warning || volatility > thresholds.volatility_warning {
        return Verdict::warning();
    }
    Verdict::safe()
}
