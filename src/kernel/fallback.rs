//! Built-in fallback kernel
//!
//! Toy weighted sums that keep the guard runnable without a real scoring
//! engine. Fine for demos, explicitly not production-grade: the weights
//! are only meaningful while every signal stays inside its documented
//! range.

use super::ScoringKernel;
use crate::contracts::{clamp_score, SignalSet};
use crate::error::Result;

/// Demo-grade weighted-sum kernel
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackKernel;

impl ScoringKernel for FallbackKernel {
    fn name(&self) -> &str {
        "fallback"
    }

    fn compute_stress(&self, signals: &SignalSet) -> Result<f64> {
        let raw = 0.3 * signals.require("cpu_load")?
            + 0.3 * signals.require("memory_usage")?
            + 0.2 * signals.require("network_io")?
            + 0.2 * signals.require("error_rate")?;
        Ok(clamp_score(raw))
    }

    fn compute_volatility(&self, signals: &SignalSet) -> Result<f64> {
        let raw = 0.4 * signals.require("response_variance")?
            + 0.3 * signals.require("token_entropy")?
            + 0.2 * signals.require("pattern_deviation")?
            + 0.1 * signals.require("recursion_depth")?;
        Ok(clamp_score(raw))
    }
}
