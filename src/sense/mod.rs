//! Signal acquisition
//!
//! The seam where real monitoring hooks plug in. The bundled simulator
//! draws each signal from its documented range so `run` and `check` work
//! out of the box.

use crate::contracts::SignalSet;
use crate::error::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces the current set of named signals, once per cycle
pub trait SignalSource: Send {
    /// Source identifier for logs
    fn name(&self) -> &str;

    /// Sample the environment
    fn sample(&mut self) -> Result<SignalSet>;
}

/// Simulated source drawing uniform values within each signal's range
pub struct SimulatedSource {
    rng: StdRng,
}

impl SimulatedSource {
    /// Create a simulator seeded from entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a reproducible simulator
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalSource for SimulatedSource {
    fn name(&self) -> &str {
        "simulated"
    }

    fn sample(&mut self) -> Result<SignalSet> {
        let mut signals = SignalSet::new();
        signals.insert("cpu_load", self.rng.gen_range(0.0..=1.0));
        signals.insert("memory_usage", self.rng.gen_range(0.0..=1.0));
        signals.insert("network_io", self.rng.gen_range(0.0..=1.0));
        signals.insert("error_rate", self.rng.gen_range(0.0..=0.3));
        signals.insert("response_variance", self.rng.gen_range(0.0..=1.0));
        signals.insert("token_entropy", self.rng.gen_range(0.0..=1.0));
        signals.insert("pattern_deviation", self.rng.gen_range(0.0..=0.5));
        signals.insert("recursion_depth", self.rng.gen_range(0.0..=0.8));
        Ok(signals)
    }
}
