//! Scoring kernels
//!
//! The replaceable capability that turns a raw signal sample into the
//! stress and volatility scores. Two implementations exist: the built-in
//! fallback math and an optionally loaded compiled plugin. Which one runs
//! is decided exactly once, before the loop starts; steady state never
//! re-checks.

mod fallback;
mod plugin;

pub use fallback::FallbackKernel;
pub use plugin::{KernelPlugin, KERNEL_LIBRARY_NAME};

use crate::contracts::SignalSet;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// A scoring kernel
///
/// Both computations are pure and deterministic for identical input, and
/// must not block: they sit on the hot path of the guard cycle.
pub trait ScoringKernel: Send + Sync {
    /// Kernel identifier for logs
    fn name(&self) -> &str;

    /// Aggregate pressure score in [0, 1]
    fn compute_stress(&self, signals: &SignalSet) -> Result<f64>;

    /// Aggregate unpredictability score in [0, 1]
    fn compute_volatility(&self, signals: &SignalSet) -> Result<f64>;
}

/// Resolve the scoring kernel, once, at startup
///
/// An explicit path wins over the executable-directory search. A plugin
/// that is simply absent is expected and falls back with a single WARN; a
/// plugin that is present but broken is a fatal error, because a
/// partially loaded kernel cannot be trusted.
pub fn resolve(explicit: Option<&Path>) -> Result<Box<dyn ScoringKernel>> {
    let candidate = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => search_candidates().into_iter().find(|p| p.exists()),
    };

    match candidate {
        Some(path) if path.exists() => {
            let plugin = KernelPlugin::load(&path)?;
            tracing::info!(path = %path.display(), "loaded private scoring kernel");
            Ok(Box::new(plugin))
        }
        _ => {
            tracing::warn!(
                "private scoring kernel not found - using fallback math (demo-grade)"
            );
            Ok(Box::new(FallbackKernel))
        }
    }
}

/// Well-known plugin locations: the executable's own directory
fn search_candidates() -> Vec<PathBuf> {
    let Ok(exe) = std::env::current_exe() else {
        return Vec::new();
    };
    let Some(dir) = exe.parent() else {
        return Vec::new();
    };

    let suffix = std::env::consts::DLL_SUFFIX;
    let prefix = std::env::consts::DLL_PREFIX;

    let mut candidates = vec![dir.join(format!("{KERNEL_LIBRARY_NAME}{suffix}"))];
    if !prefix.is_empty() {
        candidates.push(dir.join(format!("{prefix}{KERNEL_LIBRARY_NAME}{suffix}")));
    }
    candidates
}
