//! Compiled kernel plugin
//!
//! Loads the proprietary scoring kernel from a dynamic library dropped
//! next to the executable (or an explicitly configured path). The library
//! must export two C-ABI entry points:
//!
//! ```c
//! double compute_kappa(const double *signals, size_t len);
//! double compute_epsilon(const double *signals, size_t len);
//! ```
//!
//! Both receive the required signals as a flat array in the canonical
//! order of [`crate::contracts::REQUIRED_SIGNALS`]. Returned values are
//! clamped into [0, 1] on the way out.

use super::ScoringKernel;
use crate::contracts::{clamp_score, SignalSet};
use crate::error::{GuardError, Result};
use libloading::Library;
use std::path::{Path, PathBuf};

/// Logical plugin name, before the platform prefix/suffix is applied
pub const KERNEL_LIBRARY_NAME: &str = "emergence_kernel";

type KernelFn = unsafe extern "C" fn(*const f64, usize) -> f64;

/// Scoring kernel backed by a loaded dynamic library
pub struct KernelPlugin {
    path: PathBuf,
    stress_fn: KernelFn,
    volatility_fn: KernelFn,
    // Keeps the resolved function pointers valid.
    _library: Library,
}

impl KernelPlugin {
    /// Load the plugin at `path` and resolve both entry points
    ///
    /// Any failure here is fatal to startup: a library that exists but
    /// cannot be fully resolved must not be silently replaced by the
    /// fallback.
    pub fn load(path: &Path) -> Result<Self> {
        let library = unsafe { Library::new(path) }
            .map_err(|e| GuardError::plugin_load(format!("{}: {}", path.display(), e)))?;

        let stress_fn = unsafe {
            *library
                .get::<KernelFn>(b"compute_kappa\0")
                .map_err(|e| GuardError::plugin_load(format!("compute_kappa: {}", e)))?
        };
        let volatility_fn = unsafe {
            *library
                .get::<KernelFn>(b"compute_epsilon\0")
                .map_err(|e| GuardError::plugin_load(format!("compute_epsilon: {}", e)))?
        };

        Ok(Self {
            path: path.to_path_buf(),
            stress_fn,
            volatility_fn,
            _library: library,
        })
    }

    /// Path the plugin was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoringKernel for KernelPlugin {
    fn name(&self) -> &str {
        KERNEL_LIBRARY_NAME
    }

    fn compute_stress(&self, signals: &SignalSet) -> Result<f64> {
        let values = signals.canonical_values()?;
        let raw = unsafe { (self.stress_fn)(values.as_ptr(), values.len()) };
        Ok(clamp_score(raw))
    }

    fn compute_volatility(&self, signals: &SignalSet) -> Result<f64> {
        let values = signals.canonical_values()?;
        let raw = unsafe { (self.volatility_fn)(values.as_ptr(), values.len()) };
        Ok(clamp_score(raw))
    }
}

impl std::fmt::Debug for KernelPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelPlugin")
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_rejects_malformed_library() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emergence_kernel.so");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"not a shared object").unwrap();

        let err = KernelPlugin::load(&path).unwrap_err();
        assert!(matches!(err, GuardError::PluginLoad(_)));
        assert!(err.is_fatal());
    }
}
