//! Guard engine
//!
//! The sense → score → classify → act loop, its classifier, the bounded
//! snapshot history, and the emergency capture handler.

mod classify;
mod emergency;
mod history;

pub use classify::classify;
pub use emergency::EmergencyHandler;
pub use history::{HistoryBuffer, DEFAULT_HISTORY_CAPACITY};

use crate::config::GuardConfig;
use crate::contracts::{round_score, Snapshot};
use crate::error::{GuardError, Result};
use crate::kernel::ScoringKernel;
use crate::sense::SignalSource;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Loop lifecycle states
///
/// `Stopped` is terminal: a stopped loop never restarts, a fresh
/// instance must be created to resume monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Why a run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// A cycle classified critical; the emergency handler ran once
    CriticalTripped {
        /// The triggering snapshot
        snapshot: Snapshot,
        /// Artifact path, `None` when the capture itself failed
        artifact: Option<PathBuf>,
    },
    /// An external stop request interrupted the loop
    Cancelled,
}

/// The monitoring loop
///
/// Owns its history and emergency handler exclusively; hosts wanting
/// several monitors run one `GuardLoop` per signal domain with nothing
/// shared between them.
pub struct GuardLoop {
    config: GuardConfig,
    source: Box<dyn SignalSource>,
    kernel: Box<dyn ScoringKernel>,
    history: HistoryBuffer,
    emergency: EmergencyHandler,
    state: LoopState,
}

impl GuardLoop {
    /// Build a loop from a resolved kernel and signal source
    pub fn new(
        config: GuardConfig,
        source: Box<dyn SignalSource>,
        kernel: Box<dyn ScoringKernel>,
    ) -> Self {
        let history = HistoryBuffer::new(config.history_capacity);
        let emergency = match &config.artifact_dir {
            Some(dir) => EmergencyHandler::new(dir),
            None => EmergencyHandler::in_current_dir(),
        };

        Self {
            config,
            source,
            kernel,
            history,
            emergency,
            state: LoopState::Running,
        }
    }

    /// Snapshot history for diagnostics
    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// Current lifecycle state
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Run until a critical verdict, a stop request, or a fatal error
    ///
    /// The stop channel is observed before each cycle and during the
    /// inter-cycle sleep. Sampling and scoring errors abort only the
    /// current cycle; after `max_consecutive_failures` in a row the loop
    /// gives up rather than retrying silently forever.
    pub async fn run(&mut self, mut stop: watch::Receiver<bool>) -> Result<RunOutcome> {
        if self.state == LoopState::Stopped {
            return Ok(RunOutcome::Cancelled);
        }

        info!(
            kernel = self.kernel.name(),
            source = self.source.name(),
            interval_ms = self.config.interval_ms,
            "guard started"
        );
        info!(
            stress_critical = self.config.thresholds.stress_critical,
            volatility_critical = self.config.thresholds.volatility_critical,
            stress_warning = self.config.thresholds.stress_warning,
            volatility_warning = self.config.thresholds.volatility_warning,
            "thresholds"
        );

        let mut consecutive_failures: u32 = 0;

        loop {
            if *stop.borrow() {
                self.state = LoopState::Stopped;
                info!("stop requested");
                return Ok(RunOutcome::Cancelled);
            }

            match self.cycle() {
                Ok(snapshot) => {
                    consecutive_failures = 0;
                    info!(
                        stress = snapshot.stress,
                        volatility = snapshot.volatility,
                        status = %snapshot.verdict,
                        "cycle"
                    );

                    if snapshot.verdict.is_critical() {
                        let artifact = match self.emergency.on_critical(&snapshot) {
                            Ok(path) => Some(path),
                            Err(err) => {
                                // The capture is lost; the stop is not.
                                error!(error = %err, "emergency capture failed");
                                None
                            }
                        };
                        self.state = LoopState::Stopped;
                        return Ok(RunOutcome::CriticalTripped { snapshot, artifact });
                    }
                }
                Err(err) => {
                    consecutive_failures += 1;
                    warn!(
                        error = %err,
                        consecutive = consecutive_failures,
                        "cycle aborted"
                    );
                    if consecutive_failures >= self.config.max_consecutive_failures {
                        self.state = LoopState::Stopped;
                        return Err(GuardError::ConsecutiveFailures {
                            count: consecutive_failures,
                        });
                    }
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.interval()) => {}
                _ = wait_for_stop(&mut stop) => {
                    self.state = LoopState::Stopped;
                    info!("stop requested");
                    return Ok(RunOutcome::Cancelled);
                }
            }
        }
    }

    /// One sense → score → classify → append pass
    fn cycle(&mut self) -> Result<Snapshot> {
        let signals = self.source.sample()?;
        let stress = round_score(self.kernel.compute_stress(&signals)?);
        let volatility = round_score(self.kernel.compute_volatility(&signals)?);
        let verdict = classify(stress, volatility, &self.config.thresholds);

        let snapshot = Snapshot::new(stress, volatility, verdict, signals);
        self.history.append(snapshot.clone());
        Ok(snapshot)
    }
}

/// Resolves once the stop flag is raised
async fn wait_for_stop(stop: &mut watch::Receiver<bool>) {
    loop {
        if *stop.borrow() {
            return;
        }
        if stop.changed().await.is_err() {
            // Sender dropped: cancellation can no longer arrive.
            std::future::pending::<()>().await;
        }
    }
}
