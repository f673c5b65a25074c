//! Emergence Guard
//!
//! A lightweight runtime monitor that repeatedly samples a set of named
//! signals, derives stress and volatility scores from them through a
//! replaceable scoring kernel, classifies the result into a severity
//! level, and captures a durable emergency snapshot when severity
//! crosses the critical threshold.
//!
//! # Design Principles
//! - Deterministic: identical signals and thresholds always classify the same
//! - Bounded: history is a fixed-capacity ring, cycle retries are capped
//! - Contained: a failed emergency capture never prevents the stop transition

pub mod client;
pub mod config;
pub mod contracts;
pub mod engine;
pub mod error;
pub mod kernel;
pub mod sense;

pub use config::{GuardConfig, Thresholds};
pub use contracts::{Severity, SignalSet, Snapshot, Verdict};
pub use engine::GuardLoop;
pub use error::{GuardError, Result};
