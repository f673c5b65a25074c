//! Integration tests for Emergence Guard

use emergence_guard::client::OlpClient;
use emergence_guard::contracts::{Frame, Severity, SignalSet};
use emergence_guard::engine::{GuardLoop, LoopState, RunOutcome};
use emergence_guard::error::{GuardError, Result};
use emergence_guard::kernel::FallbackKernel;
use emergence_guard::sense::SignalSource;
use emergence_guard::{GuardConfig, Thresholds};
use tokio::sync::watch;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Replays a fixed sequence of samples, then repeats the last one
struct ScriptedSource {
    samples: Vec<SignalSet>,
    cursor: usize,
}

impl ScriptedSource {
    fn new(samples: Vec<SignalSet>) -> Self {
        Self { samples, cursor: 0 }
    }
}

impl SignalSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    fn sample(&mut self) -> Result<SignalSet> {
        let index = self.cursor.min(self.samples.len() - 1);
        self.cursor += 1;
        Ok(self.samples[index].clone())
    }
}

/// Fails every sample
struct FailingSource;

impl SignalSource for FailingSource {
    fn name(&self) -> &str {
        "failing"
    }

    fn sample(&mut self) -> Result<SignalSet> {
        Err(GuardError::SignalAcquisition("sensor offline".to_string()))
    }
}

fn quiet_signals() -> SignalSet {
    SignalSet::from([
        ("cpu_load", 0.1),
        ("memory_usage", 0.1),
        ("network_io", 0.1),
        ("error_rate", 0.05),
        ("response_variance", 0.1),
        ("token_entropy", 0.1),
        ("pattern_deviation", 0.1),
        ("recursion_depth", 0.1),
    ])
}

// Fallback stress 0.3*0.95 + 0.3*0.95 + 0.2*0.95 + 0.2*0.3 = 0.82,
// past the 0.80 critical threshold.
fn overload_signals() -> SignalSet {
    SignalSet::from([
        ("cpu_load", 0.95),
        ("memory_usage", 0.95),
        ("network_io", 0.95),
        ("error_rate", 0.3),
        ("response_variance", 0.1),
        ("token_entropy", 0.1),
        ("pattern_deviation", 0.1),
        ("recursion_depth", 0.1),
    ])
}

fn fast_config(artifact_dir: Option<std::path::PathBuf>) -> GuardConfig {
    GuardConfig {
        interval_ms: 1,
        artifact_dir,
        ..GuardConfig::default()
    }
}

#[tokio::test]
async fn test_overload_trips_critical_and_captures_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let source = ScriptedSource::new(vec![quiet_signals(), overload_signals()]);

    let mut guard = GuardLoop::new(
        fast_config(Some(dir.path().to_path_buf())),
        Box::new(source),
        Box::new(FallbackKernel),
    );

    let (_stop_tx, stop_rx) = watch::channel(false);
    let outcome = guard.run(stop_rx).await.unwrap();

    let RunOutcome::CriticalTripped { snapshot, artifact } = outcome else {
        panic!("expected a critical trip");
    };

    assert_eq!(snapshot.stress, 0.82);
    assert_eq!(snapshot.verdict.severity, Severity::Critical);
    assert_eq!(guard.state(), LoopState::Stopped);
    assert_eq!(guard.history().len(), 2);

    // Exactly one artifact, carrying the triggering scores.
    let artifact = artifact.expect("artifact should have been written");
    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);

    let body: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&artifact).unwrap()).unwrap();
    assert_eq!(body["stress"], 0.82);
    assert_eq!(body["status"], "CRITICAL - HIGH STRESS");
    assert_eq!(body["signals"]["cpu_load"], 0.95);
}

#[tokio::test]
async fn test_stop_is_terminal_no_appends_after() {
    let dir = tempfile::tempdir().unwrap();
    let source = ScriptedSource::new(vec![overload_signals()]);

    let mut guard = GuardLoop::new(
        fast_config(Some(dir.path().to_path_buf())),
        Box::new(source),
        Box::new(FallbackKernel),
    );

    let (_stop_tx, stop_rx) = watch::channel(false);
    guard.run(stop_rx).await.unwrap();

    let appended = guard.history().len();
    assert_eq!(guard.state(), LoopState::Stopped);

    // Re-running a stopped loop neither samples nor appends.
    let (_tx, rx) = watch::channel(false);
    let outcome = guard.run(rx).await.unwrap();
    assert!(matches!(outcome, RunOutcome::Cancelled));
    assert_eq!(guard.history().len(), appended);
}

#[tokio::test]
async fn test_cancellation_interrupts_sleep() {
    let source = ScriptedSource::new(vec![quiet_signals()]);
    let config = GuardConfig {
        // Long enough that only cancellation can end the sleep promptly.
        interval_ms: 60_000,
        ..GuardConfig::default()
    };

    let mut guard = GuardLoop::new(config, Box::new(source), Box::new(FallbackKernel));
    let (stop_tx, stop_rx) = watch::channel(false);

    let handle = tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        stop_tx.send(true).unwrap();
    });

    let started = std::time::Instant::now();
    let outcome = guard.run(stop_rx).await.unwrap();
    handle.await.unwrap();

    assert!(matches!(outcome, RunOutcome::Cancelled));
    assert!(started.elapsed() < std::time::Duration::from_secs(10));
    assert_eq!(guard.history().len(), 1);
}

#[tokio::test]
async fn test_consecutive_failures_abort_the_loop() {
    let config = GuardConfig {
        interval_ms: 1,
        max_consecutive_failures: 3,
        ..GuardConfig::default()
    };

    let mut guard = GuardLoop::new(config, Box::new(FailingSource), Box::new(FallbackKernel));
    let (_stop_tx, stop_rx) = watch::channel(false);

    let err = guard.run(stop_rx).await.unwrap_err();
    assert!(matches!(err, GuardError::ConsecutiveFailures { count: 3 }));
    assert!(err.is_fatal());
    assert_eq!(guard.state(), LoopState::Stopped);
    assert!(guard.history().is_empty());
}

#[tokio::test]
async fn test_missing_signal_aborts_cycle_then_recovers() {
    let degraded = SignalSet::from([("cpu_load", 0.1)]);
    let source = ScriptedSource::new(vec![degraded, overload_signals()]);
    let dir = tempfile::tempdir().unwrap();

    let mut guard = GuardLoop::new(
        fast_config(Some(dir.path().to_path_buf())),
        Box::new(source),
        Box::new(FallbackKernel),
    );

    let (_stop_tx, stop_rx) = watch::channel(false);
    let outcome = guard.run(stop_rx).await.unwrap();

    // First cycle aborted on the missing signal, second one tripped.
    assert!(matches!(outcome, RunOutcome::CriticalTripped { .. }));
    assert_eq!(guard.history().len(), 1);
}

#[tokio::test]
async fn test_custom_thresholds_keep_loop_running() {
    let config = GuardConfig {
        interval_ms: 1,
        thresholds: Thresholds {
            stress_critical: 0.95,
            volatility_critical: 0.95,
            stress_warning: 0.90,
            volatility_warning: 0.90,
        },
        ..GuardConfig::default()
    };

    // Overload signals stay below the raised thresholds.
    let source = ScriptedSource::new(vec![overload_signals()]);
    let mut guard = GuardLoop::new(config, Box::new(source), Box::new(FallbackKernel));

    let (stop_tx, stop_rx) = watch::channel(false);
    let handle = tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        stop_tx.send(true).unwrap();
    });

    let outcome = guard.run(stop_rx).await.unwrap();
    handle.await.unwrap();

    assert!(matches!(outcome, RunOutcome::Cancelled));
    assert!(guard.history().len() >= 1);
    assert!(guard
        .history()
        .recent(10)
        .iter()
        .all(|s| s.verdict.severity != Severity::Critical));
}

#[tokio::test]
async fn test_post_frame_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/frame"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .mount(&server)
        .await;

    let client = OlpClient::new(format!("{}/frame", server.uri()));
    let frame = Frame::for_claim("test claim", 0.01, None);

    let response = client.post_frame(&frame).await.unwrap();
    assert_eq!(response["ok"], true);
}

#[tokio::test]
async fn test_post_frame_server_error_is_submission_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/frame"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = OlpClient::new(format!("{}/frame", server.uri()));
    let frame = Frame::for_claim("test claim", 0.01, None);

    let err = client.post_frame(&frame).await.unwrap_err();
    assert!(matches!(err, GuardError::Submission(_)));
    // Submission failures never escalate into loop control flow.
    assert!(!err.is_fatal());
}

#[tokio::test]
async fn test_post_frame_non_json_body_is_wrapped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/frame"))
        .respond_with(ResponseTemplate::new(200).set_body_string("accepted"))
        .mount(&server)
        .await;

    let client = OlpClient::new(format!("{}/frame", server.uri()));
    let frame = Frame::for_claim("test claim", 0.01, None);

    let response = client.post_frame(&frame).await.unwrap();
    assert_eq!(response["ok"], false);
    assert_eq!(response["raw"], "accepted");
}
