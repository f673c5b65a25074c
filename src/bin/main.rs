//! Emergence Guard entry point
//!
//! Runtime stress/volatility monitoring with emergency capture and
//! best-effort frame/receipt wiring to an OpenLine collector.

use clap::{Parser, Subcommand};
use emergence_guard::client::{write_receipt_file, OlpClient, DEFAULT_RECEIPT_PATH};
use emergence_guard::contracts::{round_score, Frame, Receipt, Snapshot};
use emergence_guard::engine::{classify, GuardLoop, RunOutcome};
use emergence_guard::error::GuardError;
use emergence_guard::kernel;
use emergence_guard::sense::{SignalSource, SimulatedSource};
use emergence_guard::GuardConfig;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "emergence-guard")]
#[command(about = "Emergence Guard - runtime stress/volatility monitor")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the monitoring loop
    Run {
        /// Path to a guard config file (JSON/YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Inter-cycle sleep in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Explicit kernel plugin path
        #[arg(long, env = "EMERGENCE_KERNEL")]
        kernel: Option<PathBuf>,

        /// Directory for emergency artifacts
        #[arg(long)]
        artifact_dir: Option<PathBuf>,

        /// Seed for the simulated signal source (reproducible runs)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run a single sense/score/classify cycle and print the snapshot
    Check {
        /// Path to a guard config file (JSON/YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Explicit kernel plugin path
        #[arg(long, env = "EMERGENCE_KERNEL")]
        kernel: Option<PathBuf>,

        /// Seed for the simulated signal source
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Post a frame to the collector and write the companion receipt
    Wire {
        /// Claim to report
        #[arg(long, default_value = "SPY likely up tomorrow")]
        claim: String,

        /// Observed scale drift
        #[arg(long, default_value_t = 0.028)]
        delta_scale: f64,

        /// Receipt output path
        #[arg(long, default_value = DEFAULT_RECEIPT_PATH)]
        receipt: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            interval_ms,
            kernel: kernel_path,
            artifact_dir,
            seed,
        } => {
            let mut config = load_config(config)?;
            if let Some(ms) = interval_ms {
                config.interval_ms = ms;
            }
            if let Some(path) = kernel_path {
                config.kernel_path = Some(path);
            }
            if let Some(dir) = artifact_dir {
                config.artifact_dir = Some(dir);
            }

            // Resolved exactly once; a broken plugin aborts startup here.
            let kernel = kernel::resolve(config.kernel_path.as_deref())?;
            let source = simulated_source(seed);

            let (stop_tx, stop_rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("interrupt received");
                    let _ = stop_tx.send(true);
                }
            });

            let mut guard = GuardLoop::new(config, source, kernel);
            match guard.run(stop_rx).await {
                Ok(RunOutcome::CriticalTripped { snapshot, artifact }) => {
                    let artifact_label = artifact
                        .as_deref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "<not captured>".to_string());
                    tracing::info!(
                        status = %snapshot.verdict,
                        artifact = %artifact_label,
                        "guard stopped on critical severity"
                    );
                }
                Ok(RunOutcome::Cancelled) => {
                    tracing::info!("guard stopped on request");
                }
                Err(err) => return fail(err),
            }
        }

        Commands::Check {
            config,
            kernel: kernel_path,
            seed,
        } => {
            let mut config = load_config(config)?;
            if let Some(path) = kernel_path {
                config.kernel_path = Some(path);
            }

            let kernel = kernel::resolve(config.kernel_path.as_deref())?;
            let mut source = simulated_source(seed);

            let signals = source.sample()?;
            let stress = round_score(kernel.compute_stress(&signals)?);
            let volatility = round_score(kernel.compute_volatility(&signals)?);
            let verdict = classify(stress, volatility, &config.thresholds);
            let snapshot = Snapshot::new(stress, volatility, verdict, signals);

            println!("{}", serde_json::to_string_pretty(&snapshot)?);

            if snapshot.verdict.is_critical() {
                std::process::exit(1);
            }
        }

        Commands::Wire {
            claim,
            delta_scale,
            receipt,
        } => {
            let frame = Frame::for_claim(&claim, delta_scale, None);
            let client = OlpClient::from_env();

            let posted = match client.post_frame(&frame).await {
                Ok(response) => {
                    tracing::info!(response = %response, "frame posted");
                    response.get("ok").and_then(|v| v.as_bool()).unwrap_or(false)
                }
                Err(err) => {
                    // Best effort: the receipt is still written.
                    tracing::warn!(error = %err, "frame post skipped / failed");
                    false
                }
            };

            let so = if delta_scale <= 0.03 {
                "Within 3% tolerance - recheck at close"
            } else {
                "Above 3% - needs explanation"
            };
            let doc = Receipt::new(
                &claim,
                vec![
                    "Reflex loop coherence stayed within band".to_string(),
                    "30d minute context".to_string(),
                ],
                vec![format!("Scale drift delta_scale = {:.3} (min-hour)", delta_scale)],
                so,
                delta_scale,
            );

            let path = write_receipt_file(&doc, &receipt)?;
            println!(
                "{}",
                serde_json::json!({ "receipt": path.display().to_string(), "posted": posted })
            );
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<GuardConfig> {
    match path {
        Some(path) => Ok(GuardConfig::from_file(path)?),
        None => Ok(GuardConfig::default()),
    }
}

fn simulated_source(seed: Option<u64>) -> Box<dyn SignalSource> {
    match seed {
        Some(seed) => Box::new(SimulatedSource::seeded(seed)),
        None => Box::new(SimulatedSource::new()),
    }
}

fn fail(err: GuardError) -> anyhow::Result<()> {
    tracing::error!(error = %err, "guard failed");
    std::process::exit(1);
}
