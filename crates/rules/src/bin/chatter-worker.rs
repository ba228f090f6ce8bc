//! chatter-worker: console transport for the rule engine.
//!
//! Reads one message per line from stdin and prints the combined reply (if
//! any) to stdout. The rule definition is reconciled in the background on a
//! fixed interval, so edits to the YAML file take effect without a restart.
//!
//! Stops on EOF or Ctrl-C. With `--print-metrics` the Prometheus exposition
//! of everything recorded is written to stderr on the way out.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tracing::{info, warn};

use chatter_core::config::{load_dotenv, Config};
use chatter_core::{install_recorder, MetricsSink};
use chatter_rules::store::{DefinitionSource, FileSource};
use chatter_rules::{ReloadController, Responder, RuleStore};

// ── CLI ─────────────────────────────────────────────────────────────

/// Console auto-responder with hot-reloaded pattern rules.
#[derive(Parser, Debug)]
#[command(name = "chatter-worker", version, about)]
struct Cli {
    /// Path to the YAML rule definition. Overrides CHATTER_RULES_PATH.
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Seconds between reload passes. Overrides CHATTER_RELOAD_INTERVAL_SECS.
    #[arg(long)]
    reload_interval: Option<u64>,

    /// Chat identifier attached to every stdin message.
    #[arg(long, default_value = "stdin")]
    chat_id: String,

    /// Print the collected metrics to stderr on exit.
    #[arg(long)]
    print_metrics: bool,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    let mut config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Some(path) = cli.rules {
        config.rules.path = path;
    }
    if let Some(secs) = cli.reload_interval {
        config.rules.reload_interval_secs = secs.max(1);
    }
    config.log_summary();

    let metrics = install_recorder().context("installing metrics recorder")?;

    let source = Arc::new(FileSource::new(config.rules.path.clone()));
    let store = Arc::new(RuleStore::empty());
    let loaded = store
        .reconcile_from(source.as_ref())
        .with_context(|| format!("loading rules from {}", source.describe()))?;
    if !loaded {
        anyhow::bail!("rule definition not found at {}", source.describe());
    }
    let snapshot = store.snapshot();
    info!(
        rules = snapshot.rules().len(),
        mode = %snapshot.mode(),
        pid = std::process::id(),
        version = env!("CARGO_PKG_VERSION"),
        "starting chatter-worker"
    );
    if snapshot.token().is_none() {
        warn!("no transport token configured (secrets file absent or empty)");
    }
    drop(snapshot);

    let sink = Arc::new(MetricsSink);
    let shutdown = Arc::new(Notify::new());

    let controller = Arc::new(ReloadController::new(
        store.clone(),
        source,
        sink.clone(),
    ));
    let reload_handle = controller.spawn(config.rules.reload_interval(), shutdown.clone());

    let responder = Responder::new(store, sink);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(text)) => {
                    if let Some(reply) = responder.reply(&cli.chat_id, &text) {
                        println!("{}", reply);
                    }
                }
                Ok(None) => {
                    info!("stdin closed");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "failed to read stdin");
                    break;
                }
            },
            _ = &mut ctrl_c => {
                info!("interrupt received, shutting down gracefully");
                break;
            }
        }
    }

    shutdown.notify_one();
    if tokio::time::timeout(Duration::from_secs(10), reload_handle).await.is_err() {
        warn!("reload controller did not stop within 10s");
    }

    if cli.print_metrics {
        eprint!("{}", metrics.render());
    }
    info!("chatter-worker exited cleanly");
    Ok(())
}
