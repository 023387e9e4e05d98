//! radar-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the JSON API. Two helper modes run a
//! one-shot job and exit: `--recompute-all` (batch score recomputation) and
//! `--poll-adapters` (pull all context adapters and ingest).

use std::{
  path::{Path, PathBuf},
  sync::{Arc, atomic::AtomicBool, atomic::Ordering},
};

use anyhow::Context as _;
use clap::Parser;
use radar_server::{
  ServerConfig, build_adapter_set,
  pipeline::{InFlight, poll_all, recompute_all},
};
use radar_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "A&R radar talent-scoring server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Recompute scores for every candidate, then exit.
  #[arg(long)]
  recompute_all: bool,

  /// Pull all context adapters once, ingest what they return, then exit.
  #[arg(long)]
  poll_adapters: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("RADAR"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let store = Arc::new(store);

  let scoring = Arc::new(server_cfg.scoring.clone());
  let adapters = Arc::new(
    build_adapter_set(&server_cfg.adapters)
      .context("failed to build adapter set")?,
  );

  // Cooperative cancellation for the one-shot modes: ctrl-c stops the batch
  // between candidates, never mid-candidate.
  let cancel = Arc::new(AtomicBool::new(false));
  {
    let cancel = Arc::clone(&cancel);
    tokio::spawn(async move {
      if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("cancellation requested");
        cancel.store(true, Ordering::Relaxed);
      }
    });
  }

  // Helper mode: batch recompute and exit.
  if cli.recompute_all {
    let outcome = recompute_all(
      store,
      scoring,
      adapters,
      Arc::new(InFlight::default()),
      server_cfg.recompute_concurrency,
      cancel,
    )
    .await
    .context("batch recompute failed")?;
    println!(
      "scored {} candidates ({} failed, {} skipped{})",
      outcome.scored,
      outcome.failed,
      outcome.skipped,
      if outcome.cancelled { ", cancelled" } else { "" },
    );
    return Ok(());
  }

  // Helper mode: adapter poll and exit.
  if cli.poll_adapters {
    let accepted = poll_all(store, scoring, adapters, cancel)
      .await
      .context("adapter poll failed")?;
    println!("ingested {accepted} new events");
    return Ok(());
  }

  // Serve.
  let app = radar_server::router(store, scoring);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
