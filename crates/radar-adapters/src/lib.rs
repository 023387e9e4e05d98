//! Context adapters — thin HTTP pullers over the four external
//! intelligence subsystems.
//!
//! Each adapter translates its upstream's JSON into the common
//! [`EventSubmission`] schema; nothing downstream knows or cares which
//! source a signal came from beyond the `source` string. The set is closed
//! and known at build time, so dispatch is a plain enum, not a registry.
//!
//! Sources are third-party and unreliable by nature. A failed pull is
//! logged and skipped; [`AdapterSet::pull_for_candidate`] reports which
//! sources failed so scoring can flag the run `low_confidence`.

pub mod cmg;
pub mod fusion;
pub mod mig;
pub mod scenes;

use std::time::Duration;

use chrono::{DateTime, Utc};
use radar_core::adapter::{AdapterError, PullOutcome, SignalAdapter};
use radar_core::event::EventSubmission;

pub use cmg::CmgAdapter;
pub use fusion::FusionAdapter;
pub use mig::MigAdapter;
pub use scenes::ScenesAdapter;

/// Shared HTTP client construction; every adapter uses the same timeout.
pub(crate) fn http_client(
  adapter: &'static str,
) -> Result<reqwest::Client, AdapterError> {
  reqwest::Client::builder()
    .timeout(Duration::from_secs(30))
    .build()
    .map_err(|e| AdapterError {
      adapter,
      message: format!("failed to build HTTP client: {e}"),
    })
}

pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(
  adapter: &'static str,
  client: &reqwest::Client,
  url: String,
  query: &[(&str, String)],
) -> Result<T, AdapterError> {
  let resp = client
    .get(&url)
    .query(query)
    .send()
    .await
    .map_err(|e| AdapterError {
      adapter,
      message: format!("GET {url} failed: {e}"),
    })?;

  if !resp.status().is_success() {
    return Err(AdapterError {
      adapter,
      message: format!("GET {url} → {}", resp.status()),
    });
  }

  resp.json().await.map_err(|e| AdapterError {
    adapter,
    message: format!("deserialising {url}: {e}"),
  })
}

// ─── Closed adapter set ──────────────────────────────────────────────────────

/// One of the four known context adapters.
pub enum ContextAdapter {
  Mig(MigAdapter),
  Scenes(ScenesAdapter),
  Fusion(FusionAdapter),
  Cmg(CmgAdapter),
}

impl SignalAdapter for ContextAdapter {
  fn name(&self) -> &'static str {
    match self {
      Self::Mig(a) => a.name(),
      Self::Scenes(a) => a.name(),
      Self::Fusion(a) => a.name(),
      Self::Cmg(a) => a.name(),
    }
  }

  async fn fetch_signals_for_candidate(
    &self,
    slug: &str,
    since: DateTime<Utc>,
  ) -> Result<Vec<EventSubmission>, AdapterError> {
    match self {
      Self::Mig(a) => a.fetch_signals_for_candidate(slug, since).await,
      Self::Scenes(a) => a.fetch_signals_for_candidate(slug, since).await,
      Self::Fusion(a) => a.fetch_signals_for_candidate(slug, since).await,
      Self::Cmg(a) => a.fetch_signals_for_candidate(slug, since).await,
    }
  }
}

/// The configured adapters, pulled together for one candidate at a time.
#[derive(Default)]
pub struct AdapterSet {
  adapters: Vec<ContextAdapter>,
}

impl AdapterSet {
  pub fn new(adapters: Vec<ContextAdapter>) -> Self { Self { adapters } }

  pub fn is_empty(&self) -> bool { self.adapters.is_empty() }

  pub fn len(&self) -> usize { self.adapters.len() }

  /// Pull every adapter for `slug`, tolerating per-source failure.
  ///
  /// Sources are polled in turn; one being down never aborts the pull.
  pub async fn pull_for_candidate(
    &self,
    slug: &str,
    since: DateTime<Utc>,
  ) -> PullOutcome {
    let mut outcome = PullOutcome::default();
    for adapter in &self.adapters {
      match adapter.fetch_signals_for_candidate(slug, since).await {
        Ok(events) => outcome.events.extend(events),
        Err(e) => {
          tracing::warn!(
            adapter = e.adapter,
            error = %e,
            "signal source unavailable; continuing without it"
          );
          outcome.failed_sources.push(e.adapter);
        }
      }
    }
    outcome
  }
}
