//! The context-adapter contract.
//!
//! Each external intelligence subsystem (MIG, Scenes, Fusion, CMG) is
//! wrapped by one adapter that pulls signals and translates them into the
//! event store's common schema. The set is small and known at build time,
//! so this is a fixed interface over a closed set of implementations — not
//! a runtime plugin registry.

use std::future::Future;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::event::EventSubmission;

/// A failed pull from one adapter. Adapters are third-party and unreliable
/// by nature; callers log this and continue with the sources that answered.
#[derive(Debug, Error)]
#[error("adapter {adapter}: {message}")]
pub struct AdapterError {
  pub adapter: &'static str,
  pub message: String,
}

/// One external signal source.
///
/// All methods return `Send` futures so adapters can be polled from
/// multi-threaded async runtimes.
pub trait SignalAdapter: Send + Sync {
  /// Short stable name, used as the event `source` prefix and in logs.
  fn name(&self) -> &'static str;

  /// Pull all signals for `slug` observed after `since`, translated into
  /// the common event schema.
  fn fetch_signals_for_candidate(
    &self,
    slug: &str,
    since: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<EventSubmission>, AdapterError>> + Send;
}

/// The result of pulling every configured adapter for one candidate.
/// Partial failure is the expected steady state, not an exception: scoring
/// proceeds on `events` and flags the run when `failed_sources` is
/// non-empty.
#[derive(Debug, Default)]
pub struct PullOutcome {
  pub events:         Vec<EventSubmission>,
  pub failed_sources: Vec<&'static str>,
}

impl PullOutcome {
  pub fn degraded(&self) -> bool { !self.failed_sources.is_empty() }
}
