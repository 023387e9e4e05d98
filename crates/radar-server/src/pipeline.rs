//! Batch recomputation — fan-out across candidates, sequential within one.
//!
//! Each candidate's pipeline (pull → ingest → momentum → composite) is
//! independent of every other candidate's, so the batch fans out across a
//! worker pool. The pool is bounded by configuration, not CPU count: the
//! dominant cost is I/O to the store and the context adapters.
//!
//! Cancellation is cooperative and checked between candidates, never
//! mid-candidate — a half-computed score is never persisted.

use std::{
  collections::HashSet,
  sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
  },
};

use chrono::{Duration, Utc};
use radar_adapters::AdapterSet;
use radar_core::{
  candidate::Candidate,
  config::ScoringConfig,
  ingest::{IngestError, ingest_events},
  pipeline::run_scoring,
  store::RadarStore,
};
use tokio::{sync::Semaphore, task::JoinSet};
use uuid::Uuid;

/// Result of one batch run.
#[derive(Debug, Default)]
pub struct BatchOutcome {
  pub scored:    usize,
  pub failed:    usize,
  /// Candidates skipped because another run already had them in flight.
  pub skipped:   usize,
  pub cancelled: bool,
}

/// Candidates currently being recomputed. Shared between overlapping batch
/// runs so concurrent runs for the same candidate are deduplicated — the
/// later run is authoritative and the earlier in-flight one is left alone,
/// never errored.
#[derive(Default)]
pub struct InFlight(Mutex<HashSet<Uuid>>);

impl InFlight {
  fn try_claim(&self, id: Uuid) -> bool {
    match self.0.lock() {
      Ok(mut set) => set.insert(id),
      Err(_) => false,
    }
  }

  fn release(&self, id: Uuid) {
    if let Ok(mut set) = self.0.lock() {
      set.remove(&id);
    }
  }
}

enum CandidateResult {
  Scored,
  Failed,
}

/// Pull adapters, ingest, and score one candidate. Strictly sequential:
/// momentum reads what ingestion wrote, scoring reads what momentum wrote.
async fn score_one<S>(
  store: &S,
  cfg: &ScoringConfig,
  adapters: &AdapterSet,
  candidate: &Candidate,
) -> Result<(), S::Error>
where
  S: RadarStore,
{
  let now = Utc::now();

  // Pull fresh signals since the last run (or one lookback window back).
  let since = store
    .recent_composites(candidate.candidate_id, 1)
    .await?
    .first()
    .map(|s| s.computed_at)
    .unwrap_or_else(|| now - Duration::days(i64::from(cfg.lookback_days)));

  let pull = adapters.pull_for_candidate(&candidate.slug, since).await;
  let degraded = pull.degraded();

  if !pull.events.is_empty() {
    match ingest_events(store, cfg, &candidate.slug, pull.events, now).await {
      Ok(report) => tracing::debug!(
        slug = %candidate.slug,
        accepted = report.accepted,
        duplicates = report.duplicates,
        rejected = report.rejected,
        "ingested adapter pull"
      ),
      // The candidate row is already in hand, so this only fires if it was
      // deleted underneath us; scoring would fail the same way.
      Err(IngestError::UnknownCandidate(slug)) => {
        tracing::warn!(slug, "candidate vanished mid-run");
      }
      Err(IngestError::Store(e)) => return Err(e),
    }
  }

  run_scoring(store, cfg, candidate, now, degraded).await?;
  Ok(())
}

/// Recompute every candidate's score, fanning out up to `concurrency`
/// candidates at a time. `cancel` is checked before each candidate is
/// dispatched; in-flight candidates always finish.
pub async fn recompute_all<S>(
  store: Arc<S>,
  cfg: Arc<ScoringConfig>,
  adapters: Arc<AdapterSet>,
  in_flight: Arc<InFlight>,
  concurrency: usize,
  cancel: Arc<AtomicBool>,
) -> Result<BatchOutcome, S::Error>
where
  S: RadarStore + 'static,
{
  let candidates = store.list_candidates().await?;
  tracing::info!(count = candidates.len(), concurrency, "starting batch recompute");

  let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
  let mut tasks: JoinSet<CandidateResult> = JoinSet::new();
  let mut outcome = BatchOutcome::default();

  for candidate in candidates {
    if cancel.load(Ordering::Relaxed) {
      outcome.cancelled = true;
      break;
    }

    let permit = match Arc::clone(&semaphore).acquire_owned().await {
      Ok(permit) => permit,
      Err(_) => break,
    };

    if !in_flight.try_claim(candidate.candidate_id) {
      outcome.skipped += 1;
      continue;
    }

    let store = Arc::clone(&store);
    let cfg = Arc::clone(&cfg);
    let adapters = Arc::clone(&adapters);
    let in_flight = Arc::clone(&in_flight);

    tasks.spawn(async move {
      let result = score_one(&*store, &cfg, &adapters, &candidate).await;
      in_flight.release(candidate.candidate_id);
      drop(permit);
      match result {
        Ok(()) => CandidateResult::Scored,
        Err(e) => {
          tracing::error!(slug = %candidate.slug, error = %e, "scoring failed");
          CandidateResult::Failed
        }
      }
    });
  }

  while let Some(joined) = tasks.join_next().await {
    match joined {
      Ok(CandidateResult::Scored) => outcome.scored += 1,
      Ok(CandidateResult::Failed) | Err(_) => outcome.failed += 1,
    }
  }

  tracing::info!(
    scored = outcome.scored,
    failed = outcome.failed,
    skipped = outcome.skipped,
    cancelled = outcome.cancelled,
    "batch recompute finished"
  );
  Ok(outcome)
}

/// Pull every adapter for every candidate and ingest what they return,
/// without scoring. Useful on a polling cadence decided by the host.
pub async fn poll_all<S>(
  store: Arc<S>,
  cfg: Arc<ScoringConfig>,
  adapters: Arc<AdapterSet>,
  cancel: Arc<AtomicBool>,
) -> Result<usize, S::Error>
where
  S: RadarStore,
{
  let candidates = store.list_candidates().await?;
  let mut total_accepted = 0;

  for candidate in candidates {
    if cancel.load(Ordering::Relaxed) {
      break;
    }
    let now = Utc::now();
    let since = now - Duration::days(i64::from(cfg.lookback_days));
    let pull = adapters.pull_for_candidate(&candidate.slug, since).await;
    if pull.events.is_empty() {
      continue;
    }
    match ingest_events(&*store, &cfg, &candidate.slug, pull.events, now).await
    {
      Ok(report) => total_accepted += report.accepted,
      Err(IngestError::UnknownCandidate(slug)) => {
        tracing::warn!(slug, "candidate vanished mid-poll");
      }
      Err(IngestError::Store(e)) => return Err(e),
    }
  }

  Ok(total_accepted)
}
