//! The `RadarStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g. `radar-store-sqlite`).
//! Higher layers (`radar-api`, `radar-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  candidate::{Candidate, NewCandidate},
  collection::{Collection, CollectionKind, CollectionMember, CollectionView},
  event::{SignalEvent, SignalType},
  insight::Insight,
  score::{CompositeScore, MomentumScore},
};

// ─── Append outcome ──────────────────────────────────────────────────────────

/// Per-event result of an append. A duplicate of an already-stored event
/// (same natural key) is a successful no-op, which makes ingestion safely
/// retryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
  Inserted,
  Duplicate,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a radar storage backend.
///
/// Events, momentum rows, composite rows, and insights are append-only:
/// no write path updates or deletes them. Collections are the only mutable
/// surface, and only through the membership operations below.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RadarStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Candidates ────────────────────────────────────────────────────────

  /// Create and persist a new candidate. Fails if the slug is taken.
  fn add_candidate(
    &self,
    input: NewCandidate,
  ) -> impl Future<Output = Result<Candidate, Self::Error>> + Send + '_;

  /// Retrieve a candidate by UUID. Returns `None` if not found.
  fn get_candidate(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Candidate>, Self::Error>> + Send + '_;

  /// Retrieve a candidate by slug. Returns `None` if not found.
  fn get_candidate_by_slug<'a>(
    &'a self,
    slug: &'a str,
  ) -> impl Future<Output = Result<Option<Candidate>, Self::Error>> + Send + 'a;

  fn list_candidates(
    &self,
  ) -> impl Future<Output = Result<Vec<Candidate>, Self::Error>> + Send + '_;

  /// Add scene tags to a candidate (the only permitted mutation of
  /// identity). Tags already present are ignored.
  fn add_scene_tags(
    &self,
    id: Uuid,
    tags: Vec<String>,
  ) -> impl Future<Output = Result<Candidate, Self::Error>> + Send + '_;

  // ── Events — append-only writes ───────────────────────────────────────

  /// Append fully-validated events, deduplicating each against the natural
  /// key `(candidate_id, signal_type, source, occurred_at)`. Returns one
  /// outcome per input, in order.
  fn append_events(
    &self,
    events: Vec<SignalEvent>,
  ) -> impl Future<Output = Result<Vec<AppendOutcome>, Self::Error>> + Send + '_;

  /// Events for a candidate with `occurred_at` in `[since, until]`,
  /// optionally restricted to one signal type, ordered by `occurred_at`.
  fn events_for_candidate(
    &self,
    id: Uuid,
    signal_type: Option<SignalType>,
    since: DateTime<Utc>,
    until: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<SignalEvent>, Self::Error>> + Send + '_;

  /// Total stored event count for a candidate.
  fn count_events(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Scores — append-only time series ──────────────────────────────────

  /// Append one computation run's momentum rows.
  fn append_momentum(
    &self,
    scores: Vec<MomentumScore>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The most recent run's momentum rows, one per signal type.
  fn latest_momentum(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Vec<MomentumScore>, Self::Error>> + Send + '_;

  /// Append one composite score row.
  fn append_composite(
    &self,
    score: CompositeScore,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The most recent composite rows, newest first.
  fn recent_composites(
    &self,
    id: Uuid,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<CompositeScore>, Self::Error>> + Send + '_;

  /// Composite history over the trailing `days`, oldest first — the shape
  /// trend charts and backtests consume.
  fn score_history(
    &self,
    id: Uuid,
    days: u32,
  ) -> impl Future<Output = Result<Vec<CompositeScore>, Self::Error>> + Send + '_;

  // ── Collections ───────────────────────────────────────────────────────

  fn create_collection(
    &self,
    kind: CollectionKind,
    name: String,
    owner: String,
  ) -> impl Future<Output = Result<Collection, Self::Error>> + Send + '_;

  /// Collection with members ordered by position. `None` if not found.
  fn get_collection(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<CollectionView>, Self::Error>> + Send + '_;

  fn list_collections<'a>(
    &'a self,
    owner: Option<&'a str>,
    kind: Option<CollectionKind>,
  ) -> impl Future<Output = Result<Vec<Collection>, Self::Error>> + Send + 'a;

  /// Add a candidate to a collection. Without an explicit position the
  /// member is appended at the end.
  fn add_member(
    &self,
    collection_id: Uuid,
    candidate_id: Uuid,
    position: Option<u32>,
    notes: Option<String>,
  ) -> impl Future<Output = Result<CollectionMember, Self::Error>> + Send + '_;

  fn remove_member(
    &self,
    collection_id: Uuid,
    candidate_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Move a member to `position`. If another member occupies that slot the
  /// two swap places; the rest of the list is untouched.
  fn move_member(
    &self,
    collection_id: Uuid,
    candidate_id: Uuid,
    position: u32,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Insights ──────────────────────────────────────────────────────────

  fn append_insight(
    &self,
    insight: Insight,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// An owner's insights, newest first, capped at `limit`.
  fn list_insights<'a>(
    &'a self,
    owner: &'a str,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<Insight>, Self::Error>> + Send + 'a;
}
