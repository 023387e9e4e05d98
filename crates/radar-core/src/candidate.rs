//! Candidate — the artist/entity tracked by the radar.
//!
//! A candidate holds only identity metadata. Everything observable about it
//! lives in the event store; everything derived lives in the score tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tracked artist. Identity is immutable once created; the only permitted
/// mutation is adding scene tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
  pub candidate_id: Uuid,
  /// Stable, unique, URL-safe key (e.g. `"kyara"`).
  pub slug:         String,
  pub name:         String,
  /// Scene/genre tags, e.g. `["electronic", "uk-garage"]`.
  pub scene_tags:   Vec<String>,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::store::RadarStore::add_candidate`].
/// `candidate_id` and `created_at` are always set by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCandidate {
  pub slug:       String,
  pub name:       String,
  #[serde(default)]
  pub scene_tags: Vec<String>,
}
