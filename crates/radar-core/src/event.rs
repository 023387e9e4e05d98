//! Signal events — the fundamental unit of the radar's event store.
//!
//! An event is an immutable observation about a candidate at a point in
//! time. Events are never updated or deleted; recomputing a historical score
//! must replay exactly the events that existed when it was first computed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Signal types ────────────────────────────────────────────────────────────

/// The category of a raw signal event.
///
/// The set is closed on purpose: every scoring run emits one momentum row
/// per variant listed in [`SignalType::ALL`], so adding a variant here is a
/// scoring-model change, not a data-entry convenience.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
  /// A social or press mention. Viral and short-lived.
  Mention,
  /// Editorial coverage (reviews, features, interviews).
  Coverage,
  /// Change in streaming volume over the source's reporting window.
  StreamDelta,
  /// Follower/subscriber growth on a social platform.
  SocialGrowth,
  /// Addition to an editorial or algorithmic playlist.
  PlaylistAdd,
}

impl SignalType {
  /// Every signal type, in the fixed order used by score computation.
  /// Absence of signal is a real, comparable value: a candidate with no
  /// events of a type still gets a zero momentum row for it.
  pub const ALL: [SignalType; 5] = [
    SignalType::Mention,
    SignalType::Coverage,
    SignalType::StreamDelta,
    SignalType::SocialGrowth,
    SignalType::PlaylistAdd,
  ];

  /// The discriminant string stored in the `signal_type` column.
  /// Must match the `rename_all = "snake_case"` serde tags above.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::Mention => "mention",
      Self::Coverage => "coverage",
      Self::StreamDelta => "stream_delta",
      Self::SocialGrowth => "social_growth",
      Self::PlaylistAdd => "playlist_add",
    }
  }

  /// Parse a discriminant string back into a variant.
  pub fn from_discriminant(s: &str) -> Result<Self> {
    match s {
      "mention" => Ok(Self::Mention),
      "coverage" => Ok(Self::Coverage),
      "stream_delta" => Ok(Self::StreamDelta),
      "social_growth" => Ok(Self::SocialGrowth),
      "playlist_add" => Ok(Self::PlaylistAdd),
      other => Err(Error::UnknownSignalType(other.to_owned())),
    }
  }
}

// ─── Events ──────────────────────────────────────────────────────────────────

/// An immutable signal observation. Once written, no field is ever updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalEvent {
  pub event_id:     Uuid,
  pub candidate_id: Uuid,
  pub signal_type:  SignalType,
  /// Non-negative magnitude; unit depends on the signal type.
  pub value:        f64,
  /// Where the event came from, e.g. `"mig:press-index"`. Part of the
  /// natural dedup key alongside type and `occurred_at`.
  pub source:       String,
  /// When the signal happened in the outside world.
  pub occurred_at:  DateTime<Utc>,
  /// Server-assigned timestamp; never changes after creation.
  pub ingested_at:  DateTime<Utc>,
}

/// One record of the inbound signal feed, before validation.
///
/// `signal_type` is a plain string so that an unknown type rejects the item
/// during validation rather than failing deserialisation of the whole batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSubmission {
  pub signal_type: String,
  pub value:       f64,
  pub source:      String,
  pub occurred_at: DateTime<Utc>,
}

// ─── Ingest report ───────────────────────────────────────────────────────────

/// Why a single batch item was rejected. Indexes refer to the submitted
/// batch, so callers can see exactly which events failed and why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestItemError {
  pub index:  usize,
  pub reason: String,
}

/// The outcome of one ingestion call. Partial success is normal: rejected
/// items never abort the batch, and re-ingested duplicates are counted
/// separately so retries are observably idempotent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
  /// Newly stored events.
  pub accepted:   usize,
  /// Items that failed validation.
  pub rejected:   usize,
  /// Items identical to an already-stored event; a no-op, not an error.
  pub duplicates: usize,
  pub errors:     Vec<IngestItemError>,
}
