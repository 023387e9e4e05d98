//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings (which also sort
//! chronologically as text). List-valued fields (scene tags, contributing
//! momentum ids) are stored as compact JSON. UUIDs are stored as hyphenated
//! lowercase strings.

use chrono::{DateTime, Utc};
use radar_core::{
  candidate::Candidate,
  collection::{Collection, CollectionKind, CollectionMember},
  event::{SignalEvent, SignalType},
  insight::{Insight, InsightKind},
  score::{CompositeScore, MomentumScore},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── String lists ────────────────────────────────────────────────────────────

pub fn encode_tags(tags: &[String]) -> Result<String> {
  Ok(serde_json::to_string(tags)?)
}

pub fn decode_tags(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_uuid_list(ids: &[Uuid]) -> Result<String> {
  Ok(serde_json::to_string(
    &ids.iter().map(|id| encode_uuid(*id)).collect::<Vec<_>>(),
  )?)
}

pub fn decode_uuid_list(s: &str) -> Result<Vec<Uuid>> {
  let raw: Vec<String> = serde_json::from_str(s)?;
  raw.iter().map(|s| decode_uuid(s)).collect()
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `candidates` row.
pub struct RawCandidate {
  pub candidate_id: String,
  pub slug:         String,
  pub name:         String,
  pub scene_tags:   String,
  pub created_at:   String,
}

impl RawCandidate {
  pub fn into_candidate(self) -> Result<Candidate> {
    Ok(Candidate {
      candidate_id: decode_uuid(&self.candidate_id)?,
      slug:         self.slug,
      name:         self.name,
      scene_tags:   decode_tags(&self.scene_tags)?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `events` row.
pub struct RawEvent {
  pub event_id:     String,
  pub candidate_id: String,
  pub signal_type:  String,
  pub value:        f64,
  pub source:       String,
  pub occurred_at:  String,
  pub ingested_at:  String,
}

impl RawEvent {
  pub fn into_event(self) -> Result<SignalEvent> {
    Ok(SignalEvent {
      event_id:     decode_uuid(&self.event_id)?,
      candidate_id: decode_uuid(&self.candidate_id)?,
      signal_type:  SignalType::from_discriminant(&self.signal_type)?,
      value:        self.value,
      source:       self.source,
      occurred_at:  decode_dt(&self.occurred_at)?,
      ingested_at:  decode_dt(&self.ingested_at)?,
    })
  }
}

/// Raw strings read directly from a `momentum_scores` row.
pub struct RawMomentum {
  pub momentum_id:   String,
  pub candidate_id:  String,
  pub signal_type:   String,
  pub window_days:   u32,
  pub decayed_value: f64,
  pub computed_at:   String,
}

impl RawMomentum {
  pub fn into_momentum(self) -> Result<MomentumScore> {
    Ok(MomentumScore {
      momentum_id:   decode_uuid(&self.momentum_id)?,
      candidate_id:  decode_uuid(&self.candidate_id)?,
      signal_type:   SignalType::from_discriminant(&self.signal_type)?,
      window_days:   self.window_days,
      decayed_value: self.decayed_value,
      computed_at:   decode_dt(&self.computed_at)?,
    })
  }
}

/// Raw strings read directly from a `composite_scores` row.
pub struct RawComposite {
  pub score_id:                  String,
  pub candidate_id:              String,
  pub composite:                 f64,
  pub breakout_probability:      f64,
  pub low_confidence:            bool,
  pub computed_at:               String,
  pub contributing_momentum_ids: String,
}

impl RawComposite {
  pub fn into_composite(self) -> Result<CompositeScore> {
    Ok(CompositeScore {
      score_id: decode_uuid(&self.score_id)?,
      candidate_id: decode_uuid(&self.candidate_id)?,
      composite: self.composite,
      breakout_probability: self.breakout_probability,
      low_confidence: self.low_confidence,
      computed_at: decode_dt(&self.computed_at)?,
      contributing_momentum_ids: decode_uuid_list(
        &self.contributing_momentum_ids,
      )?,
    })
  }
}

/// Raw strings read directly from a `collections` row.
pub struct RawCollection {
  pub collection_id: String,
  pub kind:          String,
  pub name:          String,
  pub owner:         String,
  pub created_at:    String,
}

impl RawCollection {
  pub fn into_collection(self) -> Result<Collection> {
    Ok(Collection {
      collection_id: decode_uuid(&self.collection_id)?,
      kind:          CollectionKind::from_discriminant(&self.kind)?,
      name:          self.name,
      owner:         self.owner,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `collection_members` row.
pub struct RawMember {
  pub candidate_id: String,
  pub position:     u32,
  pub notes:        Option<String>,
  pub added_at:     String,
}

impl RawMember {
  pub fn into_member(self) -> Result<CollectionMember> {
    Ok(CollectionMember {
      candidate_id: decode_uuid(&self.candidate_id)?,
      position:     self.position,
      notes:        self.notes,
      added_at:     decode_dt(&self.added_at)?,
    })
  }
}

/// Raw strings read directly from an `insights` row.
pub struct RawInsight {
  pub insight_id:   String,
  pub candidate_id: String,
  pub owner:        String,
  pub kind:         String,
  pub magnitude:    f64,
  pub narrative:    String,
  pub window_start: String,
  pub window_end:   String,
  pub created_at:   String,
}

impl RawInsight {
  pub fn into_insight(self) -> Result<Insight> {
    Ok(Insight {
      insight_id:   decode_uuid(&self.insight_id)?,
      candidate_id: decode_uuid(&self.candidate_id)?,
      owner:        self.owner,
      kind:         InsightKind::from_discriminant(&self.kind)?,
      magnitude:    self.magnitude,
      narrative:    self.narrative,
      window_start: decode_dt(&self.window_start)?,
      window_end:   decode_dt(&self.window_end)?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}
