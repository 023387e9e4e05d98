//! The insight engine — human-readable narratives from score deltas.
//!
//! Insights are derived from pairs of composite snapshots and regenerated on
//! demand; nothing here schedules itself. Small wiggles are suppressed —
//! not every score movement is worth surfacing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{candidate::Candidate, config::ScoringConfig, score::CompositeScore};

/// The direction of a score movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
  Surge,
  Decline,
  Steady,
}

impl InsightKind {
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::Surge => "surge",
      Self::Decline => "decline",
      Self::Steady => "steady",
    }
  }

  pub fn from_discriminant(s: &str) -> crate::Result<Self> {
    match s {
      "surge" => Ok(Self::Surge),
      "decline" => Ok(Self::Decline),
      "steady" => Ok(Self::Steady),
      other => Err(crate::Error::UnknownInsightKind(other.to_owned())),
    }
  }
}

/// A structured, persisted insight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
  pub insight_id:   Uuid,
  pub candidate_id: Uuid,
  pub owner:        String,
  pub kind:         InsightKind,
  /// Signed relative change of the composite between the two snapshots.
  pub magnitude:    f64,
  pub narrative:    String,
  pub window_start: DateTime<Utc>,
  pub window_end:   DateTime<Utc>,
  pub created_at:   DateTime<Utc>,
}

/// Relative change between two composite values.
///
/// A move off an exactly-zero base is reported as a full-scale ±1.0 so the
/// result stays defined.
fn relative_change(earlier: f64, later: f64) -> f64 {
  let delta = later - earlier;
  if earlier.abs() < f64::EPSILON {
    if delta.abs() < f64::EPSILON { 0.0 } else { delta.signum() }
  } else {
    delta / earlier.abs()
  }
}

fn narrative(candidate: &Candidate, kind: InsightKind, magnitude: f64) -> String {
  let pct = (magnitude.abs() * 100.0).round() as i64;
  match kind {
    InsightKind::Surge => format!(
      "{} jumped {pct}% in momentum since the last snapshot",
      candidate.name
    ),
    InsightKind::Decline => format!(
      "{} dropped {pct}% in momentum since the last snapshot",
      candidate.name
    ),
    InsightKind::Steady => {
      format!("{} is holding steady", candidate.name)
    }
  }
}

/// Derive an insight from two snapshots of the same candidate, or `None`
/// when the movement is below the suppression threshold.
///
/// `earlier` and `later` must belong to `candidate`; callers pass them in
/// chronological order.
pub fn derive_insight(
  cfg: &ScoringConfig,
  candidate: &Candidate,
  owner: &str,
  earlier: &CompositeScore,
  later: &CompositeScore,
  now: DateTime<Utc>,
) -> Option<Insight> {
  let magnitude = relative_change(earlier.composite, later.composite);
  if magnitude.abs() < cfg.min_insight_magnitude {
    return None;
  }

  let kind = if magnitude > 0.0 {
    InsightKind::Surge
  } else {
    InsightKind::Decline
  };

  Some(Insight {
    insight_id: Uuid::new_v4(),
    candidate_id: candidate.candidate_id,
    owner: owner.to_owned(),
    kind,
    magnitude,
    narrative: narrative(candidate, kind, magnitude),
    window_start: earlier.computed_at,
    window_end: later.computed_at,
    created_at: now,
  })
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn candidate() -> Candidate {
    Candidate {
      candidate_id: Uuid::new_v4(),
      slug:         "kyara".into(),
      name:         "Kyara".into(),
      scene_tags:   vec!["electronic".into()],
      created_at:   Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
    }
  }

  fn snapshot(candidate_id: Uuid, composite: f64, day: u32) -> CompositeScore {
    CompositeScore {
      score_id: Uuid::new_v4(),
      candidate_id,
      composite,
      breakout_probability: 0.5,
      low_confidence: false,
      computed_at: Utc.with_ymd_and_hms(2025, 6, day, 0, 0, 0).unwrap(),
      contributing_momentum_ids: Vec::new(),
    }
  }

  #[test]
  fn forty_percent_jump_surfaces_as_surge() {
    let cfg = ScoringConfig::default();
    let c = candidate();
    let earlier = snapshot(c.candidate_id, 10.0, 1);
    let later = snapshot(c.candidate_id, 14.0, 8);

    let insight =
      derive_insight(&cfg, &c, "user-1", &earlier, &later, later.computed_at)
        .expect("above threshold");

    assert_eq!(insight.kind, InsightKind::Surge);
    assert!((insight.magnitude - 0.4).abs() < 1e-9);
    assert!(insight.narrative.contains("Kyara"));
    assert!(insight.narrative.contains("40%"));
  }

  #[test]
  fn small_wiggles_are_suppressed() {
    let cfg = ScoringConfig::default();
    let c = candidate();
    let earlier = snapshot(c.candidate_id, 10.0, 1);
    let later = snapshot(c.candidate_id, 10.5, 8);

    assert!(
      derive_insight(&cfg, &c, "user-1", &earlier, &later, later.computed_at)
        .is_none()
    );
  }

  #[test]
  fn drop_surfaces_as_decline_with_negative_magnitude() {
    let cfg = ScoringConfig::default();
    let c = candidate();
    let earlier = snapshot(c.candidate_id, 10.0, 1);
    let later = snapshot(c.candidate_id, 6.0, 8);

    let insight =
      derive_insight(&cfg, &c, "user-1", &earlier, &later, later.computed_at)
        .expect("above threshold");
    assert_eq!(insight.kind, InsightKind::Decline);
    assert!(insight.magnitude < 0.0);
  }

  #[test]
  fn move_off_zero_base_stays_defined() {
    let cfg = ScoringConfig::default();
    let c = candidate();
    let earlier = snapshot(c.candidate_id, 0.0, 1);
    let later = snapshot(c.candidate_id, 3.0, 8);

    let insight =
      derive_insight(&cfg, &c, "user-1", &earlier, &later, later.computed_at)
        .expect("full-scale move");
    assert_eq!(insight.magnitude, 1.0);
    assert!(!insight.magnitude.is_nan());
  }
}
