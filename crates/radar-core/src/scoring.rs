//! The scoring engine — weighted composite and breakout probability.
//!
//! Determinism matters here: given the identical contributing momentum rows,
//! recomputation must yield the identical composite. Iteration always runs
//! in [`SignalType::ALL`] order so floating-point association is stable.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  config::ScoringConfig,
  event::SignalType,
  score::{CompositeScore, MomentumScore},
};

/// Weighted combination of one run's momentum rows.
pub fn composite_value(cfg: &ScoringConfig, momenta: &[MomentumScore]) -> f64 {
  SignalType::ALL
    .iter()
    .map(|&t| {
      let decayed = momenta
        .iter()
        .find(|m| m.signal_type == t)
        .map(|m| m.decayed_value)
        .unwrap_or(0.0);
      cfg.weight(t) * decayed
    })
    .sum()
}

/// Number of signal types with any data this run.
pub fn data_coverage(momenta: &[MomentumScore]) -> usize {
  momenta.iter().filter(|m| m.decayed_value > 0.0).count()
}

/// Breakout probability from a composite-score history, oldest first.
///
/// High momentum alone is not a breakout — acceleration is. With three or
/// more points this is a sigmoid of the second difference; with two, of the
/// first difference; with fewer, a neutral 0.5. The transform is a
/// placeholder seam pending calibration against historical outcomes;
/// `steepness` is the only tunable.
pub fn estimate_breakout_probability(history: &[f64], steepness: f64) -> f64 {
  let n = history.len();
  let signal = match n {
    0 | 1 => return 0.5,
    2 => history[1] - history[0],
    _ => {
      let (c0, c1, c2) = (history[n - 3], history[n - 2], history[n - 1]);
      (c2 - c1) - (c1 - c0)
    }
  };
  sigmoid(steepness * signal)
}

fn sigmoid(x: f64) -> f64 { 1.0 / (1.0 + (-x).exp()) }

/// Assemble one run's composite score from its momentum rows and the prior
/// runs' composites (`prior` newest first, as the store returns them).
///
/// `degraded` marks that a signal source was unreachable during the run's
/// pull phase; the score is still emitted, flagged `low_confidence`.
pub fn build_composite(
  cfg: &ScoringConfig,
  candidate_id: Uuid,
  momenta: &[MomentumScore],
  prior: &[CompositeScore],
  as_of: DateTime<Utc>,
  degraded: bool,
) -> CompositeScore {
  let composite = composite_value(cfg, momenta);

  // Oldest-first history ending with the value just computed.
  let mut history: Vec<f64> =
    prior.iter().rev().map(|s| s.composite).collect();
  history.push(composite);

  let breakout_probability =
    estimate_breakout_probability(&history, cfg.breakout_steepness);

  let low_confidence =
    degraded || data_coverage(momenta) < cfg.low_confidence_threshold;

  CompositeScore {
    score_id: Uuid::new_v4(),
    candidate_id,
    composite,
    breakout_probability,
    low_confidence,
    computed_at: as_of,
    contributing_momentum_ids: momenta.iter().map(|m| m.momentum_id).collect(),
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn momentum_row(signal_type: SignalType, decayed_value: f64) -> MomentumScore {
    MomentumScore {
      momentum_id: Uuid::new_v4(),
      candidate_id: Uuid::new_v4(),
      signal_type,
      window_days: 90,
      decayed_value,
      computed_at: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
    }
  }

  #[test]
  fn composite_is_deterministic_for_identical_inputs() {
    let cfg = ScoringConfig::default();
    let momenta = vec![
      momentum_row(SignalType::Mention, 19.0),
      momentum_row(SignalType::Coverage, 50.0),
      momentum_row(SignalType::StreamDelta, 3.25),
    ];

    let a = composite_value(&cfg, &momenta);
    let b = composite_value(&cfg, &momenta);
    assert_eq!(a.to_bits(), b.to_bits());
  }

  #[test]
  fn composite_weights_coverage_over_mentions() {
    let cfg = ScoringConfig::default();
    let mentions = vec![momentum_row(SignalType::Mention, 10.0)];
    let coverage = vec![momentum_row(SignalType::Coverage, 10.0)];
    assert!(
      composite_value(&cfg, &coverage) > composite_value(&cfg, &mentions)
    );
  }

  #[test]
  fn breakout_is_neutral_without_history() {
    assert_eq!(estimate_breakout_probability(&[], 6.0), 0.5);
    assert_eq!(estimate_breakout_probability(&[3.0], 6.0), 0.5);
  }

  #[test]
  fn accelerating_history_scores_above_half() {
    // Deltas: +1, +3 — momentum is accelerating.
    let p = estimate_breakout_probability(&[1.0, 2.0, 5.0], 6.0);
    assert!(p > 0.5, "breakout: {p}");
  }

  #[test]
  fn decelerating_history_scores_below_half() {
    // Still rising, but more slowly — not a breakout.
    let p = estimate_breakout_probability(&[1.0, 4.0, 5.0], 6.0);
    assert!(p < 0.5, "breakout: {p}");
  }

  #[test]
  fn breakout_probability_is_bounded() {
    for history in [&[0.0, 1000.0][..], &[1000.0, 0.0][..]] {
      let p = estimate_breakout_probability(history, 6.0);
      assert!((0.0..=1.0).contains(&p));
    }
  }

  #[test]
  fn sparse_coverage_flags_low_confidence() {
    let cfg = ScoringConfig::default();
    let momenta = vec![momentum_row(SignalType::Mention, 4.0)];
    let score = build_composite(
      &cfg,
      Uuid::new_v4(),
      &momenta,
      &[],
      Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
      false,
    );
    assert!(score.low_confidence);
  }

  #[test]
  fn degraded_pull_flags_low_confidence_even_with_full_coverage() {
    let cfg = ScoringConfig::default();
    let momenta: Vec<_> = SignalType::ALL
      .iter()
      .map(|&t| momentum_row(t, 5.0))
      .collect();
    let score = build_composite(
      &cfg,
      Uuid::new_v4(),
      &momenta,
      &[],
      Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
      true,
    );
    assert!(score.low_confidence);
  }

  #[test]
  fn composite_references_every_contributing_momentum_row() {
    let cfg = ScoringConfig::default();
    let momenta: Vec<_> = SignalType::ALL
      .iter()
      .map(|&t| momentum_row(t, 1.0))
      .collect();
    let score = build_composite(
      &cfg,
      Uuid::new_v4(),
      &momenta,
      &[],
      Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
      false,
    );
    assert_eq!(
      score.contributing_momentum_ids.len(),
      momenta.len()
    );
    for m in &momenta {
      assert!(score.contributing_momentum_ids.contains(&m.momentum_id));
    }
  }
}
