//! The momentum engine — exponential time decay over the event store.
//!
//! Raw sums would favour long-lived candidates with accumulated history over
//! genuinely accelerating newer ones; decay makes momentum reflect current
//! trajectory. Everything here is a pure function of its inputs.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{
  config::ScoringConfig,
  event::{SignalEvent, SignalType},
  score::MomentumScore,
};

const SECS_PER_DAY: f64 = 86_400.0;

/// Time-decayed sum for one signal type, as of `as_of`.
///
/// Only events with `occurred_at` inside `[as_of - lookback, as_of]` count —
/// the upper bound is the no-lookahead invariant, the lower bound the
/// lookback window. No events in the window yields `0.0`, not an absence:
/// zero signal is a real, comparable value.
pub fn decayed_value(
  events: &[SignalEvent],
  signal_type: SignalType,
  lambda_per_day: f64,
  as_of: DateTime<Utc>,
  lookback_days: u32,
) -> f64 {
  let window_start = as_of - Duration::days(i64::from(lookback_days));

  events
    .iter()
    .filter(|e| e.signal_type == signal_type)
    .filter(|e| e.occurred_at <= as_of && e.occurred_at >= window_start)
    .map(|e| {
      let age_days =
        (as_of - e.occurred_at).num_seconds() as f64 / SECS_PER_DAY;
      e.value * (-lambda_per_day * age_days).exp()
    })
    .sum()
}

/// One full momentum run for a candidate: a row for every signal type in
/// [`SignalType::ALL`], computed as of `as_of` from `events`.
pub fn compute_momentum(
  cfg: &ScoringConfig,
  candidate_id: Uuid,
  events: &[SignalEvent],
  as_of: DateTime<Utc>,
) -> Vec<MomentumScore> {
  SignalType::ALL
    .iter()
    .map(|&signal_type| MomentumScore {
      momentum_id: Uuid::new_v4(),
      candidate_id,
      signal_type,
      window_days: cfg.lookback_days,
      decayed_value: decayed_value(
        events,
        signal_type,
        cfg.decay(signal_type),
        as_of,
        cfg.lookback_days,
      ),
      computed_at: as_of,
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
  }

  fn event(
    signal_type: SignalType,
    value: f64,
    occurred_at: DateTime<Utc>,
  ) -> SignalEvent {
    SignalEvent {
      event_id: Uuid::new_v4(),
      candidate_id: Uuid::new_v4(),
      signal_type,
      value,
      source: "test".into(),
      occurred_at,
      ingested_at: occurred_at,
    }
  }

  #[test]
  fn no_events_yields_zero_not_absence() {
    let v = decayed_value(&[], SignalType::PlaylistAdd, 0.1, t0(), 90);
    assert_eq!(v, 0.0);
  }

  #[test]
  fn decay_is_strictly_monotonic_in_age() {
    let lambda = 0.1;
    let mut previous = f64::INFINITY;
    for age_days in [0, 1, 7, 30, 89] {
      let e = event(
        SignalType::Mention,
        10.0,
        t0() - Duration::days(age_days),
      );
      let v = decayed_value(&[e], SignalType::Mention, lambda, t0(), 90);
      assert!(v < previous, "age {age_days}: {v} not < {previous}");
      previous = v;
    }
  }

  #[test]
  fn kyara_scenario() {
    // λ_mention chosen such that one day of decay ≈ 0.9.
    let lambda = -(0.9_f64.ln());
    let as_of = t0() + Duration::days(1);
    let events = vec![
      event(SignalType::Mention, 10.0, t0()),
      event(SignalType::Mention, 10.0, t0() + Duration::days(1)),
      event(SignalType::Coverage, 50.0, t0()),
    ];

    let mention =
      decayed_value(&events, SignalType::Mention, lambda, as_of, 90);
    assert!((mention - 19.0).abs() < 1e-6, "mention momentum: {mention}");

    // Coverage as of t0 has zero age.
    let coverage =
      decayed_value(&events, SignalType::Coverage, lambda, t0(), 90);
    assert_eq!(coverage, 50.0);
  }

  #[test]
  fn no_lookahead_events_after_as_of_are_ignored() {
    let as_of = t0();
    let events = vec![
      event(SignalType::Mention, 10.0, as_of - Duration::days(1)),
      event(SignalType::Mention, 100.0, as_of + Duration::days(1)),
    ];

    let with_future =
      decayed_value(&events, SignalType::Mention, 0.1, as_of, 90);
    let without_future =
      decayed_value(&events[..1], SignalType::Mention, 0.1, as_of, 90);
    assert_eq!(with_future, without_future);
  }

  #[test]
  fn events_outside_lookback_window_are_ignored() {
    let events = vec![event(
      SignalType::StreamDelta,
      40.0,
      t0() - Duration::days(91),
    )];
    let v = decayed_value(&events, SignalType::StreamDelta, 0.01, t0(), 90);
    assert_eq!(v, 0.0);
  }

  #[test]
  fn compute_momentum_emits_a_row_per_signal_type() {
    let cfg = ScoringConfig::default();
    let candidate_id = Uuid::new_v4();
    let events = vec![event(SignalType::Mention, 5.0, t0())];

    let momenta = compute_momentum(&cfg, candidate_id, &events, t0());
    assert_eq!(momenta.len(), SignalType::ALL.len());

    // The type with no events gets an explicit zero row.
    let playlist = momenta
      .iter()
      .find(|m| m.signal_type == SignalType::PlaylistAdd)
      .unwrap();
    assert_eq!(playlist.decayed_value, 0.0);

    let mention = momenta
      .iter()
      .find(|m| m.signal_type == SignalType::Mention)
      .unwrap();
    assert_eq!(mention.decayed_value, 5.0);
  }
}
