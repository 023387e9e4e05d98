//! Derived score records — never hand-edited, always recomputed.
//!
//! Both tables are time series: each computation run appends rows rather
//! than overwriting, preserving score history for trend charts and
//! backtesting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::SignalType;

/// Exponentially time-decayed momentum for one signal type, from one
/// computation run. Derived entirely from events with
/// `occurred_at <= computed_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumScore {
  pub momentum_id:   Uuid,
  pub candidate_id:  Uuid,
  pub signal_type:   SignalType,
  /// Lookback window the decayed sum was taken over, in days.
  pub window_days:   u32,
  pub decayed_value: f64,
  pub computed_at:   DateTime<Utc>,
}

/// One composite ranking value per computation run, combining all momentum
/// signals. A pure function of the rows named in
/// `contributing_momentum_ids`; recomputing from the same inputs yields the
/// same value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeScore {
  pub score_id:                  Uuid,
  pub candidate_id:              Uuid,
  pub composite:                 f64,
  /// Estimated likelihood the trajectory is accelerating, in `[0, 1]`.
  pub breakout_probability:      f64,
  /// Set when too few signal types had data, or a signal source was down
  /// during the run. A labeled estimate, not a suppressed one.
  pub low_confidence:            bool,
  pub computed_at:               DateTime<Utc>,
  pub contributing_momentum_ids: Vec<Uuid>,
}
