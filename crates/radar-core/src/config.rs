//! The single consolidated scoring configuration.
//!
//! Every knob the engines read lives here and is passed in explicitly at
//! construction — no ambient environment state at arbitrary call depth.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::event::SignalType;

/// Weights, decay constants, and thresholds for the whole pipeline.
///
/// Decay constants are per-day λ values: a signal's contribution is
/// `value * exp(-λ * age_days)`. Mentions decay in days; streaming and
/// playlist signals persist for months.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
  /// Per-type weight applied to decayed momentum when combining into the
  /// composite score.
  pub weights:                  BTreeMap<SignalType, f64>,
  /// Per-type per-day exponential decay constants.
  pub decay_constants:          BTreeMap<SignalType, f64>,
  /// Momentum lookback window, in days.
  pub lookback_days:            u32,
  /// Tolerated clock skew for `occurred_at` values in the future.
  pub clock_skew_secs:          i64,
  /// Minimum number of signal types with data before a composite score is
  /// considered full-confidence.
  pub low_confidence_threshold: usize,
  /// Steepness of the sigmoid in the breakout-probability transform.
  pub breakout_steepness:       f64,
  /// Insights with relative magnitude below this are suppressed.
  pub min_insight_magnitude:    f64,
  /// Collaboration pairs below this compatibility are not suggested.
  pub min_collab_compatibility: f64,
}

impl ScoringConfig {
  /// Weight for a signal type; types absent from the map count for nothing.
  pub fn weight(&self, signal_type: SignalType) -> f64 {
    self.weights.get(&signal_type).copied().unwrap_or(0.0)
  }

  /// Decay constant for a signal type, falling back to the default table.
  pub fn decay(&self, signal_type: SignalType) -> f64 {
    self
      .decay_constants
      .get(&signal_type)
      .copied()
      .unwrap_or_else(|| default_decay(signal_type))
  }
}

impl Default for ScoringConfig {
  fn default() -> Self {
    let weights = SignalType::ALL
      .iter()
      .map(|&t| (t, default_weight(t)))
      .collect();
    let decay_constants = SignalType::ALL
      .iter()
      .map(|&t| (t, default_decay(t)))
      .collect();

    Self {
      weights,
      decay_constants,
      lookback_days: 90,
      clock_skew_secs: 300,
      low_confidence_threshold: 2,
      breakout_steepness: 6.0,
      min_insight_magnitude: 0.15,
      min_collab_compatibility: 0.35,
    }
  }
}

/// Default composite weights. Coverage counts for more than raw mention
/// volume; streaming growth sits between.
fn default_weight(signal_type: SignalType) -> f64 {
  match signal_type {
    SignalType::Mention => 1.0,
    SignalType::Coverage => 2.0,
    SignalType::StreamDelta => 1.5,
    SignalType::SocialGrowth => 1.0,
    SignalType::PlaylistAdd => 1.25,
  }
}

/// Default per-day decay constants. A mention loses ~10% of its weight per
/// day; a stream delta has a half-life of about two months.
fn default_decay(signal_type: SignalType) -> f64 {
  match signal_type {
    SignalType::Mention => 0.105_360_5, // -ln(0.9): one-day decay to 0.9
    SignalType::Coverage => 0.046,
    SignalType::StreamDelta => 0.0116,
    SignalType::SocialGrowth => 0.08,
    SignalType::PlaylistAdd => 0.023,
  }
}
