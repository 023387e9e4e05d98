//! Scenes — scene-membership activity.
//!
//! Reports per-scene audience deltas. Only growth is a signal; shrinkage is
//! not an event the radar stores (event values are non-negative), so
//! non-positive deltas are dropped here rather than rejected downstream.

use chrono::{DateTime, Utc};
use radar_core::{
  adapter::{AdapterError, SignalAdapter},
  event::{EventSubmission, SignalType},
};
use serde::Deserialize;

use crate::{get_json, http_client};

#[derive(Debug, Deserialize)]
struct SceneActivityRow {
  scene:         String,
  members_delta: f64,
  at:            DateTime<Utc>,
}

pub struct ScenesAdapter {
  client:   reqwest::Client,
  base_url: String,
}

impl ScenesAdapter {
  pub fn new(base_url: impl Into<String>) -> Result<Self, AdapterError> {
    Ok(Self {
      client:   http_client("scenes")?,
      base_url: base_url.into(),
    })
  }
}

fn translate(rows: Vec<SceneActivityRow>) -> Vec<EventSubmission> {
  rows
    .into_iter()
    .filter(|row| row.members_delta > 0.0)
    .map(|row| EventSubmission {
      signal_type: SignalType::SocialGrowth.discriminant().to_owned(),
      value:       row.members_delta,
      source:      format!("scenes:{}", row.scene),
      occurred_at: row.at,
    })
    .collect()
}

impl SignalAdapter for ScenesAdapter {
  fn name(&self) -> &'static str { "scenes" }

  async fn fetch_signals_for_candidate(
    &self,
    slug: &str,
    since: DateTime<Utc>,
  ) -> Result<Vec<EventSubmission>, AdapterError> {
    let url = format!(
      "{}/scenes/activity",
      self.base_url.trim_end_matches('/')
    );
    let rows: Vec<SceneActivityRow> = get_json(
      self.name(),
      &self.client,
      url,
      &[
        ("artist", slug.to_owned()),
        ("after", since.to_rfc3339()),
      ],
    )
    .await?;
    Ok(translate(rows))
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn shrinkage_is_dropped_before_ingestion() {
    let at = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    let rows = vec![
      SceneActivityRow {
        scene:         "uk-garage".into(),
        members_delta: 120.0,
        at,
      },
      SceneActivityRow {
        scene:         "hyperpop".into(),
        members_delta: -40.0,
        at,
      },
    ];

    let events = translate(rows);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].value, 120.0);
    assert_eq!(events[0].source, "scenes:uk-garage");
  }
}
