//! MIG — the music-industry graph.
//!
//! Serves mention and coverage signals keyed by artist slug. Rows with a
//! kind the radar does not track are skipped, not errored: MIG grows kinds
//! faster than we adopt them.

use chrono::{DateTime, Utc};
use radar_core::{
  adapter::{AdapterError, SignalAdapter},
  event::{EventSubmission, SignalType},
};
use serde::Deserialize;

use crate::{get_json, http_client};

#[derive(Debug, Deserialize)]
struct MigSignalRow {
  kind:        String,
  weight:      f64,
  /// Upstream reference id for the observation; stable across pulls.
  #[serde(rename = "ref")]
  reference:   String,
  observed_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct MigResponse {
  signals: Vec<MigSignalRow>,
}

pub struct MigAdapter {
  client:   reqwest::Client,
  base_url: String,
}

impl MigAdapter {
  pub fn new(base_url: impl Into<String>) -> Result<Self, AdapterError> {
    Ok(Self {
      client:   http_client("mig")?,
      base_url: base_url.into(),
    })
  }
}

fn translate(rows: Vec<MigSignalRow>) -> Vec<EventSubmission> {
  rows
    .into_iter()
    .filter_map(|row| {
      let signal_type = match row.kind.as_str() {
        "mention" => SignalType::Mention,
        "coverage" => SignalType::Coverage,
        other => {
          tracing::debug!(kind = other, "skipping untracked MIG signal kind");
          return None;
        }
      };
      Some(EventSubmission {
        signal_type: signal_type.discriminant().to_owned(),
        value:       row.weight,
        source:      format!("mig:{}", row.reference),
        occurred_at: row.observed_at,
      })
    })
    .collect()
}

impl SignalAdapter for MigAdapter {
  fn name(&self) -> &'static str { "mig" }

  async fn fetch_signals_for_candidate(
    &self,
    slug: &str,
    since: DateTime<Utc>,
  ) -> Result<Vec<EventSubmission>, AdapterError> {
    let url = format!(
      "{}/v1/artists/{slug}/signals",
      self.base_url.trim_end_matches('/')
    );
    let resp: MigResponse = get_json(
      self.name(),
      &self.client,
      url,
      &[("since", since.to_rfc3339())],
    )
    .await?;
    Ok(translate(resp.signals))
  }
}
