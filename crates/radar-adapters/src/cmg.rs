//! CMG — creative-fingerprint drift.
//!
//! Exposes sampled stream-velocity windows derived from the fingerprint
//! model. Velocity can go negative when a catalog cools; those windows are
//! not signal events and are dropped here.

use chrono::{DateTime, Utc};
use radar_core::{
  adapter::{AdapterError, SignalAdapter},
  event::{EventSubmission, SignalType},
};
use serde::Deserialize;

use crate::{get_json, http_client};

#[derive(Debug, Deserialize)]
struct DriftWindow {
  stream_velocity: f64,
  sampled_at:      DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct DriftResponse {
  windows: Vec<DriftWindow>,
}

pub struct CmgAdapter {
  client:   reqwest::Client,
  base_url: String,
}

impl CmgAdapter {
  pub fn new(base_url: impl Into<String>) -> Result<Self, AdapterError> {
    Ok(Self {
      client:   http_client("cmg")?,
      base_url: base_url.into(),
    })
  }
}

fn translate(windows: Vec<DriftWindow>) -> Vec<EventSubmission> {
  windows
    .into_iter()
    .filter(|w| w.stream_velocity > 0.0)
    .map(|w| EventSubmission {
      signal_type: SignalType::StreamDelta.discriminant().to_owned(),
      value:       w.stream_velocity,
      source:      "cmg:fingerprint".to_owned(),
      occurred_at: w.sampled_at,
    })
    .collect()
}

impl SignalAdapter for CmgAdapter {
  fn name(&self) -> &'static str { "cmg" }

  async fn fetch_signals_for_candidate(
    &self,
    slug: &str,
    since: DateTime<Utc>,
  ) -> Result<Vec<EventSubmission>, AdapterError> {
    let url = format!(
      "{}/fingerprint/{slug}/drift",
      self.base_url.trim_end_matches('/')
    );
    let resp: DriftResponse = get_json(
      self.name(),
      &self.client,
      url,
      &[("since", since.to_rfc3339())],
    )
    .await?;
    Ok(translate(resp.windows))
  }
}
