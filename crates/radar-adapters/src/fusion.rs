//! Fusion — campaign fusion context.
//!
//! One pull returns both playlist placements and press items for the
//! campaign window; they translate into two different signal types.

use chrono::{DateTime, Utc};
use radar_core::{
  adapter::{AdapterError, SignalAdapter},
  event::{EventSubmission, SignalType},
};
use serde::Deserialize;

use crate::{get_json, http_client};

#[derive(Debug, Deserialize)]
struct PlacementRow {
  playlist: String,
  adds:     f64,
  at:       DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct PressRow {
  outlet: String,
  reach:  f64,
  at:     DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct FusionContext {
  #[serde(default)]
  placements: Vec<PlacementRow>,
  #[serde(default)]
  press:      Vec<PressRow>,
}

pub struct FusionAdapter {
  client:   reqwest::Client,
  base_url: String,
}

impl FusionAdapter {
  pub fn new(base_url: impl Into<String>) -> Result<Self, AdapterError> {
    Ok(Self {
      client:   http_client("fusion")?,
      base_url: base_url.into(),
    })
  }
}

fn translate(context: FusionContext) -> Vec<EventSubmission> {
  let placements = context.placements.into_iter().map(|p| EventSubmission {
    signal_type: SignalType::PlaylistAdd.discriminant().to_owned(),
    value:       p.adds,
    source:      format!("fusion:{}", p.playlist),
    occurred_at: p.at,
  });
  let press = context.press.into_iter().map(|p| EventSubmission {
    signal_type: SignalType::Coverage.discriminant().to_owned(),
    value:       p.reach,
    source:      format!("fusion:{}", p.outlet),
    occurred_at: p.at,
  });
  placements.chain(press).collect()
}

impl SignalAdapter for FusionAdapter {
  fn name(&self) -> &'static str { "fusion" }

  async fn fetch_signals_for_candidate(
    &self,
    slug: &str,
    since: DateTime<Utc>,
  ) -> Result<Vec<EventSubmission>, AdapterError> {
    let url = format!(
      "{}/api/fusion/context/{slug}",
      self.base_url.trim_end_matches('/')
    );
    let context: FusionContext = get_json(
      self.name(),
      &self.client,
      url,
      &[("since", since.to_rfc3339())],
    )
    .await?;
    Ok(translate(context))
  }
}
