//! Handlers for `/insights` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/insights` | `?owner=` required; optional `?limit=` (default 50) |
//! | `POST` | `/insights/generate` | Body: `{"owner":"user-1"}`; regenerates on demand |

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::Utc;
use radar_core::{
  insight::Insight, pipeline::generate_insights_for_user, store::RadarStore,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

const DEFAULT_LIMIT: u32 = 50;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub owner: String,
  pub limit: Option<u32>,
}

/// `GET /insights?owner=<owner>[&limit=20]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Insight>>, ApiError>
where
  S: RadarStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let insights = state
    .store
    .list_insights(&params.owner, params.limit.unwrap_or(DEFAULT_LIMIT))
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(insights))
}

// ─── Generate ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateBody {
  pub owner: String,
}

/// `POST /insights/generate` — body: `{"owner":"user-1"}`.
///
/// Walks the owner's collections and derives fresh insights from each
/// member's two most recent score snapshots. Triggering cadence is the
/// caller's concern; nothing here schedules itself.
pub async fn generate<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<GenerateBody>,
) -> Result<Json<Vec<Insight>>, ApiError>
where
  S: RadarStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let insights = generate_insights_for_user(
    &*state.store,
    &state.scoring,
    &body.owner,
    Utc::now(),
  )
  .await
  .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(insights))
}
