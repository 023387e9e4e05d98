//! Handlers for score endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/candidates/:slug/scores/recompute` | Runs momentum + composite now |
//! | `GET`  | `/candidates/:slug/scores/latest` | 404 until the first run |
//! | `GET`  | `/candidates/:slug/scores/history` | `?days=` (default 90), oldest first |
//! | `GET`  | `/candidates/:slug/momentum` | Latest run's rows, one per signal type |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::Utc;
use radar_core::{
  candidate::Candidate,
  pipeline::run_scoring,
  score::{CompositeScore, MomentumScore},
  store::RadarStore,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

pub(crate) async fn resolve_candidate<S>(
  state: &ApiState<S>,
  slug: &str,
) -> Result<Candidate, ApiError>
where
  S: RadarStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .get_candidate_by_slug(slug)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("candidate {slug} not found")))
}

// ─── Recompute ────────────────────────────────────────────────────────────────

/// `POST /candidates/:slug/scores/recompute`
pub async fn recompute<S>(
  State(state): State<ApiState<S>>,
  Path(slug): Path<String>,
) -> Result<Json<CompositeScore>, ApiError>
where
  S: RadarStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let candidate = resolve_candidate(&state, &slug).await?;
  let score = run_scoring(
    &*state.store,
    &state.scoring,
    &candidate,
    Utc::now(),
    false,
  )
  .await
  .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(score))
}

// ─── Latest ───────────────────────────────────────────────────────────────────

/// `GET /candidates/:slug/scores/latest`
pub async fn latest<S>(
  State(state): State<ApiState<S>>,
  Path(slug): Path<String>,
) -> Result<Json<CompositeScore>, ApiError>
where
  S: RadarStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let candidate = resolve_candidate(&state, &slug).await?;
  let mut scores = state
    .store
    .recent_composites(candidate.candidate_id, 1)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let score = scores
    .pop()
    .ok_or_else(|| ApiError::NotFound(format!("no score yet for {slug}")))?;
  Ok(Json(score))
}

// ─── History ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
  /// Trailing window in days. Defaults to 90.
  pub days: Option<u32>,
}

/// `GET /candidates/:slug/scores/history[?days=30]`
pub async fn history<S>(
  State(state): State<ApiState<S>>,
  Path(slug): Path<String>,
  Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<CompositeScore>>, ApiError>
where
  S: RadarStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let candidate = resolve_candidate(&state, &slug).await?;
  let history = state
    .store
    .score_history(candidate.candidate_id, params.days.unwrap_or(90))
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(history))
}

// ─── Momentum ─────────────────────────────────────────────────────────────────

/// `GET /candidates/:slug/momentum`
pub async fn momentum<S>(
  State(state): State<ApiState<S>>,
  Path(slug): Path<String>,
) -> Result<Json<Vec<MomentumScore>>, ApiError>
where
  S: RadarStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let candidate = resolve_candidate(&state, &slug).await?;
  let momentum = state
    .store
    .latest_momentum(candidate.candidate_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(momentum))
}
