//! Handlers for `/candidates` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/candidates` | All candidates, ordered by slug |
//! | `POST` | `/candidates` | Body: [`radar_core::candidate::NewCandidate`]; returns 201 |
//! | `GET`  | `/candidates/:slug` | 404 if not found |
//! | `POST` | `/candidates/:slug/tags` | Body: `{"tags":["..."]}`; returns updated candidate |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use radar_core::{
  candidate::{Candidate, NewCandidate},
  store::RadarStore,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /candidates`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Candidate>>, ApiError>
where
  S: RadarStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let candidates = state
    .store
    .list_candidates()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(candidates))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /candidates` — body: `{"slug":"kyara","name":"Kyara","scene_tags":[...]}`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewCandidate>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RadarStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if body.slug.trim().is_empty() {
    return Err(ApiError::BadRequest("slug must not be empty".into()));
  }

  let existing = state
    .store
    .get_candidate_by_slug(&body.slug)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if existing.is_some() {
    return Err(ApiError::Conflict(format!(
      "slug {:?} is already taken",
      body.slug
    )));
  }

  let candidate = state
    .store
    .add_candidate(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(candidate)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /candidates/:slug`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(slug): Path<String>,
) -> Result<Json<Candidate>, ApiError>
where
  S: RadarStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let candidate = state
    .store
    .get_candidate_by_slug(&slug)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("candidate {slug} not found")))?;
  Ok(Json(candidate))
}

// ─── Add tags ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddTagsBody {
  pub tags: Vec<String>,
}

/// `POST /candidates/:slug/tags` — body: `{"tags":["uk-garage"]}`
pub async fn add_tags<S>(
  State(state): State<ApiState<S>>,
  Path(slug): Path<String>,
  Json(body): Json<AddTagsBody>,
) -> Result<Json<Candidate>, ApiError>
where
  S: RadarStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let candidate = state
    .store
    .get_candidate_by_slug(&slug)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("candidate {slug} not found")))?;

  let updated = state
    .store
    .add_scene_tags(candidate.candidate_id, body.tags)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(updated))
}
