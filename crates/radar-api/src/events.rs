//! Handler for `POST /candidates/:slug/events` — batch event ingestion.
//!
//! The response always carries accepted/rejected/duplicate counts with
//! per-item error detail, so a caller can see exactly which events failed
//! and why without losing the accepted ones. The only 404 is an unknown
//! candidate.

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::Utc;
use radar_core::{
  event::{EventSubmission, IngestReport},
  ingest::{IngestError, ingest_events},
  store::RadarStore,
};

use crate::{ApiState, error::ApiError};

/// `POST /candidates/:slug/events` — body: JSON array of [`EventSubmission`].
pub async fn ingest<S>(
  State(state): State<ApiState<S>>,
  Path(slug): Path<String>,
  Json(batch): Json<Vec<EventSubmission>>,
) -> Result<Json<IngestReport>, ApiError>
where
  S: RadarStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let report =
    ingest_events(&*state.store, &state.scoring, &slug, batch, Utc::now())
      .await
      .map_err(|e| match e {
        IngestError::UnknownCandidate(slug) => {
          ApiError::NotFound(format!("candidate {slug} not found"))
        }
        IngestError::Store(e) => ApiError::Store(Box::new(e)),
      })?;
  Ok(Json(report))
}
