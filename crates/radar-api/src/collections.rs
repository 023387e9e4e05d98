//! Handlers for `/collections` endpoints and roster analysis.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/collections` | Optional `?owner=`, `?kind=` |
//! | `POST` | `/collections` | Body: [`CreateBody`]; returns 201 |
//! | `GET`  | `/collections/:id` | Members ordered by position |
//! | `POST` | `/collections/:id/members` | Body: [`AddMemberBody`] |
//! | `DELETE` | `/collections/:id/members/:slug` | |
//! | `POST` | `/collections/:id/members/:slug/move` | Body: `{"position":0}` — position swap |
//! | `GET`  | `/collections/:id/fit/:slug` | Roster fit assessment |
//! | `GET`  | `/collections/:id/gaps` | Gaps vs the full catalog |
//! | `GET`  | `/collections/:id/collabs` | Pairings within the collection, `?limit=` |
//! | `GET`  | `/candidates/:slug/collabs` | External partners for one artist, `?limit=` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use radar_core::{
  candidate::Candidate,
  collection::{Collection, CollectionKind, CollectionMember, CollectionView},
  fit::{
    CollabProfile, CollabSuggestion, RosterFit, RosterGap,
    RosterMemberProfile, assess_roster_fit, compute_roster_gaps,
    suggest_collabs_within_roster, suggest_external_collabs,
  },
  store::RadarStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError, scores::resolve_candidate};

const DEFAULT_COLLAB_LIMIT: usize = 10;
/// History depth fed into trajectory comparison.
const COLLAB_HISTORY_DAYS: u32 = 90;

async fn resolve_collection<S>(
  state: &ApiState<S>,
  id: Uuid,
) -> Result<CollectionView, ApiError>
where
  S: RadarStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .get_collection(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("collection {id} not found")))
}

// ─── List / create / get ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub owner: Option<String>,
  pub kind:  Option<CollectionKind>,
}

/// `GET /collections[?owner=...][&kind=roster]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Collection>>, ApiError>
where
  S: RadarStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let collections = state
    .store
    .list_collections(params.owner.as_deref(), params.kind)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(collections))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub kind:  CollectionKind,
  pub name:  String,
  pub owner: String,
}

/// `POST /collections` — body: `{"kind":"roster","name":"main","owner":"user-1"}`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RadarStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("name must not be empty".into()));
  }
  let collection = state
    .store
    .create_collection(body.kind, body.name, body.owner)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(collection)))
}

/// `GET /collections/:id`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<CollectionView>, ApiError>
where
  S: RadarStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Ok(Json(resolve_collection(&state, id).await?))
}

// ─── Membership ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddMemberBody {
  pub slug:     String,
  pub position: Option<u32>,
  pub notes:    Option<String>,
}

/// `POST /collections/:id/members` — body: [`AddMemberBody`].
pub async fn add_member<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<AddMemberBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RadarStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let view = resolve_collection(&state, id).await?;
  let candidate = resolve_candidate(&state, &body.slug).await?;

  if view
    .members
    .iter()
    .any(|m| m.candidate_id == candidate.candidate_id)
  {
    return Err(ApiError::Conflict(format!(
      "{} is already a member",
      body.slug
    )));
  }

  let member: CollectionMember = state
    .store
    .add_member(id, candidate.candidate_id, body.position, body.notes)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(member)))
}

/// `DELETE /collections/:id/members/:slug`
pub async fn remove_member<S>(
  State(state): State<ApiState<S>>,
  Path((id, slug)): Path<(Uuid, String)>,
) -> Result<StatusCode, ApiError>
where
  S: RadarStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  resolve_collection(&state, id).await?;
  let candidate = resolve_candidate(&state, &slug).await?;
  state
    .store
    .remove_member(id, candidate.candidate_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct MoveBody {
  pub position: u32,
}

/// `POST /collections/:id/members/:slug/move` — body: `{"position":0}`.
pub async fn move_member<S>(
  State(state): State<ApiState<S>>,
  Path((id, slug)): Path<(Uuid, String)>,
  Json(body): Json<MoveBody>,
) -> Result<StatusCode, ApiError>
where
  S: RadarStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  resolve_collection(&state, id).await?;
  let candidate = resolve_candidate(&state, &slug).await?;
  state
    .store
    .move_member(id, candidate.candidate_id, body.position)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Roster fit ───────────────────────────────────────────────────────────────

async fn member_candidates<S>(
  state: &ApiState<S>,
  view: &CollectionView,
) -> Result<Vec<Candidate>, ApiError>
where
  S: RadarStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let mut candidates = Vec::with_capacity(view.members.len());
  for member in &view.members {
    if let Some(candidate) = state
      .store
      .get_candidate(member.candidate_id)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?
    {
      candidates.push(candidate);
    }
  }
  Ok(candidates)
}

async fn latest_composite_value<S>(
  state: &ApiState<S>,
  candidate_id: Uuid,
) -> Result<Option<f64>, ApiError>
where
  S: RadarStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let scores = state
    .store
    .recent_composites(candidate_id, 1)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(scores.first().map(|s| s.composite))
}

/// `GET /collections/:id/fit/:slug`
pub async fn fit<S>(
  State(state): State<ApiState<S>>,
  Path((id, slug)): Path<(Uuid, String)>,
) -> Result<Json<RosterFit>, ApiError>
where
  S: RadarStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let view = resolve_collection(&state, id).await?;
  let candidate = resolve_candidate(&state, &slug).await?;

  let candidate_score =
    latest_composite_value(&state, candidate.candidate_id).await?;

  let mut roster = Vec::with_capacity(view.members.len());
  for member in member_candidates(&state, &view).await? {
    let composite =
      latest_composite_value(&state, member.candidate_id).await?;
    roster.push(RosterMemberProfile {
      scene_tags: member.scene_tags,
      composite,
    });
  }

  Ok(Json(assess_roster_fit(
    &candidate.scene_tags,
    candidate_score,
    &roster,
  )))
}

// ─── Gap analysis ─────────────────────────────────────────────────────────────

/// `GET /collections/:id/gaps` — roster scene distribution vs the catalog.
pub async fn gaps<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<RosterGap>>, ApiError>
where
  S: RadarStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let view = resolve_collection(&state, id).await?;

  let roster_tags: Vec<Vec<String>> = member_candidates(&state, &view)
    .await?
    .into_iter()
    .map(|c| c.scene_tags)
    .collect();

  let reference_tags: Vec<Vec<String>> = state
    .store
    .list_candidates()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .into_iter()
    .map(|c| c.scene_tags)
    .collect();

  Ok(Json(compute_roster_gaps(&roster_tags, &reference_tags)))
}

// ─── Collaboration suggestions ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CollabParams {
  pub limit: Option<usize>,
}

async fn collab_profile<S>(
  state: &ApiState<S>,
  candidate: Candidate,
) -> Result<CollabProfile, ApiError>
where
  S: RadarStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let history = state
    .store
    .score_history(candidate.candidate_id, COLLAB_HISTORY_DAYS)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(CollabProfile {
    slug:          candidate.slug,
    name:          candidate.name,
    scene_tags:    candidate.scene_tags,
    score_history: history.iter().map(|s| s.composite).collect(),
  })
}

/// `GET /collections/:id/collabs[?limit=5]`
pub async fn collabs_within<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<CollabParams>,
) -> Result<Json<Vec<CollabSuggestion>>, ApiError>
where
  S: RadarStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let view = resolve_collection(&state, id).await?;

  let mut profiles = Vec::with_capacity(view.members.len());
  for candidate in member_candidates(&state, &view).await? {
    profiles.push(collab_profile(&state, candidate).await?);
  }

  Ok(Json(suggest_collabs_within_roster(
    &profiles,
    state.scoring.min_collab_compatibility,
    params.limit.unwrap_or(DEFAULT_COLLAB_LIMIT),
  )))
}

/// `GET /candidates/:slug/collabs[?limit=5]` — partners from the whole
/// catalog.
pub async fn external_collabs<S>(
  State(state): State<ApiState<S>>,
  Path(slug): Path<String>,
  Query(params): Query<CollabParams>,
) -> Result<Json<Vec<CollabSuggestion>>, ApiError>
where
  S: RadarStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let candidate = resolve_candidate(&state, &slug).await?;
  let artist = collab_profile(&state, candidate).await?;

  let pool_candidates = state
    .store
    .list_candidates()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let mut pool = Vec::with_capacity(pool_candidates.len());
  for other in pool_candidates {
    if other.slug != artist.slug {
      pool.push(collab_profile(&state, other).await?);
    }
  }

  Ok(Json(suggest_external_collabs(
    &artist,
    &pool,
    state.scoring.min_collab_compatibility,
    params.limit.unwrap_or(DEFAULT_COLLAB_LIMIT),
  )))
}
