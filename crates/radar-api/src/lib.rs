//! JSON REST API for the radar.
//!
//! Exposes an axum [`Router`] backed by any [`radar_core::store::RadarStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", radar_api::api_router(store.clone(), scoring.clone()))
//! ```

pub mod candidates;
pub mod collections;
pub mod error;
pub mod events;
pub mod insights;
pub mod scores;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use radar_core::{config::ScoringConfig, store::RadarStore};

pub use error::ApiError;

/// Shared state threaded through all API handlers.
pub struct ApiState<S> {
  pub store:   Arc<S>,
  pub scoring: Arc<ScoringConfig>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:   Arc::clone(&self.store),
      scoring: Arc::clone(&self.scoring),
    }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(
  store: Arc<S>,
  scoring: Arc<ScoringConfig>,
) -> Router<()>
where
  S: RadarStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Candidates
    .route(
      "/candidates",
      get(candidates::list::<S>).post(candidates::create::<S>),
    )
    .route("/candidates/{slug}", get(candidates::get_one::<S>))
    .route("/candidates/{slug}/tags", post(candidates::add_tags::<S>))
    // Event ingestion
    .route("/candidates/{slug}/events", post(events::ingest::<S>))
    // Scores
    .route(
      "/candidates/{slug}/scores/recompute",
      post(scores::recompute::<S>),
    )
    .route("/candidates/{slug}/scores/latest", get(scores::latest::<S>))
    .route(
      "/candidates/{slug}/scores/history",
      get(scores::history::<S>),
    )
    .route("/candidates/{slug}/momentum", get(scores::momentum::<S>))
    // Collections
    .route(
      "/collections",
      get(collections::list::<S>).post(collections::create::<S>),
    )
    .route("/collections/{id}", get(collections::get_one::<S>))
    .route(
      "/collections/{id}/members",
      post(collections::add_member::<S>),
    )
    .route(
      "/collections/{id}/members/{slug}",
      delete(collections::remove_member::<S>),
    )
    .route(
      "/collections/{id}/members/{slug}/move",
      post(collections::move_member::<S>),
    )
    // Roster analysis
    .route("/collections/{id}/fit/{slug}", get(collections::fit::<S>))
    .route("/collections/{id}/gaps", get(collections::gaps::<S>))
    .route(
      "/collections/{id}/collabs",
      get(collections::collabs_within::<S>),
    )
    .route(
      "/candidates/{slug}/collabs",
      get(collections::external_collabs::<S>),
    )
    // Insights
    .route("/insights", get(insights::list::<S>))
    .route("/insights/generate", post(insights::generate::<S>))
    .with_state(ApiState { store, scoring })
}
