//! HTTP server assembly for the radar.
//!
//! Exposes configuration types, the batch pipeline, and a [`Router`] that
//! mounts the JSON API under `/api`. Auth and TLS are the deployment's
//! concern — the radar sits behind whatever the host terminates.

pub mod pipeline;

use std::{path::PathBuf, sync::Arc};

use axum::{Json, Router, routing::get};
use radar_adapters::{
  AdapterSet, CmgAdapter, ContextAdapter, FusionAdapter, MigAdapter,
  ScenesAdapter,
};
use radar_core::{adapter::AdapterError, config::ScoringConfig, store::RadarStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Base URLs for the context adapters; any subset may be configured.
/// An unconfigured adapter simply never contributes signals.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdapterConfig {
  pub mig_base_url:    Option<String>,
  pub scenes_base_url: Option<String>,
  pub fusion_base_url: Option<String>,
  pub cmg_base_url:    Option<String>,
}

/// Runtime server configuration, deserialised from `config.toml` plus
/// `RADAR_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,

  /// Upper bound on concurrently-recomputed candidates. Sized to what the
  /// store and the adapters tolerate, not to CPU count.
  #[serde(default = "default_concurrency")]
  pub recompute_concurrency: usize,

  #[serde(default)]
  pub adapters: AdapterConfig,

  #[serde(default)]
  pub scoring: ScoringConfig,
}

fn default_concurrency() -> usize { 8 }

/// Build the closed adapter set from whatever base URLs are configured.
pub fn build_adapter_set(
  cfg: &AdapterConfig,
) -> Result<AdapterSet, AdapterError> {
  let mut adapters = Vec::new();
  if let Some(url) = &cfg.mig_base_url {
    adapters.push(ContextAdapter::Mig(MigAdapter::new(url.clone())?));
  }
  if let Some(url) = &cfg.scenes_base_url {
    adapters.push(ContextAdapter::Scenes(ScenesAdapter::new(url.clone())?));
  }
  if let Some(url) = &cfg.fusion_base_url {
    adapters.push(ContextAdapter::Fusion(FusionAdapter::new(url.clone())?));
  }
  if let Some(url) = &cfg.cmg_base_url {
    adapters.push(ContextAdapter::Cmg(CmgAdapter::new(url.clone())?));
  }
  Ok(AdapterSet::new(adapters))
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full server router: `/health` plus the JSON API under `/api`.
pub fn router<S>(store: Arc<S>, scoring: Arc<ScoringConfig>) -> Router
where
  S: RadarStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/health", get(health))
    .nest("/api", radar_api::api_router(store, scoring))
    .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<serde_json::Value> {
  Json(serde_json::json!({ "status": "ok" }))
}

// ─── Integration tests ────────────────────────────────────────────────────────
