//! Error type for `radar-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] radar_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("candidate not found: {0}")]
  CandidateNotFound(Uuid),

  #[error("candidate slug already taken: {0:?}")]
  SlugTaken(String),

  #[error("collection not found: {0}")]
  CollectionNotFound(Uuid),

  #[error("candidate {candidate_id} is not a member of collection {collection_id}")]
  MemberNotFound {
    collection_id: Uuid,
    candidate_id:  Uuid,
  },

  #[error("candidate {candidate_id} is already a member of collection {collection_id}")]
  AlreadyMember {
    collection_id: Uuid,
    candidate_id:  Uuid,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
