//! Error types for `radar-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("candidate not found: {0}")]
  CandidateNotFound(String),

  #[error("collection not found: {0}")]
  CollectionNotFound(Uuid),

  #[error("unknown signal type: {0:?}")]
  UnknownSignalType(String),

  #[error("unknown collection kind: {0:?}")]
  UnknownCollectionKind(String),

  #[error("unknown insight kind: {0:?}")]
  UnknownInsightKind(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
