//! User-curated collections: shortlists, rosters, and watchlists.
//!
//! Collections own the membership edge, not the candidate — a candidate may
//! appear in any number of collections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// What a collection is for. The kinds share storage and membership
/// semantics; fit and gap analysis are meaningful for rosters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
  Shortlist,
  Roster,
  Watchlist,
}

impl CollectionKind {
  /// The discriminant string stored in the `kind` column.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::Shortlist => "shortlist",
      Self::Roster => "roster",
      Self::Watchlist => "watchlist",
    }
  }

  pub fn from_discriminant(s: &str) -> Result<Self> {
    match s {
      "shortlist" => Ok(Self::Shortlist),
      "roster" => Ok(Self::Roster),
      "watchlist" => Ok(Self::Watchlist),
      other => Err(Error::UnknownCollectionKind(other.to_owned())),
    }
  }
}

/// A named, owner-scoped collection of candidate references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
  pub collection_id: Uuid,
  pub kind:          CollectionKind,
  pub name:          String,
  /// Opaque owner key (user or workspace id); the host's concern.
  pub owner:         String,
  pub created_at:    DateTime<Utc>,
}

/// The membership edge, with per-member metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionMember {
  pub candidate_id: Uuid,
  /// Display order within the collection. Reordering swaps positions with
  /// the occupant of the target slot; it never rewrites the whole list.
  pub position:     u32,
  pub notes:        Option<String>,
  pub added_at:     DateTime<Utc>,
}

/// A collection with its members, ordered by position — the computed read
/// model, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionView {
  pub collection: Collection,
  pub members:    Vec<CollectionMember>,
}
