//! [`SqliteStore`] — the SQLite implementation of [`RadarStore`].

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use radar_core::{
  candidate::{Candidate, NewCandidate},
  collection::{Collection, CollectionKind, CollectionMember, CollectionView},
  event::{SignalEvent, SignalType},
  insight::Insight,
  score::{CompositeScore, MomentumScore},
  store::{AppendOutcome, RadarStore},
};

use crate::{
  Error, Result,
  encode::{
    RawCandidate, RawCollection, RawComposite, RawEvent, RawInsight,
    RawMember, RawMomentum, encode_dt, encode_tags, encode_uuid,
    encode_uuid_list,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A radar store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn candidate_exists(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let exists: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM candidates WHERE candidate_id = ?1",
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }

  async fn collection_row(&self, id: Uuid) -> Result<Option<Collection>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawCollection> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT collection_id, kind, name, owner, created_at
               FROM collections WHERE collection_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawCollection {
                  collection_id: row.get(0)?,
                  kind:          row.get(1)?,
                  name:          row.get(2)?,
                  owner:         row.get(3)?,
                  created_at:    row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawCollection::into_collection).transpose()
  }

  async fn member_position(
    &self,
    collection_id: Uuid,
    candidate_id: Uuid,
  ) -> Result<Option<u32>> {
    let coll_str = encode_uuid(collection_id);
    let cand_str = encode_uuid(candidate_id);
    let position: Option<u32> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT position FROM collection_members
               WHERE collection_id = ?1 AND candidate_id = ?2",
              rusqlite::params![coll_str, cand_str],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(position)
  }
}

// ─── RadarStore impl ─────────────────────────────────────────────────────────

impl RadarStore for SqliteStore {
  type Error = Error;

  // ── Candidates ────────────────────────────────────────────────────────────

  async fn add_candidate(&self, input: NewCandidate) -> Result<Candidate> {
    if self.get_candidate_by_slug(&input.slug).await?.is_some() {
      return Err(Error::SlugTaken(input.slug));
    }

    let candidate = Candidate {
      candidate_id: Uuid::new_v4(),
      slug:         input.slug,
      name:         input.name,
      scene_tags:   input.scene_tags,
      created_at:   Utc::now(),
    };

    let id_str   = encode_uuid(candidate.candidate_id);
    let slug     = candidate.slug.clone();
    let name     = candidate.name.clone();
    let tags_str = encode_tags(&candidate.scene_tags)?;
    let at_str   = encode_dt(candidate.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO candidates (candidate_id, slug, name, scene_tags, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, slug, name, tags_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(candidate)
  }

  async fn get_candidate(&self, id: Uuid) -> Result<Option<Candidate>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCandidate> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT candidate_id, slug, name, scene_tags, created_at
               FROM candidates WHERE candidate_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawCandidate {
                  candidate_id: row.get(0)?,
                  slug:         row.get(1)?,
                  name:         row.get(2)?,
                  scene_tags:   row.get(3)?,
                  created_at:   row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCandidate::into_candidate).transpose()
  }

  async fn get_candidate_by_slug(&self, slug: &str) -> Result<Option<Candidate>> {
    let slug = slug.to_owned();

    let raw: Option<RawCandidate> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT candidate_id, slug, name, scene_tags, created_at
               FROM candidates WHERE slug = ?1",
              rusqlite::params![slug],
              |row| {
                Ok(RawCandidate {
                  candidate_id: row.get(0)?,
                  slug:         row.get(1)?,
                  name:         row.get(2)?,
                  scene_tags:   row.get(3)?,
                  created_at:   row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCandidate::into_candidate).transpose()
  }

  async fn list_candidates(&self) -> Result<Vec<Candidate>> {
    let raws: Vec<RawCandidate> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT candidate_id, slug, name, scene_tags, created_at
           FROM candidates ORDER BY slug",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawCandidate {
              candidate_id: row.get(0)?,
              slug:         row.get(1)?,
              name:         row.get(2)?,
              scene_tags:   row.get(3)?,
              created_at:   row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCandidate::into_candidate).collect()
  }

  async fn add_scene_tags(&self, id: Uuid, tags: Vec<String>) -> Result<Candidate> {
    let mut candidate = self
      .get_candidate(id)
      .await?
      .ok_or(Error::CandidateNotFound(id))?;

    for tag in tags {
      if !candidate.scene_tags.contains(&tag) {
        candidate.scene_tags.push(tag);
      }
    }

    let id_str   = encode_uuid(id);
    let tags_str = encode_tags(&candidate.scene_tags)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE candidates SET scene_tags = ?1 WHERE candidate_id = ?2",
          rusqlite::params![tags_str, id_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(candidate)
  }

  // ── Events — append-only writes ───────────────────────────────────────────

  async fn append_events(
    &self,
    events: Vec<SignalEvent>,
  ) -> Result<Vec<AppendOutcome>> {
    let rows: Vec<(String, String, &'static str, f64, String, String, String)> =
      events
        .iter()
        .map(|e| {
          (
            encode_uuid(e.event_id),
            encode_uuid(e.candidate_id),
            e.signal_type.discriminant(),
            e.value,
            e.source.clone(),
            encode_dt(e.occurred_at),
            encode_dt(e.ingested_at),
          )
        })
        .collect();

    let outcomes: Vec<AppendOutcome> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut outcomes = Vec::with_capacity(rows.len());
        {
          // The natural-key UNIQUE constraint turns a re-ingested duplicate
          // into an ignored insert, reported as such.
          let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO events (
               event_id, candidate_id, signal_type, value,
               source, occurred_at, ingested_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          )?;
          for row in &rows {
            let changed = stmt.execute(rusqlite::params![
              row.0, row.1, row.2, row.3, row.4, row.5, row.6,
            ])?;
            outcomes.push(if changed == 1 {
              AppendOutcome::Inserted
            } else {
              AppendOutcome::Duplicate
            });
          }
        }
        tx.commit()?;
        Ok(outcomes)
      })
      .await?;

    Ok(outcomes)
  }

  async fn events_for_candidate(
    &self,
    id: Uuid,
    signal_type: Option<SignalType>,
    since: DateTime<Utc>,
    until: DateTime<Utc>,
  ) -> Result<Vec<SignalEvent>> {
    let id_str    = encode_uuid(id);
    let type_str  = signal_type.map(|t| t.discriminant().to_owned());
    let since_str = encode_dt(since);
    let until_str = encode_dt(until);

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let map_row = |row: &rusqlite::Row<'_>| {
          Ok(RawEvent {
            event_id:     row.get(0)?,
            candidate_id: row.get(1)?,
            signal_type:  row.get(2)?,
            value:        row.get(3)?,
            source:       row.get(4)?,
            occurred_at:  row.get(5)?,
            ingested_at:  row.get(6)?,
          })
        };

        let rows = if let Some(t) = type_str {
          let mut stmt = conn.prepare(
            "SELECT event_id, candidate_id, signal_type, value,
                    source, occurred_at, ingested_at
             FROM events
             WHERE candidate_id = ?1
               AND signal_type = ?2
               AND occurred_at >= ?3
               AND occurred_at <= ?4
             ORDER BY occurred_at",
          )?;
          stmt
            .query_map(
              rusqlite::params![id_str, t, since_str, until_str],
              map_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(
            "SELECT event_id, candidate_id, signal_type, value,
                    source, occurred_at, ingested_at
             FROM events
             WHERE candidate_id = ?1
               AND occurred_at >= ?2
               AND occurred_at <= ?3
             ORDER BY occurred_at",
          )?;
          stmt
            .query_map(
              rusqlite::params![id_str, since_str, until_str],
              map_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn count_events(&self, id: Uuid) -> Result<u64> {
    let id_str = encode_uuid(id);
    let count: u64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM events WHERE candidate_id = ?1",
          rusqlite::params![id_str],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(count)
  }

  // ── Scores — append-only time series ──────────────────────────────────────

  async fn append_momentum(&self, scores: Vec<MomentumScore>) -> Result<()> {
    let rows: Vec<(String, String, &'static str, u32, f64, String)> = scores
      .iter()
      .map(|m| {
        (
          encode_uuid(m.momentum_id),
          encode_uuid(m.candidate_id),
          m.signal_type.discriminant(),
          m.window_days,
          m.decayed_value,
          encode_dt(m.computed_at),
        )
      })
      .collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO momentum_scores (
               momentum_id, candidate_id, signal_type,
               window_days, decayed_value, computed_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          )?;
          for row in &rows {
            stmt.execute(rusqlite::params![
              row.0, row.1, row.2, row.3, row.4, row.5,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn latest_momentum(&self, id: Uuid) -> Result<Vec<MomentumScore>> {
    let id_str = encode_uuid(id);

    let raws: Vec<RawMomentum> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT momentum_id, candidate_id, signal_type,
                  window_days, decayed_value, computed_at
           FROM momentum_scores
           WHERE candidate_id = ?1
             AND computed_at = (
               SELECT MAX(computed_at) FROM momentum_scores
               WHERE candidate_id = ?1
             )
           ORDER BY signal_type",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawMomentum {
              momentum_id:   row.get(0)?,
              candidate_id:  row.get(1)?,
              signal_type:   row.get(2)?,
              window_days:   row.get(3)?,
              decayed_value: row.get(4)?,
              computed_at:   row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMomentum::into_momentum).collect()
  }

  async fn append_composite(&self, score: CompositeScore) -> Result<()> {
    let score_id_str = encode_uuid(score.score_id);
    let cand_id_str  = encode_uuid(score.candidate_id);
    let at_str       = encode_dt(score.computed_at);
    let ids_str      = encode_uuid_list(&score.contributing_momentum_ids)?;
    let composite    = score.composite;
    let breakout     = score.breakout_probability;
    let low_conf     = score.low_confidence;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO composite_scores (
             score_id, candidate_id, composite, breakout_probability,
             low_confidence, computed_at, contributing_momentum_ids
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            score_id_str,
            cand_id_str,
            composite,
            breakout,
            low_conf,
            at_str,
            ids_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn recent_composites(
    &self,
    id: Uuid,
    limit: u32,
  ) -> Result<Vec<CompositeScore>> {
    let id_str = encode_uuid(id);

    let raws: Vec<RawComposite> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT score_id, candidate_id, composite, breakout_probability,
                  low_confidence, computed_at, contributing_momentum_ids
           FROM composite_scores
           WHERE candidate_id = ?1
           ORDER BY computed_at DESC
           LIMIT ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str, limit], |row| {
            Ok(RawComposite {
              score_id:                  row.get(0)?,
              candidate_id:              row.get(1)?,
              composite:                 row.get(2)?,
              breakout_probability:      row.get(3)?,
              low_confidence:            row.get(4)?,
              computed_at:               row.get(5)?,
              contributing_momentum_ids: row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComposite::into_composite).collect()
  }

  async fn score_history(&self, id: Uuid, days: u32) -> Result<Vec<CompositeScore>> {
    let id_str    = encode_uuid(id);
    let since_str = encode_dt(Utc::now() - Duration::days(i64::from(days)));

    let raws: Vec<RawComposite> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT score_id, candidate_id, composite, breakout_probability,
                  low_confidence, computed_at, contributing_momentum_ids
           FROM composite_scores
           WHERE candidate_id = ?1 AND computed_at >= ?2
           ORDER BY computed_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str, since_str], |row| {
            Ok(RawComposite {
              score_id:                  row.get(0)?,
              candidate_id:              row.get(1)?,
              composite:                 row.get(2)?,
              breakout_probability:      row.get(3)?,
              low_confidence:            row.get(4)?,
              computed_at:               row.get(5)?,
              contributing_momentum_ids: row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComposite::into_composite).collect()
  }

  // ── Collections ───────────────────────────────────────────────────────────

  async fn create_collection(
    &self,
    kind: CollectionKind,
    name: String,
    owner: String,
  ) -> Result<Collection> {
    let collection = Collection {
      collection_id: Uuid::new_v4(),
      kind,
      name,
      owner,
      created_at: Utc::now(),
    };

    let id_str   = encode_uuid(collection.collection_id);
    let kind_str = kind.discriminant().to_owned();
    let name     = collection.name.clone();
    let owner    = collection.owner.clone();
    let at_str   = encode_dt(collection.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO collections (collection_id, kind, name, owner, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, kind_str, name, owner, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(collection)
  }

  async fn get_collection(&self, id: Uuid) -> Result<Option<CollectionView>> {
    let collection = match self.collection_row(id).await? {
      Some(c) => c,
      None    => return Ok(None),
    };

    let id_str = encode_uuid(id);
    let raws: Vec<RawMember> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT candidate_id, position, notes, added_at
           FROM collection_members
           WHERE collection_id = ?1
           ORDER BY position",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawMember {
              candidate_id: row.get(0)?,
              position:     row.get(1)?,
              notes:        row.get(2)?,
              added_at:     row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let members = raws
      .into_iter()
      .map(RawMember::into_member)
      .collect::<Result<Vec<_>>>()?;

    Ok(Some(CollectionView { collection, members }))
  }

  async fn list_collections(
    &self,
    owner: Option<&str>,
    kind: Option<CollectionKind>,
  ) -> Result<Vec<Collection>> {
    let owner_str = owner.map(str::to_owned);
    let kind_str  = kind.map(|k| k.discriminant().to_owned());

    let raws: Vec<RawCollection> = self
      .conn
      .call(move |conn| {
        let map_row = |row: &rusqlite::Row<'_>| {
          Ok(RawCollection {
            collection_id: row.get(0)?,
            kind:          row.get(1)?,
            name:          row.get(2)?,
            owner:         row.get(3)?,
            created_at:    row.get(4)?,
          })
        };

        let rows = match (owner_str, kind_str) {
          (Some(o), Some(k)) => {
            let mut stmt = conn.prepare(
              "SELECT collection_id, kind, name, owner, created_at
               FROM collections WHERE owner = ?1 AND kind = ?2
               ORDER BY created_at",
            )?;
            stmt
              .query_map(rusqlite::params![o, k], map_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
          (Some(o), None) => {
            let mut stmt = conn.prepare(
              "SELECT collection_id, kind, name, owner, created_at
               FROM collections WHERE owner = ?1
               ORDER BY created_at",
            )?;
            stmt
              .query_map(rusqlite::params![o], map_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
          (None, Some(k)) => {
            let mut stmt = conn.prepare(
              "SELECT collection_id, kind, name, owner, created_at
               FROM collections WHERE kind = ?1
               ORDER BY created_at",
            )?;
            stmt
              .query_map(rusqlite::params![k], map_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
          (None, None) => {
            let mut stmt = conn.prepare(
              "SELECT collection_id, kind, name, owner, created_at
               FROM collections ORDER BY created_at",
            )?;
            stmt
              .query_map([], map_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
        };
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawCollection::into_collection)
      .collect()
  }

  async fn add_member(
    &self,
    collection_id: Uuid,
    candidate_id: Uuid,
    position: Option<u32>,
    notes: Option<String>,
  ) -> Result<CollectionMember> {
    if self.collection_row(collection_id).await?.is_none() {
      return Err(Error::CollectionNotFound(collection_id));
    }
    if !self.candidate_exists(candidate_id).await? {
      return Err(Error::CandidateNotFound(candidate_id));
    }
    if self
      .member_position(collection_id, candidate_id)
      .await?
      .is_some()
    {
      return Err(Error::AlreadyMember {
        collection_id,
        candidate_id,
      });
    }

    let added_at = Utc::now();
    let coll_str = encode_uuid(collection_id);
    let cand_str = encode_uuid(candidate_id);
    let at_str   = encode_dt(added_at);
    let notes_cl = notes.clone();

    let assigned: u32 = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let assigned = match position {
          Some(p) => p,
          // Append at the end of the list.
          None => {
            let max: Option<u32> = tx.query_row(
              "SELECT MAX(position) FROM collection_members
               WHERE collection_id = ?1",
              rusqlite::params![coll_str],
              |row| row.get(0),
            )?;
            max.map_or(0, |m| m + 1)
          }
        };
        tx.execute(
          "INSERT INTO collection_members
             (collection_id, candidate_id, position, notes, added_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![coll_str, cand_str, assigned, notes_cl, at_str],
        )?;
        tx.commit()?;
        Ok(assigned)
      })
      .await?;

    Ok(CollectionMember {
      candidate_id,
      position: assigned,
      notes,
      added_at,
    })
  }

  async fn remove_member(
    &self,
    collection_id: Uuid,
    candidate_id: Uuid,
  ) -> Result<()> {
    let coll_str = encode_uuid(collection_id);
    let cand_str = encode_uuid(candidate_id);

    let removed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM collection_members
           WHERE collection_id = ?1 AND candidate_id = ?2",
          rusqlite::params![coll_str, cand_str],
        )?)
      })
      .await?;

    if removed == 0 {
      return Err(Error::MemberNotFound {
        collection_id,
        candidate_id,
      });
    }
    Ok(())
  }

  async fn move_member(
    &self,
    collection_id: Uuid,
    candidate_id: Uuid,
    position: u32,
  ) -> Result<()> {
    let coll_str = encode_uuid(collection_id);
    let cand_str = encode_uuid(candidate_id);

    let found: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let current: Option<u32> = tx
          .query_row(
            "SELECT position FROM collection_members
             WHERE collection_id = ?1 AND candidate_id = ?2",
            rusqlite::params![coll_str, cand_str],
            |row| row.get(0),
          )
          .optional()?;
        let Some(current) = current else {
          return Ok(false);
        };

        // Position swap with the occupant of the target slot, if any.
        // The rest of the list keeps its positions.
        let occupant: Option<String> = tx
          .query_row(
            "SELECT candidate_id FROM collection_members
             WHERE collection_id = ?1 AND position = ?2",
            rusqlite::params![coll_str, position],
            |row| row.get(0),
          )
          .optional()?;

        if let Some(other) = occupant {
          tx.execute(
            "UPDATE collection_members SET position = ?1
             WHERE collection_id = ?2 AND candidate_id = ?3",
            rusqlite::params![current, coll_str, other],
          )?;
        }
        tx.execute(
          "UPDATE collection_members SET position = ?1
           WHERE collection_id = ?2 AND candidate_id = ?3",
          rusqlite::params![position, coll_str, cand_str],
        )?;

        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !found {
      return Err(Error::MemberNotFound {
        collection_id,
        candidate_id,
      });
    }
    Ok(())
  }

  // ── Insights ──────────────────────────────────────────────────────────────

  async fn append_insight(&self, insight: Insight) -> Result<()> {
    let id_str      = encode_uuid(insight.insight_id);
    let cand_str    = encode_uuid(insight.candidate_id);
    let owner       = insight.owner.clone();
    let kind_str    = insight.kind.discriminant().to_owned();
    let magnitude   = insight.magnitude;
    let narrative   = insight.narrative.clone();
    let start_str   = encode_dt(insight.window_start);
    let end_str     = encode_dt(insight.window_end);
    let created_str = encode_dt(insight.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO insights (
             insight_id, candidate_id, owner, kind, magnitude,
             narrative, window_start, window_end, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str, cand_str, owner, kind_str, magnitude,
            narrative, start_str, end_str, created_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_insights(&self, owner: &str, limit: u32) -> Result<Vec<Insight>> {
    let owner = owner.to_owned();

    let raws: Vec<RawInsight> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT insight_id, candidate_id, owner, kind, magnitude,
                  narrative, window_start, window_end, created_at
           FROM insights
           WHERE owner = ?1
           ORDER BY created_at DESC
           LIMIT ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![owner, limit], |row| {
            Ok(RawInsight {
              insight_id:   row.get(0)?,
              candidate_id: row.get(1)?,
              owner:        row.get(2)?,
              kind:         row.get(3)?,
              magnitude:    row.get(4)?,
              narrative:    row.get(5)?,
              window_start: row.get(6)?,
              window_end:   row.get(7)?,
              created_at:   row.get(8)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawInsight::into_insight).collect()
  }
}
