//! SQL schema for the radar SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS candidates (
    candidate_id TEXT PRIMARY KEY,
    slug         TEXT NOT NULL UNIQUE,
    name         TEXT NOT NULL,
    scene_tags   TEXT NOT NULL DEFAULT '[]',   -- JSON string array
    created_at   TEXT NOT NULL                 -- ISO 8601 UTC
);

-- Events are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table; the UNIQUE
-- constraint is the natural dedup key, and a conflict is a no-op insert.
CREATE TABLE IF NOT EXISTS events (
    event_id     TEXT PRIMARY KEY,
    candidate_id TEXT NOT NULL REFERENCES candidates(candidate_id),
    signal_type  TEXT NOT NULL,   -- SignalType discriminant
    value        REAL NOT NULL,
    source       TEXT NOT NULL,
    occurred_at  TEXT NOT NULL,
    ingested_at  TEXT NOT NULL,
    UNIQUE (candidate_id, signal_type, source, occurred_at)
);

-- One row per (candidate, signal type, computation run). Append-only.
CREATE TABLE IF NOT EXISTS momentum_scores (
    momentum_id   TEXT PRIMARY KEY,
    candidate_id  TEXT NOT NULL REFERENCES candidates(candidate_id),
    signal_type   TEXT NOT NULL,
    window_days   INTEGER NOT NULL,
    decayed_value REAL NOT NULL,
    computed_at   TEXT NOT NULL
);

-- One row per computation run; the score time series. Append-only.
CREATE TABLE IF NOT EXISTS composite_scores (
    score_id                  TEXT PRIMARY KEY,
    candidate_id              TEXT NOT NULL REFERENCES candidates(candidate_id),
    composite                 REAL NOT NULL,
    breakout_probability      REAL NOT NULL,
    low_confidence            INTEGER NOT NULL DEFAULT 0,
    computed_at               TEXT NOT NULL,
    contributing_momentum_ids TEXT NOT NULL DEFAULT '[]'   -- JSON uuid array
);

CREATE TABLE IF NOT EXISTS collections (
    collection_id TEXT PRIMARY KEY,
    kind          TEXT NOT NULL,   -- 'shortlist' | 'roster' | 'watchlist'
    name          TEXT NOT NULL,
    owner         TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS collection_members (
    collection_id TEXT NOT NULL REFERENCES collections(collection_id),
    candidate_id  TEXT NOT NULL REFERENCES candidates(candidate_id),
    position      INTEGER NOT NULL,
    notes         TEXT,
    added_at      TEXT NOT NULL,
    PRIMARY KEY (collection_id, candidate_id)
);

CREATE TABLE IF NOT EXISTS insights (
    insight_id   TEXT PRIMARY KEY,
    candidate_id TEXT NOT NULL REFERENCES candidates(candidate_id),
    owner        TEXT NOT NULL,
    kind         TEXT NOT NULL,   -- 'surge' | 'decline' | 'steady'
    magnitude    REAL NOT NULL,
    narrative    TEXT NOT NULL,
    window_start TEXT NOT NULL,
    window_end   TEXT NOT NULL,
    created_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS events_candidate_idx    ON events(candidate_id, occurred_at);
CREATE INDEX IF NOT EXISTS events_type_idx         ON events(signal_type);
CREATE INDEX IF NOT EXISTS momentum_candidate_idx  ON momentum_scores(candidate_id, computed_at);
CREATE INDEX IF NOT EXISTS composite_candidate_idx ON composite_scores(candidate_id, computed_at);
CREATE INDEX IF NOT EXISTS collections_owner_idx   ON collections(owner);
CREATE INDEX IF NOT EXISTS insights_owner_idx      ON insights(owner, created_at);

PRAGMA user_version = 1;
";
