//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use radar_core::{
  candidate::NewCandidate,
  collection::CollectionKind,
  config::ScoringConfig,
  event::{EventSubmission, SignalEvent, SignalType},
  ingest::ingest_events,
  pipeline::{generate_insights_for_user, run_scoring},
  store::{AppendOutcome, RadarStore},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn kyara(s: &SqliteStore) -> radar_core::candidate::Candidate {
  s.add_candidate(NewCandidate {
    slug:       "kyara".into(),
    name:       "Kyara".into(),
    scene_tags: vec!["electronic".into()],
  })
  .await
  .unwrap()
}

fn event(
  candidate_id: Uuid,
  signal_type: SignalType,
  value: f64,
  days_ago: i64,
) -> SignalEvent {
  let occurred_at = Utc::now() - Duration::days(days_ago);
  SignalEvent {
    event_id: Uuid::new_v4(),
    candidate_id,
    signal_type,
    value,
    source: "test".into(),
    occurred_at,
    ingested_at: Utc::now(),
  }
}

fn submission(signal_type: &str, value: f64, days_ago: i64) -> EventSubmission {
  EventSubmission {
    signal_type: signal_type.to_owned(),
    value,
    source:      "feed".to_owned(),
    occurred_at: Utc::now() - Duration::days(days_ago),
  }
}

// ─── Candidates ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_candidate() {
  let s = store().await;

  let candidate = kyara(&s).await;
  assert_eq!(candidate.slug, "kyara");

  let fetched = s.get_candidate(candidate.candidate_id).await.unwrap();
  assert!(fetched.is_some());
  let fetched = fetched.unwrap();
  assert_eq!(fetched.candidate_id, candidate.candidate_id);
  assert_eq!(fetched.scene_tags, vec!["electronic".to_owned()]);
}

#[tokio::test]
async fn get_candidate_by_slug() {
  let s = store().await;
  let candidate = kyara(&s).await;

  let fetched = s.get_candidate_by_slug("kyara").await.unwrap().unwrap();
  assert_eq!(fetched.candidate_id, candidate.candidate_id);

  assert!(s.get_candidate_by_slug("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_slug_is_rejected() {
  let s = store().await;
  kyara(&s).await;

  let err = s
    .add_candidate(NewCandidate {
      slug:       "kyara".into(),
      name:       "Another Kyara".into(),
      scene_tags: vec![],
    })
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::SlugTaken(_)));
}

#[tokio::test]
async fn add_scene_tags_merges_without_duplicates() {
  let s = store().await;
  let candidate = kyara(&s).await;

  let updated = s
    .add_scene_tags(
      candidate.candidate_id,
      vec!["electronic".into(), "uk-garage".into()],
    )
    .await
    .unwrap();
  assert_eq!(updated.scene_tags, vec![
    "electronic".to_owned(),
    "uk-garage".to_owned(),
  ]);

  // Persisted, not just returned.
  let fetched = s
    .get_candidate(candidate.candidate_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched.scene_tags.len(), 2);
}

#[tokio::test]
async fn add_scene_tags_unknown_candidate_errors() {
  let s = store().await;
  let err = s
    .add_scene_tags(Uuid::new_v4(), vec!["jazz".into()])
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::CandidateNotFound(_)));
}

// ─── Event appends and dedup ─────────────────────────────────────────────────

#[tokio::test]
async fn append_events_reports_inserted_and_duplicate() {
  let s = store().await;
  let candidate = kyara(&s).await;

  let e = event(candidate.candidate_id, SignalType::Mention, 10.0, 1);
  let outcomes = s.append_events(vec![e.clone()]).await.unwrap();
  assert_eq!(outcomes, vec![AppendOutcome::Inserted]);

  // Same natural key, different event_id — still a duplicate.
  let mut replay = e.clone();
  replay.event_id = Uuid::new_v4();
  let outcomes = s.append_events(vec![replay]).await.unwrap();
  assert_eq!(outcomes, vec![AppendOutcome::Duplicate]);

  assert_eq!(s.count_events(candidate.candidate_id).await.unwrap(), 1);
}

#[tokio::test]
async fn events_for_candidate_filters_by_type_and_range() {
  let s = store().await;
  let candidate = kyara(&s).await;

  s.append_events(vec![
    event(candidate.candidate_id, SignalType::Mention, 1.0, 1),
    event(candidate.candidate_id, SignalType::Mention, 2.0, 10),
    event(candidate.candidate_id, SignalType::Coverage, 3.0, 1),
    event(candidate.candidate_id, SignalType::Mention, 4.0, 120),
  ])
  .await
  .unwrap();

  let now = Utc::now();
  let mentions = s
    .events_for_candidate(
      candidate.candidate_id,
      Some(SignalType::Mention),
      now - Duration::days(90),
      now,
    )
    .await
    .unwrap();
  assert_eq!(mentions.len(), 2);
  // Oldest first.
  assert_eq!(mentions[0].value, 2.0);
  assert_eq!(mentions[1].value, 1.0);

  let everything = s
    .events_for_candidate(
      candidate.candidate_id,
      None,
      now - Duration::days(365),
      now,
    )
    .await
    .unwrap();
  assert_eq!(everything.len(), 4);
}

// ─── Ingestion ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn ingest_rejects_invalid_items_and_keeps_the_rest() {
  let s = store().await;
  kyara(&s).await;
  let cfg = ScoringConfig::default();

  let batch = vec![
    submission("mention", 10.0, 1),
    submission("coverage", 50.0, 2),
    submission("stream_delta", 7.0, 3),
    submission("mention", -1.0, 1),
    submission("playlist_add", 1.0, 4),
  ];

  let report = ingest_events(&s, &cfg, "kyara", batch, Utc::now())
    .await
    .unwrap();
  assert_eq!(report.accepted, 4);
  assert_eq!(report.rejected, 1);
  assert_eq!(report.errors.len(), 1);
  assert_eq!(report.errors[0].index, 3);
  assert_eq!(report.errors[0].reason, "negative value");
}

#[tokio::test]
async fn ingest_is_idempotent_under_retry() {
  let s = store().await;
  let candidate = kyara(&s).await;
  let cfg = ScoringConfig::default();

  let batch = vec![
    submission("mention", 10.0, 1),
    submission("coverage", 50.0, 2),
  ];

  let first = ingest_events(&s, &cfg, "kyara", batch.clone(), Utc::now())
    .await
    .unwrap();
  assert_eq!(first.accepted, 2);
  assert_eq!(first.duplicates, 0);

  let second = ingest_events(&s, &cfg, "kyara", batch, Utc::now())
    .await
    .unwrap();
  assert_eq!(second.accepted, 0);
  assert_eq!(second.duplicates, 2);

  assert_eq!(s.count_events(candidate.candidate_id).await.unwrap(), 2);
}

#[tokio::test]
async fn ingest_unknown_candidate_fails_the_batch() {
  let s = store().await;
  let cfg = ScoringConfig::default();

  let err = ingest_events(
    &s,
    &cfg,
    "nobody",
    vec![submission("mention", 1.0, 1)],
    Utc::now(),
  )
  .await
  .unwrap_err();
  assert!(matches!(
    err,
    radar_core::ingest::IngestError::UnknownCandidate(_)
  ));
}

// ─── Score time series ───────────────────────────────────────────────────────

#[tokio::test]
async fn latest_momentum_returns_only_the_newest_run() {
  let s = store().await;
  let candidate = kyara(&s).await;
  let cfg = ScoringConfig::default();

  let earlier = Utc::now() - Duration::hours(2);
  let later = Utc::now() - Duration::hours(1);

  let old_run = radar_core::momentum::compute_momentum(
    &cfg,
    candidate.candidate_id,
    &[],
    earlier,
  );
  let new_run = radar_core::momentum::compute_momentum(
    &cfg,
    candidate.candidate_id,
    &[],
    later,
  );
  s.append_momentum(old_run).await.unwrap();
  s.append_momentum(new_run).await.unwrap();

  let latest = s.latest_momentum(candidate.candidate_id).await.unwrap();
  assert_eq!(latest.len(), SignalType::ALL.len());
  assert!(latest.iter().all(|m| m.computed_at == later));
}

#[tokio::test]
async fn composite_history_is_append_only_and_ordered() {
  let s = store().await;
  let candidate = kyara(&s).await;
  let cfg = ScoringConfig::default();

  for hours_ago in [3, 2, 1] {
    let as_of = Utc::now() - Duration::hours(hours_ago);
    run_scoring(&s, &cfg, &candidate, as_of, false)
      .await
      .unwrap();
  }

  let recent = s.recent_composites(candidate.candidate_id, 2).await.unwrap();
  assert_eq!(recent.len(), 2);
  assert!(recent[0].computed_at > recent[1].computed_at, "newest first");

  let history = s.score_history(candidate.candidate_id, 7).await.unwrap();
  assert_eq!(history.len(), 3);
  assert!(history[0].computed_at < history[2].computed_at, "oldest first");
}

// ─── Scoring pipeline ────────────────────────────────────────────────────────

#[tokio::test]
async fn run_scoring_is_deterministic_for_identical_event_state() {
  let s = store().await;
  let candidate = kyara(&s).await;
  let cfg = ScoringConfig::default();

  s.append_events(vec![
    event(candidate.candidate_id, SignalType::Mention, 10.0, 1),
    event(candidate.candidate_id, SignalType::Coverage, 50.0, 2),
  ])
  .await
  .unwrap();

  let as_of = Utc::now();
  let first = run_scoring(&s, &cfg, &candidate, as_of, false)
    .await
    .unwrap();
  let second = run_scoring(&s, &cfg, &candidate, as_of, false)
    .await
    .unwrap();

  assert_eq!(first.composite.to_bits(), second.composite.to_bits());
}

#[tokio::test]
async fn run_scoring_as_of_ignores_later_events() {
  let s = store().await;
  let candidate = kyara(&s).await;
  let cfg = ScoringConfig::default();

  let as_of = Utc::now() - Duration::days(2);
  s.append_events(vec![event(
    candidate.candidate_id,
    SignalType::Mention,
    10.0,
    5,
  )])
  .await
  .unwrap();

  let before = run_scoring(&s, &cfg, &candidate, as_of, false)
    .await
    .unwrap();

  // New signal arrives after the as-of point.
  s.append_events(vec![event(
    candidate.candidate_id,
    SignalType::Mention,
    100.0,
    1,
  )])
  .await
  .unwrap();

  let after = run_scoring(&s, &cfg, &candidate, as_of, false)
    .await
    .unwrap();
  assert_eq!(before.composite.to_bits(), after.composite.to_bits());
}

#[tokio::test]
async fn run_scoring_emits_momentum_row_for_every_signal_type() {
  let s = store().await;
  let candidate = kyara(&s).await;
  let cfg = ScoringConfig::default();

  s.append_events(vec![event(
    candidate.candidate_id,
    SignalType::Mention,
    10.0,
    1,
  )])
  .await
  .unwrap();

  run_scoring(&s, &cfg, &candidate, Utc::now(), false)
    .await
    .unwrap();

  let momentum = s.latest_momentum(candidate.candidate_id).await.unwrap();
  assert_eq!(momentum.len(), SignalType::ALL.len());

  let playlist = momentum
    .iter()
    .find(|m| m.signal_type == SignalType::PlaylistAdd)
    .expect("explicit zero row");
  assert_eq!(playlist.decayed_value, 0.0);
}

#[tokio::test]
async fn sparse_signals_flag_low_confidence() {
  let s = store().await;
  let candidate = kyara(&s).await;
  let cfg = ScoringConfig::default();

  s.append_events(vec![event(
    candidate.candidate_id,
    SignalType::Mention,
    5.0,
    1,
  )])
  .await
  .unwrap();

  let score = run_scoring(&s, &cfg, &candidate, Utc::now(), false)
    .await
    .unwrap();
  assert!(score.low_confidence);
}

// ─── Collections ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_collection_and_add_members_appends_positions() {
  let s = store().await;
  let a = kyara(&s).await;
  let b = s
    .add_candidate(NewCandidate {
      slug:       "mara".into(),
      name:       "Mara".into(),
      scene_tags: vec!["indie-pop".into()],
    })
    .await
    .unwrap();

  let shortlist = s
    .create_collection(CollectionKind::Shortlist, "june scouting".into(), "user-1".into())
    .await
    .unwrap();

  let first = s
    .add_member(shortlist.collection_id, a.candidate_id, None, None)
    .await
    .unwrap();
  let second = s
    .add_member(
      shortlist.collection_id,
      b.candidate_id,
      None,
      Some("saw her live".into()),
    )
    .await
    .unwrap();
  assert_eq!(first.position, 0);
  assert_eq!(second.position, 1);

  let view = s
    .get_collection(shortlist.collection_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(view.members.len(), 2);
  assert_eq!(view.members[0].candidate_id, a.candidate_id);
  assert_eq!(view.members[1].notes.as_deref(), Some("saw her live"));
}

#[tokio::test]
async fn add_member_twice_errors() {
  let s = store().await;
  let a = kyara(&s).await;
  let roster = s
    .create_collection(CollectionKind::Roster, "main".into(), "user-1".into())
    .await
    .unwrap();

  s.add_member(roster.collection_id, a.candidate_id, None, None)
    .await
    .unwrap();
  let err = s
    .add_member(roster.collection_id, a.candidate_id, None, None)
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::AlreadyMember { .. }));
}

#[tokio::test]
async fn move_member_swaps_positions() {
  let s = store().await;
  let a = kyara(&s).await;
  let b = s
    .add_candidate(NewCandidate {
      slug:       "mara".into(),
      name:       "Mara".into(),
      scene_tags: vec![],
    })
    .await
    .unwrap();
  let c = s
    .add_candidate(NewCandidate {
      slug:       "tove".into(),
      name:       "Tove".into(),
      scene_tags: vec![],
    })
    .await
    .unwrap();

  let shortlist = s
    .create_collection(CollectionKind::Shortlist, "ranked".into(), "user-1".into())
    .await
    .unwrap();
  for id in [a.candidate_id, b.candidate_id, c.candidate_id] {
    s.add_member(shortlist.collection_id, id, None, None)
      .await
      .unwrap();
  }

  // Move the last member to the top; the displaced member takes its slot.
  s.move_member(shortlist.collection_id, c.candidate_id, 0)
    .await
    .unwrap();

  let view = s
    .get_collection(shortlist.collection_id)
    .await
    .unwrap()
    .unwrap();
  let order: Vec<Uuid> =
    view.members.iter().map(|m| m.candidate_id).collect();
  assert_eq!(order, vec![c.candidate_id, b.candidate_id, a.candidate_id]);
}

#[tokio::test]
async fn remove_member_and_missing_member_errors() {
  let s = store().await;
  let a = kyara(&s).await;
  let watchlist = s
    .create_collection(CollectionKind::Watchlist, "watching".into(), "user-1".into())
    .await
    .unwrap();

  s.add_member(watchlist.collection_id, a.candidate_id, None, None)
    .await
    .unwrap();
  s.remove_member(watchlist.collection_id, a.candidate_id)
    .await
    .unwrap();

  let err = s
    .remove_member(watchlist.collection_id, a.candidate_id)
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::MemberNotFound { .. }));
}

#[tokio::test]
async fn list_collections_filters_by_owner_and_kind() {
  let s = store().await;
  s.create_collection(CollectionKind::Roster, "main".into(), "user-1".into())
    .await
    .unwrap();
  s.create_collection(CollectionKind::Watchlist, "watching".into(), "user-1".into())
    .await
    .unwrap();
  s.create_collection(CollectionKind::Roster, "other".into(), "user-2".into())
    .await
    .unwrap();

  let mine = s.list_collections(Some("user-1"), None).await.unwrap();
  assert_eq!(mine.len(), 2);

  let rosters = s
    .list_collections(Some("user-1"), Some(CollectionKind::Roster))
    .await
    .unwrap();
  assert_eq!(rosters.len(), 1);
  assert_eq!(rosters[0].name, "main");
}

// ─── Insights ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn generate_insights_for_watched_candidates() {
  let s = store().await;
  let candidate = kyara(&s).await;
  let cfg = ScoringConfig::default();

  let watchlist = s
    .create_collection(CollectionKind::Watchlist, "watching".into(), "user-1".into())
    .await
    .unwrap();
  s.add_member(watchlist.collection_id, candidate.candidate_id, None, None)
    .await
    .unwrap();

  // Two runs with very different event states: a clear surge.
  let earlier = Utc::now() - Duration::days(7);
  run_scoring(&s, &cfg, &candidate, earlier, false)
    .await
    .unwrap();
  s.append_events(vec![
    event(candidate.candidate_id, SignalType::Mention, 100.0, 1),
    event(candidate.candidate_id, SignalType::Coverage, 80.0, 1),
  ])
  .await
  .unwrap();
  run_scoring(&s, &cfg, &candidate, Utc::now(), false)
    .await
    .unwrap();

  let insights = generate_insights_for_user(&s, &cfg, "user-1", Utc::now())
    .await
    .unwrap();
  assert_eq!(insights.len(), 1);
  assert!(insights[0].narrative.contains("Kyara"));

  let listed = s.list_insights("user-1", 10).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].insight_id, insights[0].insight_id);
}

#[tokio::test]
async fn steady_scores_produce_no_insights() {
  let s = store().await;
  let candidate = kyara(&s).await;
  let cfg = ScoringConfig::default();

  let watchlist = s
    .create_collection(CollectionKind::Watchlist, "watching".into(), "user-1".into())
    .await
    .unwrap();
  s.add_member(watchlist.collection_id, candidate.candidate_id, None, None)
    .await
    .unwrap();

  // Two runs over the same events, hours apart: negligible drift.
  s.append_events(vec![event(
    candidate.candidate_id,
    SignalType::StreamDelta,
    40.0,
    10,
  )])
  .await
  .unwrap();
  run_scoring(&s, &cfg, &candidate, Utc::now() - Duration::hours(2), false)
    .await
    .unwrap();
  run_scoring(&s, &cfg, &candidate, Utc::now(), false)
    .await
    .unwrap();

  let insights = generate_insights_for_user(&s, &cfg, "user-1", Utc::now())
    .await
    .unwrap();
  assert!(insights.is_empty());
}
