//! Per-candidate pipeline orchestration: read events, derive momentum,
//! append a composite run.
//!
//! Steps within one candidate's run are strictly sequential — momentum
//! reads what ingestion wrote, scoring reads what momentum wrote. Fanning
//! out across candidates is the server's job, not this module's.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeSet;

use crate::{
  candidate::Candidate,
  config::ScoringConfig,
  insight::{Insight, derive_insight},
  momentum::compute_momentum,
  score::CompositeScore,
  scoring::build_composite,
  store::RadarStore,
};

/// Run momentum + composite scoring for one candidate as of `as_of`,
/// appending one momentum row per signal type and one composite row.
///
/// `degraded` marks that a context adapter failed during the run's pull
/// phase; the score is still computed and persisted, flagged
/// `low_confidence`. Nothing is persisted until the whole run's inputs are
/// in hand, so a cancelled batch never leaves a half-computed score.
pub async fn run_scoring<S: RadarStore>(
  store: &S,
  cfg: &ScoringConfig,
  candidate: &Candidate,
  as_of: DateTime<Utc>,
  degraded: bool,
) -> Result<CompositeScore, S::Error> {
  let window_start = as_of - Duration::days(i64::from(cfg.lookback_days));
  let events = store
    .events_for_candidate(candidate.candidate_id, None, window_start, as_of)
    .await?;

  let momenta = compute_momentum(cfg, candidate.candidate_id, &events, as_of);

  // Prior runs feed the breakout (second-derivative) estimate.
  let prior = store.recent_composites(candidate.candidate_id, 2).await?;

  let composite = build_composite(
    cfg,
    candidate.candidate_id,
    &momenta,
    &prior,
    as_of,
    degraded,
  );

  store.append_momentum(momenta).await?;
  store.append_composite(composite.clone()).await?;

  tracing::info!(
    slug = %candidate.slug,
    composite = composite.composite,
    breakout = composite.breakout_probability,
    low_confidence = composite.low_confidence,
    "scored candidate"
  );

  Ok(composite)
}

/// Regenerate insights for every candidate in the owner's collections,
/// from each candidate's two most recent composite snapshots. Candidates
/// with fewer than two snapshots have no delta and are skipped; so are
/// movements below the suppression threshold.
pub async fn generate_insights_for_user<S: RadarStore>(
  store: &S,
  cfg: &ScoringConfig,
  owner: &str,
  now: DateTime<Utc>,
) -> Result<Vec<Insight>, S::Error> {
  let collections = store.list_collections(Some(owner), None).await?;

  let mut candidate_ids = BTreeSet::new();
  for collection in &collections {
    if let Some(view) = store.get_collection(collection.collection_id).await? {
      for member in view.members {
        candidate_ids.insert(member.candidate_id);
      }
    }
  }

  let mut insights = Vec::new();
  for candidate_id in candidate_ids {
    let snapshots = store.recent_composites(candidate_id, 2).await?;
    let [later, earlier] = snapshots.as_slice() else {
      continue;
    };
    let Some(candidate) = store.get_candidate(candidate_id).await? else {
      continue;
    };

    if let Some(insight) =
      derive_insight(cfg, &candidate, owner, earlier, later, now)
    {
      store.append_insight(insight.clone()).await?;
      insights.push(insight);
    }
  }

  tracing::debug!(owner, count = insights.len(), "regenerated insights");
  Ok(insights)
}
