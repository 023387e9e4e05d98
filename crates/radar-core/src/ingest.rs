//! Batch event ingestion: validate per item, append, report.
//!
//! Invalid items are rejected individually — a batch of 500 where 3 fail
//! validation still ingests 497. The only whole-batch failure is an unknown
//! candidate, which is a referential-integrity violation, not a data issue.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{
  config::ScoringConfig,
  event::{EventSubmission, IngestItemError, IngestReport, SignalEvent, SignalType},
  store::{AppendOutcome, RadarStore},
};

/// A whole-batch ingestion failure.
#[derive(Debug, Error)]
pub enum IngestError<E> {
  #[error("candidate not found: {0}")]
  UnknownCandidate(String),

  #[error("store error: {0}")]
  Store(#[source] E),
}

/// Validate one submitted item, or explain why it is rejected.
fn validate(
  item: &EventSubmission,
  now: DateTime<Utc>,
  clock_skew_secs: i64,
) -> Result<SignalType, String> {
  let signal_type = SignalType::from_discriminant(&item.signal_type)
    .map_err(|_| format!("unknown signal type: {:?}", item.signal_type))?;

  if !item.value.is_finite() {
    return Err("non-finite value".to_owned());
  }
  if item.value < 0.0 {
    return Err("negative value".to_owned());
  }
  if item.occurred_at > now + Duration::seconds(clock_skew_secs) {
    return Err("occurred_at is in the future".to_owned());
  }

  Ok(signal_type)
}

/// Ingest a batch of submitted events for the candidate named by `slug`.
///
/// Valid items are appended with natural-key dedup; re-ingesting an
/// identical batch is a no-op reported through `duplicates`. The report
/// itemises every rejection by batch index.
pub async fn ingest_events<S: RadarStore>(
  store: &S,
  cfg: &ScoringConfig,
  slug: &str,
  batch: Vec<EventSubmission>,
  now: DateTime<Utc>,
) -> Result<IngestReport, IngestError<S::Error>> {
  let candidate = store
    .get_candidate_by_slug(slug)
    .await
    .map_err(IngestError::Store)?
    .ok_or_else(|| IngestError::UnknownCandidate(slug.to_owned()))?;

  let mut report = IngestReport::default();
  let mut valid = Vec::with_capacity(batch.len());

  for (index, item) in batch.iter().enumerate() {
    match validate(item, now, cfg.clock_skew_secs) {
      Ok(signal_type) => valid.push(SignalEvent {
        event_id: Uuid::new_v4(),
        candidate_id: candidate.candidate_id,
        signal_type,
        value: item.value,
        source: item.source.clone(),
        occurred_at: item.occurred_at,
        ingested_at: now,
      }),
      Err(reason) => {
        report.rejected += 1;
        report.errors.push(IngestItemError { index, reason });
      }
    }
  }

  let outcomes = store
    .append_events(valid)
    .await
    .map_err(IngestError::Store)?;

  for outcome in outcomes {
    match outcome {
      AppendOutcome::Inserted => report.accepted += 1,
      AppendOutcome::Duplicate => report.duplicates += 1,
    }
  }

  tracing::debug!(
    slug,
    accepted = report.accepted,
    rejected = report.rejected,
    duplicates = report.duplicates,
    "ingested event batch"
  );

  Ok(report)
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
  }

  fn submission(signal_type: &str, value: f64) -> EventSubmission {
    EventSubmission {
      signal_type: signal_type.to_owned(),
      value,
      source:      "test".to_owned(),
      occurred_at: now() - Duration::hours(1),
    }
  }

  #[test]
  fn unknown_type_is_rejected_with_reason() {
    let err = validate(&submission("vibes", 1.0), now(), 300).unwrap_err();
    assert!(err.contains("unknown signal type"), "{err}");
  }

  #[test]
  fn negative_value_is_rejected() {
    let err = validate(&submission("mention", -1.0), now(), 300).unwrap_err();
    assert_eq!(err, "negative value");
  }

  #[test]
  fn future_timestamp_beyond_skew_is_rejected() {
    let mut item = submission("mention", 1.0);
    item.occurred_at = now() + Duration::seconds(301);
    let err = validate(&item, now(), 300).unwrap_err();
    assert!(err.contains("future"), "{err}");
  }

  #[test]
  fn future_timestamp_within_skew_is_accepted() {
    let mut item = submission("mention", 1.0);
    item.occurred_at = now() + Duration::seconds(299);
    assert!(validate(&item, now(), 300).is_ok());
  }

  #[test]
  fn zero_value_is_accepted() {
    assert!(validate(&submission("coverage", 0.0), now(), 300).is_ok());
  }
}
