//! Roster analysis — fit assessment, gap analysis, and collaboration
//! pairing.
//!
//! All functions here are pure; callers assemble the profiles from the
//! store. Ordering of returned dimensions is deterministic (BTree-backed)
//! so identical inputs render identically.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

// ─── Roster fit ──────────────────────────────────────────────────────────────

/// What the fit assessment needs to know about one existing roster member.
#[derive(Debug, Clone)]
pub struct RosterMemberProfile {
  pub scene_tags: Vec<String>,
  /// Latest composite score, if the member has ever been scored.
  pub composite:  Option<f64>,
}

/// A scene tag the candidate shares with existing members.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TagOverlap {
  pub tag:     String,
  /// How many existing members carry the tag.
  pub members: usize,
}

/// How well a candidate complements a roster, with the specific dimensions
/// of alignment and misalignment.
#[derive(Debug, Clone, Serialize)]
pub struct RosterFit {
  /// Overall fit in `[0, 1]`; 0.5 is the neutral value for an empty roster.
  pub fit_score:        f64,
  /// Candidate tags no existing member carries — the gaps this signing
  /// would fill.
  pub gaps_filled:      Vec<String>,
  /// Candidate tags already represented, with member counts.
  pub overlaps:         Vec<TagOverlap>,
  /// Share of scored members the candidate's composite meets or beats.
  /// `None` when nothing is scored on either side.
  pub score_percentile: Option<f64>,
}

const FIT_NOVELTY_WEIGHT: f64 = 0.6;
const FIT_SCORE_WEIGHT: f64 = 0.4;

/// Compare a candidate's tags and composite score against a roster's
/// aggregate profile.
///
/// An empty roster is a defined neutral result — fit 0.5, no dimensions —
/// never an error and never NaN.
pub fn assess_roster_fit(
  candidate_tags: &[String],
  candidate_score: Option<f64>,
  roster: &[RosterMemberProfile],
) -> RosterFit {
  if roster.is_empty() {
    return RosterFit {
      fit_score:        0.5,
      gaps_filled:      Vec::new(),
      overlaps:         Vec::new(),
      score_percentile: None,
    };
  }

  let mut tag_counts: BTreeMap<&str, usize> = BTreeMap::new();
  for member in roster {
    for tag in &member.scene_tags {
      *tag_counts.entry(tag.as_str()).or_default() += 1;
    }
  }

  let candidate_set: BTreeSet<&str> =
    candidate_tags.iter().map(String::as_str).collect();

  let mut gaps_filled = Vec::new();
  let mut overlaps = Vec::new();
  for tag in &candidate_set {
    match tag_counts.get(tag) {
      Some(&members) => overlaps.push(TagOverlap {
        tag: (*tag).to_owned(),
        members,
      }),
      None => gaps_filled.push((*tag).to_owned()),
    }
  }

  let novelty = if candidate_set.is_empty() {
    0.0
  } else {
    gaps_filled.len() as f64 / candidate_set.len() as f64
  };

  let scored: Vec<f64> =
    roster.iter().filter_map(|m| m.composite).collect();
  let score_percentile = match (candidate_score, scored.is_empty()) {
    (Some(score), false) => {
      let at_or_below =
        scored.iter().filter(|&&s| s <= score).count();
      Some(at_or_below as f64 / scored.len() as f64)
    }
    _ => None,
  };

  let fit_score = FIT_NOVELTY_WEIGHT * novelty
    + FIT_SCORE_WEIGHT * score_percentile.unwrap_or(0.5);

  RosterFit {
    fit_score,
    gaps_filled,
    overlaps,
    score_percentile,
  }
}

// ─── Gap analysis ────────────────────────────────────────────────────────────

/// A scene/genre category the roster underrepresents relative to the
/// reference distribution.
#[derive(Debug, Clone, Serialize)]
pub struct RosterGap {
  pub tag:             String,
  /// Share of tag occurrences in the reference population.
  pub reference_share: f64,
  /// Share of tag occurrences within the roster.
  pub roster_share:    f64,
  /// `reference_share - roster_share`; always positive in the output.
  pub gap:             f64,
}

fn tag_shares(tag_lists: &[Vec<String>]) -> BTreeMap<&str, f64> {
  let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
  let mut total = 0usize;
  for tags in tag_lists {
    for tag in tags {
      *counts.entry(tag.as_str()).or_default() += 1;
      total += 1;
    }
  }
  counts
    .into_iter()
    .map(|(tag, count)| (tag, count as f64 / total.max(1) as f64))
    .collect()
}

/// Rank the scene categories a roster underrepresents, against a reference
/// population (typically the full candidate catalog).
pub fn compute_roster_gaps(
  roster_tag_lists: &[Vec<String>],
  reference_tag_lists: &[Vec<String>],
) -> Vec<RosterGap> {
  let roster_shares = tag_shares(roster_tag_lists);
  let reference_shares = tag_shares(reference_tag_lists);

  let mut gaps: Vec<RosterGap> = reference_shares
    .iter()
    .filter_map(|(&tag, &reference_share)| {
      let roster_share = roster_shares.get(tag).copied().unwrap_or(0.0);
      let gap = reference_share - roster_share;
      (gap > 0.0).then(|| RosterGap {
        tag: tag.to_owned(),
        reference_share,
        roster_share,
        gap,
      })
    })
    .collect();

  gaps.sort_by(|a, b| {
    b.gap
      .partial_cmp(&a.gap)
      .unwrap_or(std::cmp::Ordering::Equal)
      .then_with(|| a.tag.cmp(&b.tag))
  });
  gaps
}

// ─── Collaboration pairing ───────────────────────────────────────────────────

/// What the pairing functions need to know about one artist.
#[derive(Debug, Clone)]
pub struct CollabProfile {
  pub slug:          String,
  pub name:          String,
  pub scene_tags:    Vec<String>,
  /// Recent composite scores, oldest first.
  pub score_history: Vec<f64>,
}

/// A suggested pairing, ranked by compatibility.
#[derive(Debug, Clone, Serialize)]
pub struct CollabSuggestion {
  pub a:                  String,
  pub b:                  String,
  pub compatibility:      f64,
  pub shared_tags:        Vec<String>,
  /// Tags one side brings that the other lacks.
  pub complementary_tags: Vec<String>,
}

/// Points of score history considered when squashing a trajectory.
const TRAJECTORY_POINTS: usize = 5;

/// Mean slope over the most recent history points, squashed to `(-1, 1)`.
fn trajectory(history: &[f64]) -> f64 {
  let recent = &history[history.len().saturating_sub(TRAJECTORY_POINTS)..];
  if recent.len() < 2 {
    return 0.0;
  }
  let slope: f64 = recent
    .windows(2)
    .map(|w| w[1] - w[0])
    .sum::<f64>()
    / (recent.len() - 1) as f64;
  slope.tanh()
}

/// Pair compatibility: tag complementarity × trajectory agreement.
///
/// Identical tag sets score zero on complementarity (nothing new in the
/// pairing), as do two artists with no tags at all.
fn pair_compatibility(a: &CollabProfile, b: &CollabProfile) -> f64 {
  let tags_a: BTreeSet<&str> = a.scene_tags.iter().map(String::as_str).collect();
  let tags_b: BTreeSet<&str> = b.scene_tags.iter().map(String::as_str).collect();

  let union = tags_a.union(&tags_b).count();
  if union == 0 {
    return 0.0;
  }
  let shared = tags_a.intersection(&tags_b).count();
  let jaccard = shared as f64 / union as f64;
  let complement = 1.0 - jaccard;

  let traj_agreement =
    1.0 - (trajectory(&a.score_history) - trajectory(&b.score_history)).abs() / 2.0;

  complement * traj_agreement
}

fn suggestion(a: &CollabProfile, b: &CollabProfile) -> CollabSuggestion {
  let tags_a: BTreeSet<&str> = a.scene_tags.iter().map(String::as_str).collect();
  let tags_b: BTreeSet<&str> = b.scene_tags.iter().map(String::as_str).collect();

  CollabSuggestion {
    a: a.slug.clone(),
    b: b.slug.clone(),
    compatibility: pair_compatibility(a, b),
    shared_tags: tags_a
      .intersection(&tags_b)
      .map(|t| (*t).to_owned())
      .collect(),
    complementary_tags: tags_a
      .symmetric_difference(&tags_b)
      .map(|t| (*t).to_owned())
      .collect(),
  }
}

fn rank_and_cap(
  mut suggestions: Vec<CollabSuggestion>,
  min_compatibility: f64,
  limit: usize,
) -> Vec<CollabSuggestion> {
  suggestions.retain(|s| s.compatibility >= min_compatibility);
  suggestions.sort_by(|x, y| {
    y.compatibility
      .partial_cmp(&x.compatibility)
      .unwrap_or(std::cmp::Ordering::Equal)
      .then_with(|| (x.a.as_str(), x.b.as_str()).cmp(&(y.a.as_str(), y.b.as_str())))
  });
  suggestions.truncate(limit);
  suggestions
}

/// All sufficiently compatible pairings within one roster.
pub fn suggest_collabs_within_roster(
  members: &[CollabProfile],
  min_compatibility: f64,
  limit: usize,
) -> Vec<CollabSuggestion> {
  let mut suggestions = Vec::new();
  for (i, a) in members.iter().enumerate() {
    for b in &members[i + 1..] {
      suggestions.push(suggestion(a, b));
    }
  }
  rank_and_cap(suggestions, min_compatibility, limit)
}

/// Compatible partners for one artist drawn from an external pool.
pub fn suggest_external_collabs(
  artist: &CollabProfile,
  pool: &[CollabProfile],
  min_compatibility: f64,
  limit: usize,
) -> Vec<CollabSuggestion> {
  let suggestions = pool
    .iter()
    .filter(|p| p.slug != artist.slug)
    .map(|p| suggestion(artist, p))
    .collect();
  rank_and_cap(suggestions, min_compatibility, limit)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn member(tags: &[&str], composite: Option<f64>) -> RosterMemberProfile {
    RosterMemberProfile {
      scene_tags: tags.iter().map(|t| (*t).to_owned()).collect(),
      composite,
    }
  }

  fn profile(slug: &str, tags: &[&str], history: &[f64]) -> CollabProfile {
    CollabProfile {
      slug:          slug.to_owned(),
      name:          slug.to_owned(),
      scene_tags:    tags.iter().map(|t| (*t).to_owned()).collect(),
      score_history: history.to_vec(),
    }
  }

  // ── Fit ───────────────────────────────────────────────────────────────────

  #[test]
  fn empty_roster_returns_defined_neutral_result() {
    let fit = assess_roster_fit(&["electronic".into()], Some(0.8), &[]);
    assert_eq!(fit.fit_score, 0.5);
    assert!(fit.gaps_filled.is_empty());
    assert!(fit.overlaps.is_empty());
    assert!(fit.score_percentile.is_none());
    assert!(!fit.fit_score.is_nan());
  }

  #[test]
  fn novel_tags_surface_as_gaps_filled() {
    let roster = vec![
      member(&["indie-pop"], Some(10.0)),
      member(&["indie-pop", "folk"], Some(12.0)),
    ];
    let fit = assess_roster_fit(
      &["electronic".into(), "indie-pop".into()],
      Some(15.0),
      &roster,
    );

    assert_eq!(fit.gaps_filled, vec!["electronic".to_owned()]);
    assert_eq!(fit.overlaps, vec![TagOverlap {
      tag:     "indie-pop".to_owned(),
      members: 2,
    }]);
    // Beats both scored members.
    assert_eq!(fit.score_percentile, Some(1.0));
  }

  #[test]
  fn unscored_roster_gives_no_percentile_but_still_fits() {
    let roster = vec![member(&["jazz"], None)];
    let fit = assess_roster_fit(&["electronic".into()], Some(5.0), &roster);
    assert!(fit.score_percentile.is_none());
    assert!(fit.fit_score > 0.5, "pure novelty: {}", fit.fit_score);
  }

  // ── Gaps ──────────────────────────────────────────────────────────────────

  #[test]
  fn gaps_are_ranked_by_underrepresentation() {
    let roster = vec![vec!["indie-pop".to_owned()]];
    let reference = vec![
      vec!["electronic".to_owned()],
      vec!["electronic".to_owned()],
      vec!["jazz".to_owned()],
      vec!["indie-pop".to_owned()],
    ];

    let gaps = compute_roster_gaps(&roster, &reference);
    assert_eq!(gaps[0].tag, "electronic");
    assert!(gaps[0].gap > gaps[1].gap);
    assert!(gaps.iter().all(|g| g.gap > 0.0));
    // Over-represented roster tags never show up as gaps.
    assert!(gaps.iter().all(|g| g.tag != "indie-pop"));
  }

  #[test]
  fn empty_roster_gaps_mirror_the_reference() {
    let reference = vec![vec!["jazz".to_owned()], vec!["folk".to_owned()]];
    let gaps = compute_roster_gaps(&[], &reference);
    assert_eq!(gaps.len(), 2);
  }

  // ── Collabs ───────────────────────────────────────────────────────────────

  #[test]
  fn identical_tag_sets_are_not_complementary() {
    let a = profile("a", &["techno"], &[1.0, 2.0]);
    let b = profile("b", &["techno"], &[1.0, 2.0]);
    let out = suggest_collabs_within_roster(&[a, b], 0.0, 10);
    assert_eq!(out[0].compatibility, 0.0);
  }

  #[test]
  fn complementary_tags_with_aligned_trajectories_rank_first() {
    let rising_a = profile("a", &["techno"], &[1.0, 2.0, 3.0]);
    let rising_b = profile("b", &["ambient"], &[0.5, 1.5, 2.5]);
    let falling = profile("c", &["drill"], &[3.0, 2.0, 1.0]);

    let out =
      suggest_collabs_within_roster(&[rising_a, rising_b, falling], 0.0, 10);
    assert_eq!((out[0].a.as_str(), out[0].b.as_str()), ("a", "b"));
    assert!(out[0].compatibility > out[1].compatibility);
  }

  #[test]
  fn threshold_and_cap_are_applied() {
    let a = profile("a", &["techno"], &[1.0, 2.0]);
    let b = profile("b", &["ambient"], &[1.0, 2.0]);
    let c = profile("c", &["techno"], &[1.0, 2.0]);

    let all = suggest_collabs_within_roster(
      &[a.clone(), b.clone(), c.clone()],
      0.0,
      10,
    );
    assert_eq!(all.len(), 3);

    let capped = suggest_collabs_within_roster(&[a.clone(), b.clone(), c.clone()], 0.0, 1);
    assert_eq!(capped.len(), 1);

    let strict = suggest_collabs_within_roster(&[a, b, c], 0.99, 10);
    assert!(strict.len() < 3);
  }

  #[test]
  fn external_pool_excludes_the_artist_itself() {
    let artist = profile("a", &["techno"], &[1.0, 2.0]);
    let pool = vec![
      profile("a", &["techno"], &[1.0, 2.0]),
      profile("b", &["ambient"], &[1.0, 2.0]),
    ];
    let out = suggest_external_collabs(&artist, &pool, 0.0, 10);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].b, "b");
  }
}
