//! Bounded-concurrency fetch, parse and score over one batch of candidates.
//!
//! Each candidate is processed independently and yields a [`CandidateOutcome`].
//! Outcomes are folded on the caller after the stream drains, so a failing
//! feed never aborts its siblings. Only cancellation ends a batch early.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use nudge_core::{Candidate, ContactMethod, Episode, RankedTarget, ShowProfile};
use nudge_feed::{parse_feed, FeedFetcher, ParseOutcome};
use tokio_util::sync::CancellationToken;

use crate::error::RankingError;
use crate::language::detect_language;
use crate::priority::classify_outreach_priority;
use crate::scoring::ScoringEngine;

/// Candidates processed concurrently.
pub const FETCH_CONCURRENCY: usize = 5;

/// Subtracted from the combined score of shows without a contact address.
pub const MISSING_CONTACT_PENALTY: f64 = 0.03;

const MISSING_CONTACT_SAMPLE: usize = 3;
const DEFAULT_DISPLAY_EPISODE_COUNT: usize = 3;

/// Result of processing one candidate.
enum CandidateOutcome {
    Ranked {
        target: Box<RankedTarget>,
        missing_contact: bool,
    },
    /// Parsed but not rankable: wrong language or no episodes.
    Filtered,
    /// Fetch or parse failure, carrying its user-facing warning.
    Failed(String),
}

/// Targets and warnings produced by one batch.
#[derive(Debug, Default)]
pub struct BatchOutput {
    /// Unordered; the pipeline sorts.
    pub targets: Vec<RankedTarget>,
    pub warnings: Vec<String>,
}

/// Fetches, parses and scores candidates with at most [`FETCH_CONCURRENCY`]
/// in flight.
#[derive(Clone)]
pub struct FetchOrchestrator {
    fetcher: Arc<dyn FeedFetcher>,
    engine: ScoringEngine,
    display_episode_count: usize,
}

impl FetchOrchestrator {
    #[must_use]
    pub fn new(fetcher: Arc<dyn FeedFetcher>, engine: ScoringEngine) -> Self {
        Self {
            fetcher,
            engine,
            display_episode_count: DEFAULT_DISPLAY_EPISODE_COUNT,
        }
    }

    /// Cap on `recent_episode_titles` in each target.
    #[must_use]
    pub fn with_display_episode_count(mut self, count: usize) -> Self {
        self.display_episode_count = count;
        self
    }

    /// Process every candidate once.
    ///
    /// With `apply_recency_filter`, only episodes published at or after
    /// `cutoff` are scored; a feed whose episodes are all older is scored on
    /// its full episode list instead of being dropped.
    ///
    /// # Errors
    ///
    /// Returns [`RankingError::Cancelled`] if `cancel` fires while a feed is
    /// being fetched.
    pub async fn rank_batch(
        &self,
        candidates: &[Candidate],
        keywords: &[String],
        cutoff: DateTime<Utc>,
        apply_recency_filter: bool,
        cancel: &CancellationToken,
    ) -> Result<BatchOutput, RankingError> {
        let outcomes: Vec<CandidateOutcome> = stream::iter(candidates)
            .map(|candidate| {
                self.process_candidate(candidate, keywords, cutoff, apply_recency_filter, cancel)
            })
            .buffer_unordered(FETCH_CONCURRENCY)
            .try_collect()
            .await?;

        let mut output = BatchOutput::default();
        let mut missing_contact_names: Vec<String> = Vec::new();
        for outcome in outcomes {
            match outcome {
                CandidateOutcome::Ranked {
                    target,
                    missing_contact,
                } => {
                    if missing_contact {
                        missing_contact_names.push(target.show_name.clone());
                    }
                    output.targets.push(*target);
                }
                CandidateOutcome::Filtered => {}
                CandidateOutcome::Failed(warning) => output.warnings.push(warning),
            }
        }

        if let Some(summary) = missing_contact_summary(&missing_contact_names) {
            output.warnings.push(summary);
        }

        tracing::debug!(
            candidates = candidates.len(),
            ranked = output.targets.len(),
            warnings = output.warnings.len(),
            apply_recency_filter,
            "batch ranked"
        );
        Ok(output)
    }

    async fn process_candidate(
        &self,
        candidate: &Candidate,
        keywords: &[String],
        cutoff: DateTime<Utc>,
        apply_recency_filter: bool,
        cancel: &CancellationToken,
    ) -> Result<CandidateOutcome, RankingError> {
        if cancel.is_cancelled() {
            return Err(RankingError::Cancelled);
        }

        let xml = match self.fetcher.fetch(&candidate.feed_url, cancel).await {
            Ok(xml) => xml,
            Err(e) if e.is_cancelled() => return Err(RankingError::Cancelled),
            Err(e) => {
                tracing::warn!(
                    show = %candidate.name,
                    feed_url = %candidate.feed_url,
                    error = %e,
                    "feed fetch failed"
                );
                return Ok(CandidateOutcome::Failed(skipped_warning(
                    &candidate.name,
                    &e.failure_reason(),
                )));
            }
        };

        let payload = match parse_feed(&xml) {
            ParseOutcome::Parsed { payload, issues } => {
                for issue in &issues {
                    tracing::debug!(show = %candidate.name, code = issue.code, "{}", issue.message);
                }
                payload
            }
            ParseOutcome::Failed(issue) => {
                tracing::warn!(show = %candidate.name, code = issue.code, "{}", issue.message);
                return Ok(CandidateOutcome::Failed(skipped_warning(
                    &candidate.name,
                    &format!("feed parse failed ({})", issue.code),
                )));
            }
        };

        let declared = candidate
            .language
            .as_deref()
            .filter(|l| !l.trim().is_empty())
            .or(payload.language.as_deref());
        let language = detect_language(declared, &candidate.name, &candidate.description);
        let Some(language_code) = language.accepted_code() else {
            tracing::debug!(show = %candidate.name, ?language, "language not accepted");
            return Ok(CandidateOutcome::Filtered);
        };

        let episodes = eligible_episodes(payload.episodes, cutoff, apply_recency_filter);
        if episodes.is_empty() {
            tracing::debug!(show = %candidate.name, "feed has no episodes");
            return Ok(CandidateOutcome::Filtered);
        }

        let contact_email = payload
            .contact_email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        let missing_contact = contact_email.is_none();

        let show = ShowProfile {
            id: candidate.id.clone(),
            name: candidate.name.clone(),
            description: candidate.description.clone(),
            feed_url: candidate.feed_url.clone(),
            estimated_reach: candidate.estimated_reach,
            contact_method: if missing_contact {
                ContactMethod::None
            } else {
                ContactMethod::Email
            },
            contact_value: contact_email,
            episodes,
        };

        let intent = self.engine.score(&show, keywords);
        let score = if missing_contact {
            (intent.score - MISSING_CONTACT_PENALTY).max(0.0)
        } else {
            intent.score
        };
        let outreach_priority = classify_outreach_priority(
            score,
            intent.activity_score,
            intent.frequency,
            intent.niche_fit,
            !missing_contact,
        );

        let target = RankedTarget {
            show_id: show.id,
            show_name: show.name,
            detected_language: language_code.to_string(),
            feed_url: show.feed_url,
            contact_email: show.contact_value,
            reach: intent.reach,
            frequency: intent.frequency,
            niche_fit: intent.niche_fit,
            activity_score: intent.activity_score,
            niche_fit_breakdown: intent.niche_fit_breakdown,
            outreach_priority,
            score,
            newest_episode_published_at: intent.newest_episode_published_at,
            recent_episode_titles: show
                .episodes
                .iter()
                .take(self.display_episode_count)
                .map(|e| e.title.clone())
                .collect(),
        };

        Ok(CandidateOutcome::Ranked {
            target: Box::new(target),
            missing_contact,
        })
    }
}

/// Episodes eligible for scoring.
///
/// The recency filter keeps dated episodes at or after `cutoff`. If that
/// leaves nothing, the full list is used so stale shows are penalized by
/// scoring rather than dropped. An empty input stays empty.
fn eligible_episodes(
    episodes: Vec<Episode>,
    cutoff: DateTime<Utc>,
    apply_recency_filter: bool,
) -> Vec<Episode> {
    if !apply_recency_filter {
        return episodes;
    }
    let recent: Vec<Episode> = episodes
        .iter()
        .filter(|e| e.published_at.is_some_and(|at| at >= cutoff))
        .cloned()
        .collect();
    if recent.is_empty() {
        episodes
    } else {
        recent
    }
}

fn skipped_warning(show_name: &str, reason: &str) -> String {
    format!("Skipped '{show_name}' feed after retry ({reason}).")
}

/// One warning naming up to three penalized shows.
///
/// Names are de-duplicated and sorted case-insensitively; the ordinal order
/// decides which spelling of a duplicate survives.
fn missing_contact_summary(names: &[String]) -> Option<String> {
    if names.is_empty() {
        return None;
    }

    let mut sorted: Vec<&String> = names.iter().collect();
    sorted.sort_by(|a, b| {
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b))
    });
    sorted.dedup_by(|a, b| a.to_lowercase() == b.to_lowercase());

    let total = sorted.len();
    let sample = sorted
        .iter()
        .take(MISSING_CONTACT_SAMPLE)
        .map(|name| format!("'{name}'"))
        .collect::<Vec<_>>()
        .join(", ");
    let remainder = total.saturating_sub(MISSING_CONTACT_SAMPLE);
    let suffix = if remainder > 0 {
        format!(" (+{remainder} more).")
    } else {
        ".".to_string()
    };

    Some(format!(
        "Missing contact email penalty applied to {total} show(s): {sample}{suffix}"
    ))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn summary_none_when_nobody_penalized() {
        assert_eq!(missing_contact_summary(&[]), None);
    }

    #[test]
    fn summary_lists_all_when_three_or_fewer() {
        assert_eq!(
            missing_contact_summary(&names(&["beta", "Alpha"])).as_deref(),
            Some("Missing contact email penalty applied to 2 show(s): 'Alpha', 'beta'.")
        );
    }

    #[test]
    fn summary_dedups_case_insensitively_and_counts_remainder() {
        assert_eq!(
            missing_contact_summary(&names(&["Delta", "alpha", "ALPHA", "charlie", "Bravo", "echo"]))
                .as_deref(),
            Some(
                "Missing contact email penalty applied to 5 show(s): 'ALPHA', 'Bravo', 'charlie' (+2 more)."
            )
        );
    }

    #[test]
    fn skipped_warning_format() {
        assert_eq!(
            skipped_warning("Lab", "HTTP 404"),
            "Skipped 'Lab' feed after retry (HTTP 404)."
        );
    }

    fn cutoff() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn recency_filter_keeps_recent_episodes() {
        let episodes = vec![
            Episode::new("new", "", Some(cutoff() + Duration::days(3))),
            Episode::new("edge", "", Some(cutoff())),
            Episode::new("old", "", Some(cutoff() - Duration::days(3))),
            Episode::new("undated", "", None),
        ];
        let kept: Vec<String> = eligible_episodes(episodes, cutoff(), true)
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(kept, vec!["new", "edge"]);
    }

    #[test]
    fn recency_filter_readmits_stale_feed() {
        let episodes = vec![
            Episode::new("old", "", Some(cutoff() - Duration::days(90))),
            Episode::new("undated", "", None),
        ];
        assert_eq!(eligible_episodes(episodes, cutoff(), true).len(), 2);
    }

    #[test]
    fn empty_feed_stays_empty() {
        assert!(eligible_episodes(Vec::new(), cutoff(), true).is_empty());
        assert!(eligible_episodes(Vec::new(), cutoff(), false).is_empty());
    }
}
