//! End-to-end ranking run: search, recency pass, optional fallback pass,
//! deterministic ordering and warning aggregation.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use nudge_core::{Clock, RankedTarget, RankingRunResult};
use nudge_feed::FeedFetcher;
use nudge_search::{SearchClient, SearchError};
use tokio_util::sync::CancellationToken;

use crate::error::RankingError;
use crate::orchestrator::FetchOrchestrator;
use crate::scoring::ScoringEngine;

const FALLBACK_DIAGNOSTIC: &str =
    "No ranked results after local recency filtering; retrying without recency filter.";

/// Parameters of one ranking run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingRequest {
    pub keywords: Vec<String>,
    pub published_after_days: u32,
}

/// Wires search, feed retrieval and scoring into a single run.
pub struct RankingPipeline {
    search: Arc<dyn SearchClient>,
    orchestrator: FetchOrchestrator,
    clock: Arc<dyn Clock>,
}

impl RankingPipeline {
    #[must_use]
    pub fn new(
        search: Arc<dyn SearchClient>,
        fetcher: Arc<dyn FeedFetcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let engine = ScoringEngine::new(Arc::clone(&clock));
        Self {
            search,
            orchestrator: FetchOrchestrator::new(fetcher, engine),
            clock,
        }
    }

    #[must_use]
    pub fn with_display_episode_count(mut self, count: usize) -> Self {
        self.orchestrator = self.orchestrator.with_display_episode_count(count);
        self
    }

    /// Run the pipeline once.
    ///
    /// Search transport failures yield an empty result rather than an error.
    /// When `verbose` is set, the result carries diagnostics about the raw
    /// candidate count and whether the fallback pass ran.
    ///
    /// # Errors
    ///
    /// Returns [`RankingError::Cancelled`] if `cancel` fires during search or
    /// feed retrieval.
    pub async fn run(
        &self,
        request: &RankingRequest,
        verbose: bool,
        cancel: &CancellationToken,
    ) -> Result<RankingRunResult, RankingError> {
        let mut warnings: Vec<String> = Vec::new();
        let mut diagnostics: Vec<String> = Vec::new();

        let candidates = match self
            .search
            .search(&request.keywords, request.published_after_days, cancel)
            .await
        {
            Ok(candidates) => candidates,
            Err(SearchError::Cancelled) => return Err(RankingError::Cancelled),
            Err(e) => {
                tracing::warn!(error = %e, "podcast search failed; continuing with no candidates");
                Vec::new()
            }
        };
        tracing::info!(candidates = candidates.len(), "search complete");
        if verbose {
            diagnostics.push(format!(
                "Raw API shows before local filtering: {}",
                candidates.len()
            ));
        }

        let cutoff = recency_cutoff(self.clock.now(), request.published_after_days);
        let mut batch = self
            .orchestrator
            .rank_batch(&candidates, &request.keywords, cutoff, true, cancel)
            .await?;
        warnings.append(&mut batch.warnings);
        let mut ranked = batch.targets;

        if ranked.is_empty() {
            tracing::info!("no ranked results after recency filtering; retrying without it");
            if verbose {
                diagnostics.push(FALLBACK_DIAGNOSTIC.to_string());
            }
            let mut fallback = self
                .orchestrator
                .rank_batch(&candidates, &request.keywords, cutoff, false, cancel)
                .await?;
            warnings.append(&mut fallback.warnings);
            ranked = fallback.targets;
        }

        ranked.sort_by(compare_targets);
        tracing::info!(ranked = ranked.len(), warnings = warnings.len(), "ranking complete");

        Ok(RankingRunResult {
            results: ranked,
            warnings: finalize_warnings(warnings),
            diagnostics,
        })
    }
}

/// `now` minus the window. A window reaching past the representable range
/// means no cutoff.
fn recency_cutoff(now: DateTime<Utc>, published_after_days: u32) -> DateTime<Utc> {
    TimeDelta::try_days(i64::from(published_after_days))
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Score desc, niche fit desc, newest episode desc (undated last), name
/// case-insensitive asc, id ordinal asc.
fn compare_targets(a: &RankedTarget, b: &RankedTarget) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.niche_fit.total_cmp(&a.niche_fit))
        .then_with(|| b.newest_episode_published_at.cmp(&a.newest_episode_published_at))
        .then_with(|| a.show_name.to_lowercase().cmp(&b.show_name.to_lowercase()))
        .then_with(|| a.show_id.cmp(&b.show_id))
}

/// Ordinal de-duplication, then a case-insensitive sort with ordinal order
/// breaking ties.
fn finalize_warnings(mut warnings: Vec<String>) -> Vec<String> {
    warnings.sort();
    warnings.dedup();
    warnings.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
    warnings
}

/// The first `top` results, in ranked order.
#[must_use]
pub fn select_top(results: &[RankedTarget], top: usize) -> Vec<RankedTarget> {
    results.iter().take(top).cloned().collect()
}
