//! Outreach intent scoring.
//!
//! `score = (reach * 0.35 + frequency * 0.25 + niche_fit * 0.40) * activity`,
//! every sub-score in `[0, 1]`. Time-relative parts read "now" from the
//! injected [`Clock`].

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Utc};
use nudge_core::{
    Clock, ContactMethod, Episode, IntentScore, NicheFitBreakdown, NicheFitTokenHit, ShowProfile,
};
use regex::Regex;

const REACH_WEIGHT: f64 = 0.35;
const FREQUENCY_WEIGHT: f64 = 0.25;
const NICHE_FIT_WEIGHT: f64 = 0.40;

const SEED_REACH_SHARE: f64 = 0.8;
const ACTIVITY_QUALITY_SHARE: f64 = 0.2;
const EPISODE_WINDOW: f64 = 3.0;
const RECENT_EPISODE_DAYS: f64 = 30.0;

const FREQUENCY_SAMPLE: usize = 3;
const RECENCY_HORIZON_DAYS: f64 = 60.0;
const CADENCE_BEST_GAP_DAYS: f64 = 7.0;
const CADENCE_WORST_GAP_DAYS: f64 = 45.0;
const RECENCY_SHARE: f64 = 0.6;
const CADENCE_SHARE: f64 = 0.4;

const HIGH_INTENT_WEIGHT: f64 = 3.0;
const BASELINE_WEIGHT: f64 = 1.0;
const PENALTY_WEIGHT: f64 = -2.0;
const RECENT_TITLE_WINDOW: usize = 5;

const HIGH_INTENT_TOKENS: [&str; 11] = [
    "athlete",
    "masters",
    "hyrox",
    "crossfit",
    "performance",
    "strength",
    "vo2",
    "pr",
    "training",
    "competition",
    "ranking",
];
const BASELINE_TOKENS: [&str; 4] = ["longevity", "fitness", "aging", "healthspan"];
const PENALTY_TOKENS: [&str; 4] = ["revenue", "marketing", "entrepreneur", "coaching"];
const BUSINESS_CONTEXT_TOKENS: [&str; 8] = [
    "revenue",
    "marketing",
    "entrepreneur",
    "coaching",
    "business",
    "sales",
    "monetize",
    "clients",
];
/// Penalized only when a business-context token is present.
const BUSINESS_CONTEXT_PENALTY_TOKENS: [&str; 1] = ["wellness"];

/// `(max age in days, score)` buckets, checked in order.
const ACTIVITY_BUCKETS: [(f64, f64); 3] = [(30.0, 1.0), (90.0, 0.7), (180.0, 0.4)];
const ACTIVITY_STALE: f64 = 0.15;

static WORD_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9]+").expect("valid regex"));

fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Fractional days from `then` to `now`; negative for future timestamps.
#[allow(clippy::cast_precision_loss)]
fn age_days(now: DateTime<Utc>, then: DateTime<Utc>) -> f64 {
    (now - then).num_milliseconds() as f64 / 86_400_000.0
}

/// Computes [`IntentScore`]s.
#[derive(Clone)]
pub struct ScoringEngine {
    clock: Arc<dyn Clock>,
}

impl ScoringEngine {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Score one show. `keywords` are accepted for interface stability but
    /// do not influence the result.
    #[must_use]
    pub fn score(&self, show: &ShowProfile, _keywords: &[String]) -> IntentScore {
        let now = self.clock.now();
        let reach = reach(show, now);
        let frequency = frequency(&show.episodes, now);
        let niche_fit_breakdown = niche_fit(show);
        let newest = show.episodes.iter().filter_map(|e| e.published_at).max();
        let activity_score = activity(newest, now);

        let base = reach * REACH_WEIGHT
            + frequency * FREQUENCY_WEIGHT
            + niche_fit_breakdown.normalized_score * NICHE_FIT_WEIGHT;

        IntentScore {
            show_id: show.id.clone(),
            show_name: show.name.clone(),
            reach,
            frequency,
            niche_fit: niche_fit_breakdown.normalized_score,
            activity_score,
            score: base * activity_score,
            niche_fit_breakdown,
            newest_episode_published_at: newest,
            contact_email: match show.contact_method {
                ContactMethod::Email => show.contact_value.clone(),
                ContactMethod::None => None,
            },
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn reach(show: &ShowProfile, now: DateTime<Utc>) -> f64 {
    let seeded = clamp01(show.estimated_reach);
    let episodes = &show.episodes;
    if episodes.is_empty() {
        return seeded;
    }

    let count = episodes.len() as f64;
    let dated = episodes.iter().filter(|e| e.published_at.is_some()).count() as f64;
    let window_score = clamp01(count / EPISODE_WINDOW);
    let has_recent = episodes
        .iter()
        .filter_map(|e| e.published_at)
        .any(|at| age_days(now, at) <= RECENT_EPISODE_DAYS);

    let activity_quality = clamp01(
        window_score * 0.5 + (dated / count) * 0.3 + if has_recent { 0.2 } else { 0.0 },
    );
    clamp01(seeded * SEED_REACH_SHARE + activity_quality * ACTIVITY_QUALITY_SHARE)
}

#[allow(clippy::cast_precision_loss)]
fn frequency(episodes: &[Episode], now: DateTime<Utc>) -> f64 {
    let mut dated: Vec<DateTime<Utc>> = episodes.iter().filter_map(|e| e.published_at).collect();
    dated.sort_unstable_by(|a, b| b.cmp(a));
    dated.truncate(FREQUENCY_SAMPLE);

    let Some(&latest) = dated.first() else {
        return 0.0;
    };
    let recency = clamp01(1.0 - age_days(now, latest) / RECENCY_HORIZON_DAYS);
    if dated.len() == 1 {
        return recency;
    }

    let gaps: Vec<f64> = dated
        .windows(2)
        .map(|pair| age_days(pair[0], pair[1]))
        .filter(|gap| *gap >= 0.0)
        .collect();
    let cadence = if gaps.is_empty() {
        0.0
    } else {
        cadence_score(gaps.iter().sum::<f64>() / gaps.len() as f64)
    };

    clamp01(recency * RECENCY_SHARE + cadence * CADENCE_SHARE)
}

fn cadence_score(average_gap_days: f64) -> f64 {
    if average_gap_days <= CADENCE_BEST_GAP_DAYS {
        1.0
    } else if average_gap_days >= CADENCE_WORST_GAP_DAYS {
        0.0
    } else {
        1.0 - (average_gap_days - CADENCE_BEST_GAP_DAYS)
            / (CADENCE_WORST_GAP_DAYS - CADENCE_BEST_GAP_DAYS)
    }
}

fn token_bag(show: &ShowProfile) -> HashMap<String, u32> {
    let mut recent: Vec<&Episode> = show.episodes.iter().collect();
    recent.sort_by(|a, b| {
        b.published_at
            .cmp(&a.published_at)
            .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
    });
    let titles = recent
        .iter()
        .take(RECENT_TITLE_WINDOW)
        .map(|e| e.title.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let corpus = format!("{} {} {}", show.name, show.description, titles).to_lowercase();
    let mut bag = HashMap::new();
    for token in WORD_TOKEN_RE.find_iter(&corpus) {
        *bag.entry(token.as_str().to_string()).or_insert(0) += 1;
    }
    bag
}

fn apply_token_hits(
    tokens: &[&str],
    weight: f64,
    bag: &HashMap<String, u32>,
    hits: &mut Vec<NicheFitTokenHit>,
) {
    for token in tokens {
        let Some(&count) = bag.get(*token).filter(|c| **c > 0) else {
            continue;
        };
        hits.push(NicheFitTokenHit {
            token: (*token).to_string(),
            hits: count,
            weight,
            contribution: f64::from(count) * weight,
        });
    }
}

fn niche_fit(show: &ShowProfile) -> NicheFitBreakdown {
    let bag = token_bag(show);
    if bag.is_empty() {
        return NicheFitBreakdown::default();
    }

    let business_context_detected = BUSINESS_CONTEXT_TOKENS
        .iter()
        .any(|token| bag.contains_key(*token));

    let mut token_hits = Vec::new();
    apply_token_hits(&HIGH_INTENT_TOKENS, HIGH_INTENT_WEIGHT, &bag, &mut token_hits);
    apply_token_hits(&BASELINE_TOKENS, BASELINE_WEIGHT, &bag, &mut token_hits);
    apply_token_hits(&PENALTY_TOKENS, PENALTY_WEIGHT, &bag, &mut token_hits);
    if business_context_detected {
        apply_token_hits(
            &BUSINESS_CONTEXT_PENALTY_TOKENS,
            PENALTY_WEIGHT,
            &bag,
            &mut token_hits,
        );
    }

    let weighted_score = token_hits.iter().map(|h| h.contribution).sum();
    let total_matched_tokens = token_hits.iter().map(|h| h.hits).sum();
    let positive_contribution: f64 = token_hits
        .iter()
        .filter(|h| h.contribution > 0.0)
        .map(|h| h.contribution)
        .sum();
    let penalty_magnitude: f64 = token_hits
        .iter()
        .filter(|h| h.contribution < 0.0)
        .map(|h| -h.contribution)
        .sum();
    let normalized_score = if positive_contribution <= 0.0 {
        0.0
    } else {
        clamp01(positive_contribution / (positive_contribution + penalty_magnitude + 1.0))
    };

    NicheFitBreakdown {
        token_hits,
        weighted_score,
        normalized_score,
        positive_contribution,
        penalty_magnitude,
        total_matched_tokens,
        business_context_detected,
    }
}

fn activity(newest: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(newest) = newest else {
        return ACTIVITY_STALE;
    };
    let age = age_days(now, newest);
    ACTIVITY_BUCKETS
        .iter()
        .find(|(max_days, _)| age <= *max_days)
        .map_or(ACTIVITY_STALE, |(_, score)| *score)
}

#[cfg(test)]
#[path = "scoring_test.rs"]
mod tests;
