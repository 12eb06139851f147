use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One show returned by a search collaborator, before feed enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Declared language tag as reported by the search provider (`en`, `English`, `hu-HU`, ...).
    #[serde(default)]
    pub language: Option<String>,
    pub feed_url: String,
    /// Seed reach estimate in `[0.0, 1.0]`.
    #[serde(default)]
    pub estimated_reach: f64,
}

/// A single feed item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub title: String,
    pub description: String,
    /// Publication time normalized to UTC. `None` when the feed omitted the
    /// date or it could not be parsed.
    pub published_at: Option<DateTime<Utc>>,
    /// The raw `pubDate` text, kept for diagnostics.
    pub raw_published: Option<String>,
}

impl Episode {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        published_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            published_at,
            raw_published: None,
        }
    }
}

/// Normalized result of parsing one show's feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPayload {
    pub contact_email: Option<String>,
    /// Channel-level `<language>` value, trimmed.
    pub language: Option<String>,
    /// At most three episodes, most recent first; undated episodes trail.
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactMethod {
    None,
    Email,
}

/// The unit consumed by the scoring engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowProfile {
    pub id: String,
    pub name: String,
    pub description: String,
    pub feed_url: String,
    pub estimated_reach: f64,
    pub contact_method: ContactMethod,
    pub contact_value: Option<String>,
    pub episodes: Vec<Episode>,
}

/// One matched token in the niche-fit computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NicheFitTokenHit {
    pub token: String,
    pub hits: u32,
    pub weight: f64,
    /// `hits * weight`.
    pub contribution: f64,
}

/// Explainability record for the niche-fit sub-score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NicheFitBreakdown {
    pub token_hits: Vec<NicheFitTokenHit>,
    pub weighted_score: f64,
    /// Normalized niche-fit in `[0.0, 1.0]`.
    pub normalized_score: f64,
    pub positive_contribution: f64,
    pub penalty_magnitude: f64,
    pub total_matched_tokens: u32,
    pub business_context_detected: bool,
}

/// Output of the scoring engine for one show.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentScore {
    pub show_id: String,
    pub show_name: String,
    pub reach: f64,
    pub frequency: f64,
    pub niche_fit: f64,
    pub activity_score: f64,
    /// Combined score before any contact penalty.
    pub score: f64,
    pub niche_fit_breakdown: NicheFitBreakdown,
    pub newest_episode_published_at: Option<DateTime<Utc>>,
    pub contact_email: Option<String>,
}

/// Coarse outreach label derived from thresholded sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutreachPriority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for OutreachPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutreachPriority::High => write!(f, "High"),
            OutreachPriority::Medium => write!(f, "Medium"),
            OutreachPriority::Low => write!(f, "Low"),
        }
    }
}

/// Final output row handed to rendering and outreach tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedTarget {
    pub show_id: String,
    pub show_name: String,
    pub detected_language: String,
    pub feed_url: String,
    pub contact_email: Option<String>,
    pub reach: f64,
    pub frequency: f64,
    pub niche_fit: f64,
    pub activity_score: f64,
    pub niche_fit_breakdown: NicheFitBreakdown,
    pub outreach_priority: OutreachPriority,
    /// Combined score after the missing-contact penalty.
    pub score: f64,
    pub newest_episode_published_at: Option<DateTime<Utc>>,
    pub recent_episode_titles: Vec<String>,
}

/// Result of one ranking pipeline invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingRunResult {
    pub results: Vec<RankedTarget>,
    /// De-duplicated, case-insensitively sorted warnings.
    pub warnings: Vec<String>,
    /// Populated only when verbose diagnostics were requested.
    pub diagnostics: Vec<String>,
}
