//! Offline search client over three seeded shows.

use std::collections::HashMap;

use async_trait::async_trait;
use nudge_core::Candidate;
use tokio_util::sync::CancellationToken;

use crate::error::SearchError;
use crate::SearchClient;

struct SeededShow {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    feed_url: &'static str,
    estimated_reach: f64,
    feed: &'static str,
}

const SEEDED_SHOWS: [SeededShow; 3] = [
    SeededShow {
        id: "show-ai-founders",
        name: "AI Founders Weekly",
        description: "Interviews with startup founders building AI products.",
        feed_url: "memory://ai-founders",
        estimated_reach: 0.76,
        feed: AI_FOUNDERS_FEED,
    },
    SeededShow {
        id: "show-b2b-growth",
        name: "B2B Growth Stories",
        description: "Practical growth playbooks for SaaS and B2B marketing teams.",
        feed_url: "memory://b2b-growth",
        estimated_reach: 0.63,
        feed: B2B_GROWTH_FEED,
    },
    SeededShow {
        id: "show-creator-playbook",
        name: "Creator Monetization Playbook",
        description: "How creators build audiences, monetize newsletters, and scale podcasts.",
        feed_url: "memory://creator-playbook",
        estimated_reach: 0.58,
        feed: CREATOR_PLAYBOOK_FEED,
    },
];

const AI_FOUNDERS_FEED: &str = r#"<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel>
    <title>AI Founders Weekly</title>
    <itunes:owner>
      <itunes:name>AI Founders Team</itunes:name>
      <itunes:email>team@aifoundersweekly.fm</itunes:email>
    </itunes:owner>
    <description>Reach us at partnerships [at] aifoundersweekly.fm for collaborations.</description>
    <item>
      <title>How AI copilots change onboarding</title>
      <description>Discussing SaaS onboarding and startup growth loops.</description>
      <pubDate>Fri, 20 Feb 2026 10:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Building moats with workflow AI</title>
      <description>Founder interview on defensibility in B2B AI.</description>
      <pubDate>Fri, 13 Feb 2026 10:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Lessons from failed launches</title>
      <description>Email us via contact(at)aifoundersweekly.fm.</description>
      <pubDate>Fri, 06 Feb 2026 10:00:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;

const B2B_GROWTH_FEED: &str = r#"<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel>
    <title>B2B Growth Stories</title>
    <itunes:email>editor@b2bgrowthstories.com</itunes:email>
    <description>Stories from B2B marketers scaling revenue.</description>
    <item>
      <title>Category design for technical products</title>
      <description>Positioning and narrative with examples.</description>
      <pubDate>Wed, 18 Feb 2026 08:00:00 -0500</pubDate>
    </item>
    <item>
      <title>Sales and marketing handoff</title>
      <description>How revenue teams coordinate better.</description>
      <pubDate>Wed, 04 Feb 2026 08:00:00 -0500</pubDate>
    </item>
    <item>
      <title>Demand capture vs demand creation</title>
      <description>Budgeting across channels and cycles.</description>
      <pubDate>Invalid Date Example</pubDate>
    </item>
  </channel>
</rss>"#;

const CREATOR_PLAYBOOK_FEED: &str = r#"<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel>
    <title>Creator Monetization Playbook</title>
    <description>Business systems for creator-led brands. Partnerships at hello (at) creatorplaybook.io.</description>
    <item>
      <title>Newsletter funnels that convert</title>
      <description>From content to product with practical examples.</description>
      <pubDate>Mon, 12 Jan 2026 15:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Sponsorship pricing fundamentals</title>
      <description>How audience quality affects ad rates.</description>
      <pubDate>Mon, 22 Dec 2025 15:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Membership retention playbook</title>
      <description>Retention tactics and community loops.</description>
      <pubDate>Mon, 01 Dec 2025 15:00:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;

impl SeededShow {
    fn to_candidate(&self) -> Candidate {
        Candidate {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            // The seeded copy is too short for the word-count heuristic.
            language: Some("en".to_string()),
            feed_url: self.feed_url.to_string(),
            estimated_reach: self.estimated_reach,
        }
    }
}

/// Feed bodies for the seeded shows, keyed by their `memory://` URLs.
#[must_use]
pub fn seeded_feeds() -> HashMap<String, String> {
    SEEDED_SHOWS
        .iter()
        .map(|show| (show.feed_url.to_string(), show.feed.to_string()))
        .collect()
}

/// Search client that never touches the network.
///
/// A seeded show matches when any trimmed, lowercased keyword is a substring
/// of its lowercased name and description. No keywords returns every show.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockSearchClient;

impl MockSearchClient {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SearchClient for MockSearchClient {
    async fn search(
        &self,
        keywords: &[String],
        _published_after_days: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<Candidate>, SearchError> {
        if cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        let mut normalized: Vec<String> = keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        normalized.sort();
        normalized.dedup();

        let candidates = SEEDED_SHOWS
            .iter()
            .filter(|show| {
                if normalized.is_empty() {
                    return true;
                }
                let corpus = format!("{} {}", show.name, show.description).to_lowercase();
                normalized.iter().any(|k| corpus.contains(k.as_str()))
            })
            .map(SeededShow::to_candidate)
            .collect();
        Ok(candidates)
    }
}
