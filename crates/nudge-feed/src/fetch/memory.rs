use std::collections::HashMap;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::FeedFetcher;
use crate::error::FeedError;

/// Serves canned feed bodies keyed by URL.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFeedFetcher {
    feeds: HashMap<String, String>,
}

impl InMemoryFeedFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `body` as the response for `feed_url`, replacing any earlier one.
    #[must_use]
    pub fn with_feed(mut self, feed_url: impl Into<String>, body: impl Into<String>) -> Self {
        self.feeds.insert(feed_url.into(), body.into());
        self
    }
}

impl<K, V> FromIterator<(K, V)> for InMemoryFeedFetcher
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            feeds: iter
                .into_iter()
                .map(|(url, body)| (url.into(), body.into()))
                .collect(),
        }
    }
}

#[async_trait]
impl FeedFetcher for InMemoryFeedFetcher {
    async fn fetch(
        &self,
        feed_url: &str,
        cancel: &CancellationToken,
    ) -> Result<String, FeedError> {
        if cancel.is_cancelled() {
            return Err(FeedError::Cancelled);
        }
        self.feeds
            .get(feed_url)
            .cloned()
            .ok_or_else(|| FeedError::NotRegistered {
                url: feed_url.to_string(),
            })
    }
}
