use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::FeedFetcher;
use crate::error::FeedError;

pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 300;

/// Retries a failed fetch exactly once after a fixed delay.
///
/// Cancellation is never retried, and a cancel during the delay ends the
/// wait immediately.
#[derive(Clone)]
pub struct RetryingFeedFetcher {
    inner: Arc<dyn FeedFetcher>,
    backoff: Duration,
}

impl RetryingFeedFetcher {
    #[must_use]
    pub fn new(inner: Arc<dyn FeedFetcher>) -> Self {
        Self::with_backoff(inner, Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS))
    }

    #[must_use]
    pub fn with_backoff(inner: Arc<dyn FeedFetcher>, backoff: Duration) -> Self {
        Self { inner, backoff }
    }
}

#[async_trait]
impl FeedFetcher for RetryingFeedFetcher {
    async fn fetch(
        &self,
        feed_url: &str,
        cancel: &CancellationToken,
    ) -> Result<String, FeedError> {
        let err = match self.inner.fetch(feed_url, cancel).await {
            Ok(body) => return Ok(body),
            Err(err) if err.is_cancelled() => return Err(err),
            Err(err) => err,
        };

        #[allow(clippy::cast_possible_truncation)]
        let delay_ms = self.backoff.as_millis() as u64;
        tracing::warn!(feed_url, delay_ms, error = %err, "feed fetch failed, retrying once");

        tokio::select! {
            () = cancel.cancelled() => return Err(FeedError::Cancelled),
            () = tokio::time::sleep(self.backoff) => {}
        }

        self.inner.fetch(feed_url, cancel).await
    }
}
