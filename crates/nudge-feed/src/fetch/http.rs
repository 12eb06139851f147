use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio_util::sync::CancellationToken;

use super::FeedFetcher;
use crate::error::FeedError;

/// Fetches feeds over HTTP(S) with a fixed user agent and request timeout.
#[derive(Debug, Clone)]
pub struct HttpFeedFetcher {
    client: Client,
}

impl HttpFeedFetcher {
    /// # Errors
    ///
    /// Returns [`FeedError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(user_agent: &str, timeout_secs: u64) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    async fn fetch_body(&self, feed_url: &str) -> Result<String, FeedError> {
        let response = self.client.get(feed_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                url: feed_url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(
        &self,
        feed_url: &str,
        cancel: &CancellationToken,
    ) -> Result<String, FeedError> {
        tracing::debug!(feed_url, "fetching feed");
        tokio::select! {
            () = cancel.cancelled() => Err(FeedError::Cancelled),
            result = self.fetch_body(feed_url) => result,
        }
    }
}
