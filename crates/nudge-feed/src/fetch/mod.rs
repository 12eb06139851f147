//! Feed transport.
//!
//! The ranking pipeline only sees [`FeedFetcher`]. Production wiring stacks
//! [`RetryingFeedFetcher`] over [`HttpFeedFetcher`]; tests register canned
//! bodies in an [`InMemoryFeedFetcher`].

mod http;
mod memory;
mod retry;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::FeedError;

pub use http::HttpFeedFetcher;
pub use memory::InMemoryFeedFetcher;
pub use retry::{RetryingFeedFetcher, DEFAULT_RETRY_BACKOFF_MS};

/// Retrieves the raw markup of a podcast feed.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetch `feed_url` and return its body.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Cancelled`] when `cancel` fires before the body is
    /// read, and another [`FeedError`] variant on transport or status failure.
    async fn fetch(&self, feed_url: &str, cancel: &CancellationToken)
        -> Result<String, FeedError>;
}
