use thiserror::Error;

/// Errors returned by a [`FeedFetcher`](crate::FeedFetcher).
#[derive(Debug, Error)]
pub enum FeedError {
    /// The feed server answered with a non-success status.
    #[error("feed request to {url} returned HTTP {status}")]
    Status { status: u16, url: String },

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// No canned body is registered for this URL.
    #[error("no feed registered for {url}")]
    NotRegistered { url: String },

    /// The run was cancelled while the fetch was in flight.
    #[error("feed fetch cancelled")]
    Cancelled,
}

impl FeedError {
    /// Short, user-facing reason used in skipped-feed warnings.
    ///
    /// `HTTP <code>` whenever a status code is known, otherwise a generic
    /// transport or fetch message.
    #[must_use]
    pub fn failure_reason(&self) -> String {
        match self {
            FeedError::Status { status, .. } => format!("HTTP {status}"),
            FeedError::Http(e) => match e.status() {
                Some(status) => format!("HTTP {}", status.as_u16()),
                None => "HTTP request failed".to_string(),
            },
            FeedError::NotRegistered { .. } | FeedError::Cancelled => {
                "feed fetch failed".to_string()
            }
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FeedError::Cancelled)
    }
}
