//! Podcast search collaborators for Nudge.
//!
//! [`SearchClient`] is the seam the ranking pipeline depends on.
//! [`ListenNotesSearchClient`] talks to the Listen Notes REST API;
//! [`MockSearchClient`] serves three seeded shows whose feeds are available
//! from [`seeded_feeds`].

pub mod error;
pub mod listennotes;
pub mod mock;

use async_trait::async_trait;
use nudge_core::Candidate;
use tokio_util::sync::CancellationToken;

pub use error::SearchError;
pub use listennotes::ListenNotesSearchClient;
pub use mock::{seeded_feeds, MockSearchClient};

/// Finds candidate shows for a keyword set.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// # Errors
    ///
    /// Returns [`SearchError::Cancelled`] when `cancel` fires, and another
    /// [`SearchError`] variant when the provider cannot be reached or answers
    /// with an unreadable body.
    async fn search(
        &self,
        keywords: &[String],
        published_after_days: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<Candidate>, SearchError>;
}
