//! Podcast feed parsing and feed transport for Nudge.
//!
//! [`parse_feed`] turns raw RSS markup into a [`FeedPayload`] plus
//! non-fatal [`ParseIssue`]s. The [`FeedFetcher`] trait is the transport seam
//! consumed by the ranking pipeline; [`HttpFeedFetcher`], [`RetryingFeedFetcher`]
//! and [`InMemoryFeedFetcher`] are its implementations.
//!
//! [`FeedPayload`]: nudge_core::FeedPayload

pub mod email;
pub mod error;
pub mod fetch;
pub mod parser;

pub use email::{extract_first_email, normalize_obfuscated_email};
pub use error::FeedError;
pub use fetch::{FeedFetcher, HttpFeedFetcher, InMemoryFeedFetcher, RetryingFeedFetcher};
pub use parser::{parse_feed, ParseIssue, ParseOutcome, MAX_FEED_EPISODES};
