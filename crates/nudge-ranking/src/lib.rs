//! Outreach ranking for Nudge.
//!
//! [`RankingPipeline`] runs one search, fetches and scores every candidate's
//! feed through the [`FetchOrchestrator`], and returns deterministically
//! ordered [`RankedTarget`]s with aggregated warnings.
//!
//! [`RankedTarget`]: nudge_core::RankedTarget

pub mod error;
pub mod language;
pub mod orchestrator;
pub mod pipeline;
pub mod priority;
pub mod scoring;

pub use error::RankingError;
pub use language::{detect_language, LanguageClassification, ACCEPTED_LANGUAGES};
pub use orchestrator::{BatchOutput, FetchOrchestrator, FETCH_CONCURRENCY, MISSING_CONTACT_PENALTY};
pub use pipeline::{select_top, RankingPipeline, RankingRequest};
pub use priority::classify_outreach_priority;
pub use scoring::ScoringEngine;
