//! Shared domain types, clock capability, and configuration for Nudge.

pub mod app_config;
pub mod clock;
pub mod config;
pub mod types;

pub use app_config::AppConfig;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{
    load_app_config, load_app_config_from_env, parse_use_mock_value, resolve_use_mock, ConfigError,
};
pub use types::{
    Candidate, ContactMethod, Episode, FeedPayload, IntentScore, NicheFitBreakdown,
    NicheFitTokenHit, OutreachPriority, RankedTarget, RankingRunResult, ShowProfile,
};
