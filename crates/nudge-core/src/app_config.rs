#[derive(Clone)]
pub struct AppConfig {
    pub podcast_api_key: Option<String>,
    pub podcast_api_base_url: String,
    pub published_after_days: u32,
    /// `NUDGE_USE_MOCK` when set; `None` lets the CLI flag decide.
    pub use_mock: Option<bool>,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub feed_retry_backoff_ms: u64,
    pub display_episode_count: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field(
                "podcast_api_key",
                &self.podcast_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("podcast_api_base_url", &self.podcast_api_base_url)
            .field("published_after_days", &self.published_after_days)
            .field("use_mock", &self.use_mock)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("feed_retry_backoff_ms", &self.feed_retry_backoff_ms)
            .field("display_episode_count", &self.display_episode_count)
            .finish()
    }
}
