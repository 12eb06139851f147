use thiserror::Error;

use crate::app_config::AppConfig;

pub const DEFAULT_API_BASE_URL: &str = "https://listen-api.listennotes.com/api/v2/";
pub const DEFAULT_USER_AGENT: &str = "Nudge-Podcast-Bot/1.0";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if any value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if any value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build configuration using the provided env-var lookup function, so tests
/// can drive it from a `HashMap` without touching the process environment.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let podcast_api_key = lookup("NUDGE_PODCAST_API_KEY")
        .ok()
        .filter(|v| !v.trim().is_empty());

    let podcast_api_base_url = or_default("NUDGE_PODCAST_API_BASEURL", DEFAULT_API_BASE_URL);
    if !is_absolute_http_url(&podcast_api_base_url) {
        return Err(invalid(
            "NUDGE_PODCAST_API_BASEURL",
            "must be a valid absolute URL".to_string(),
        ));
    }

    let published_after_days = parse_u32("NUDGE_PODCAST_PUBLISHED_AFTER_DAYS", "60")
        .map_err(|_| {
            invalid(
                "NUDGE_PODCAST_PUBLISHED_AFTER_DAYS",
                "must be a non-negative integer".to_string(),
            )
        })?;

    let use_mock = match lookup("NUDGE_USE_MOCK") {
        Ok(raw) => Some(parse_use_mock_value(&raw).ok_or_else(|| {
            invalid("NUDGE_USE_MOCK", "must be true/false or 1/0".to_string())
        })?),
        Err(_) => None,
    };

    let log_level = or_default("NUDGE_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("NUDGE_REQUEST_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("NUDGE_USER_AGENT", DEFAULT_USER_AGENT);
    let feed_retry_backoff_ms = parse_u64("NUDGE_FEED_RETRY_BACKOFF_MS", "300")?;
    let display_episode_count = parse_usize("NUDGE_DISPLAY_EPISODE_COUNT", "3")?;

    Ok(AppConfig {
        podcast_api_key,
        podcast_api_base_url,
        published_after_days,
        use_mock,
        log_level,
        request_timeout_secs,
        user_agent,
        feed_retry_backoff_ms,
        display_episode_count,
    })
}

/// Parse a mock-mode toggle: `true`/`false` (any case) or `1`/`0`.
///
/// Returns `None` for blank or unrecognized input.
#[must_use]
pub fn parse_use_mock_value(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Decide whether to use the seeded mock search client.
///
/// The environment override wins over the CLI flag. When neither asks for mock
/// mode but no API key is configured, mock mode is forced and the second
/// element of the tuple reports that a missing-key warning is due.
#[must_use]
pub fn resolve_use_mock(
    cli_use_mock: bool,
    env_use_mock: Option<bool>,
    api_key: Option<&str>,
) -> (bool, bool) {
    if env_use_mock.unwrap_or(cli_use_mock) {
        return (true, false);
    }

    let api_key_missing = api_key.is_none_or(|k| k.trim().is_empty());
    if api_key_missing {
        (true, true)
    } else {
        (false, false)
    }
}

fn is_absolute_http_url(raw: &str) -> bool {
    let rest = raw
        .strip_prefix("https://")
        .or_else(|| raw.strip_prefix("http://"));
    rest.is_some_and(|r| {
        let host = r.split('/').next().unwrap_or("");
        !host.is_empty() && !host.contains(char::is_whitespace)
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
