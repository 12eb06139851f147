//! HTTP client for the Listen Notes podcast search API.
//!
//! One `GET {base}search?type=podcast&len=50&q=...` per run. Rate limits,
//! server errors and transport failures are retried once; any other
//! non-success status yields an empty result list.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use nudge_core::Candidate;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::error::SearchError;
use crate::SearchClient;

const SEARCH_PATH: &str = "search";
const RESULT_PAGE_LEN: &str = "50";
const ID_PREFIX: &str = "listennotes:";
const DEFAULT_REACH: f64 = 0.5;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Option<Vec<PodcastResult>>,
}

#[derive(Debug, Deserialize)]
struct PodcastResult {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title_original: Option<String>,
    #[serde(default)]
    description_original: Option<String>,
    #[serde(default)]
    rss: Option<String>,
    /// Numeric when known; the API reports other shapes for unranked shows.
    #[serde(default)]
    listen_score: Option<serde_json::Value>,
    #[serde(default)]
    language: Option<String>,
}

/// Client for the Listen Notes search endpoint.
///
/// Use [`ListenNotesSearchClient::new`] with the configured base URL; tests
/// point it at a wiremock server and shorten the retry delay with
/// [`ListenNotesSearchClient::with_retry_delay`].
pub struct ListenNotesSearchClient {
    client: Client,
    api_key: Option<String>,
    base_url: Url,
    retry_delay: Duration,
}

impl ListenNotesSearchClient {
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SearchError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn new(
        api_key: Option<&str>,
        base_url: &str,
        user_agent: &str,
        timeout_secs: u64,
    ) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // A trailing slash keeps `join` appending to the path instead of
        // replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| SearchError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_owned),
            base_url,
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    #[must_use]
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub(crate) fn search_url(&self, keywords: &[String]) -> Result<Url, SearchError> {
        let query = keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let mut url = self
            .base_url
            .join(SEARCH_PATH)
            .map_err(|e| SearchError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("type", "podcast")
            .append_pair("len", RESULT_PAGE_LEN)
            .append_pair("q", &query);
        Ok(url)
    }

    async fn send(&self, url: &Url) -> Result<Response, reqwest::Error> {
        let mut request = self.client.get(url.clone());
        if let Some(key) = &self.api_key {
            request = request.header("X-ListenAPI-Key", key);
        }
        request.send().await
    }

    /// Delay before the single retry: `Retry-After` seconds on a 429 when
    /// present and positive, otherwise the fixed retry delay.
    fn retry_delay_for(&self, response: Option<&Response>) -> Duration {
        response
            .filter(|r| r.status() == StatusCode::TOO_MANY_REQUESTS)
            .and_then(|r| r.headers().get(RETRY_AFTER))
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(self.retry_delay, Duration::from_secs)
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

async fn cancellable<F: Future>(cancel: &CancellationToken, fut: F) -> Result<F::Output, SearchError> {
    tokio::select! {
        () = cancel.cancelled() => Err(SearchError::Cancelled),
        output = fut => Ok(output),
    }
}

fn normalize_reach(listen_score: Option<&serde_json::Value>) -> f64 {
    listen_score
        .and_then(serde_json::Value::as_f64)
        .map_or(DEFAULT_REACH, |score| (score / 100.0).clamp(0.0, 1.0))
}

fn map_results(payload: SearchResponse) -> Vec<Candidate> {
    let mut seen: HashSet<String> = HashSet::new();
    payload
        .results
        .unwrap_or_default()
        .into_iter()
        .filter_map(|r| {
            let id = r.id.filter(|id| !id.trim().is_empty())?;
            let rss = r.rss.filter(|rss| !rss.trim().is_empty())?;
            if !seen.insert(id.clone()) {
                return None;
            }
            Some(Candidate {
                id: format!("{ID_PREFIX}{id}"),
                name: r.title_original.unwrap_or_default(),
                description: r.description_original.unwrap_or_default(),
                language: r.language.filter(|l| !l.trim().is_empty()),
                feed_url: rss,
                estimated_reach: normalize_reach(r.listen_score.as_ref()),
            })
        })
        .collect()
}

#[async_trait]
impl SearchClient for ListenNotesSearchClient {
    async fn search(
        &self,
        keywords: &[String],
        published_after_days: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<Candidate>, SearchError> {
        let url = self.search_url(keywords)?;
        tracing::debug!(%url, published_after_days, "searching Listen Notes");

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let last_attempt = attempt >= 2;

            let response = match cancellable(cancel, self.send(&url)).await? {
                Ok(response) => response,
                Err(e) if !last_attempt => {
                    tracing::warn!(attempt, error = %e, "Listen Notes transport error, retrying");
                    let delay = self.retry_delay_for(None);
                    cancellable(cancel, tokio::time::sleep(delay)).await?;
                    continue;
                }
                Err(e) => return Err(SearchError::Http(e)),
            };

            let status = response.status();
            if status.is_success() {
                let body = cancellable(cancel, response.text()).await??;
                let payload: SearchResponse =
                    serde_json::from_str(&body).map_err(|source| SearchError::Deserialize {
                        context: "Listen Notes search response".to_string(),
                        source,
                    })?;
                let candidates = map_results(payload);
                tracing::debug!(count = candidates.len(), "Listen Notes search complete");
                return Ok(candidates);
            }

            if !last_attempt && is_transient_status(status) {
                let delay = self.retry_delay_for(Some(&response));
                tracing::warn!(
                    attempt,
                    status = status.as_u16(),
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "Listen Notes transient status, retrying"
                );
                cancellable(cancel, tokio::time::sleep(delay)).await?;
                continue;
            }

            tracing::warn!(status = status.as_u16(), "Listen Notes search returned no usable results");
            return Ok(Vec::new());
        }
    }
}
