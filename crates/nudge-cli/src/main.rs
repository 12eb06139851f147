use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use nudge_core::{resolve_use_mock, AppConfig, SystemClock};
use nudge_feed::{FeedFetcher, HttpFeedFetcher, InMemoryFeedFetcher, RetryingFeedFetcher};
use nudge_ranking::{select_top, RankingPipeline, RankingRequest};
use nudge_search::{seeded_feeds, ListenNotesSearchClient, MockSearchClient, SearchClient};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

mod output;

const MISSING_API_KEY_WARNING: &str =
    "NUDGE_PODCAST_API_KEY is missing; falling back to mock podcast search client.";

#[derive(Debug, Parser)]
#[command(name = "nudge")]
#[command(about = "Rank podcasts as outreach targets")]
struct Cli {
    /// Comma-separated topic keywords, e.g. "masters,hyrox"
    #[arg(long, default_value = "")]
    keywords: String,

    /// Only score episodes newer than this many days (default from NUDGE_PODCAST_PUBLISHED_AFTER_DAYS)
    #[arg(long)]
    published_after_days: Option<u32>,

    /// Number of ranked shows to print
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    top: u32,

    /// Emit a JSON envelope instead of text
    #[arg(long)]
    json: bool,

    /// Indent JSON output
    #[arg(long)]
    pretty: bool,

    /// Use the seeded offline search client; accepts an optional true/false/1/0
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = parse_use_mock_flag)]
    use_mock: Option<bool>,

    /// Print pipeline diagnostics to stderr
    #[arg(long)]
    verbose: bool,
}

fn parse_use_mock_flag(raw: &str) -> Result<bool, String> {
    nudge_core::parse_use_mock_value(raw)
        .ok_or_else(|| "expected true/false or 1/0".to_string())
}

/// Split a comma-separated keyword list, dropping blanks.
fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

fn build_pipeline(config: &AppConfig, use_mock: bool) -> anyhow::Result<RankingPipeline> {
    let (search, transport): (Arc<dyn SearchClient>, Arc<dyn FeedFetcher>) = if use_mock {
        let feeds: InMemoryFeedFetcher = seeded_feeds().into_iter().collect();
        (Arc::new(MockSearchClient::new()), Arc::new(feeds))
    } else {
        let search = ListenNotesSearchClient::new(
            config.podcast_api_key.as_deref(),
            &config.podcast_api_base_url,
            &config.user_agent,
            config.request_timeout_secs,
        )?;
        let http = HttpFeedFetcher::new(&config.user_agent, config.request_timeout_secs)?;
        (Arc::new(search), Arc::new(http))
    };

    let fetcher = RetryingFeedFetcher::with_backoff(
        transport,
        Duration::from_millis(config.feed_retry_backoff_ms),
    );
    Ok(
        RankingPipeline::new(search, Arc::new(fetcher), Arc::new(SystemClock))
            .with_display_episode_count(config.display_episode_count),
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = nudge_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let (use_mock, missing_api_key) = resolve_use_mock(
        cli.use_mock.unwrap_or(false),
        config.use_mock,
        config.podcast_api_key.as_deref(),
    );
    if missing_api_key {
        eprintln!("Warning: {MISSING_API_KEY_WARNING}");
    }
    tracing::debug!(use_mock, "search mode resolved");

    let request = RankingRequest {
        keywords: parse_keywords(&cli.keywords),
        published_after_days: cli
            .published_after_days
            .unwrap_or(config.published_after_days),
    };
    let pipeline = build_pipeline(&config, use_mock)?;

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_token.cancel();
        }
    });

    let run = pipeline.run(&request, cli.verbose, &cancel).await?;
    let top = select_top(&run.results, usize::try_from(cli.top).unwrap_or(usize::MAX));

    for diagnostic in &run.diagnostics {
        eprintln!("Debug: {diagnostic}");
    }
    for warning in &run.warnings {
        eprintln!("Warning: {warning}");
    }

    if cli.json {
        let arguments = output::ArgumentsView {
            keywords: &request.keywords,
            published_after_days: request.published_after_days,
            top: cli.top,
            json_output: cli.json,
            pretty_json: cli.pretty,
        };
        let json = output::render_json(arguments, chrono::Utc::now(), &top, &run.warnings, cli.pretty)?;
        println!("{json}");
    } else {
        print!("{}", output::render_text(&top, run.warnings.len()));
    }

    Ok(())
}
