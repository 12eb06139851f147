//! Result rendering for the terminal and for machine consumers.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use nudge_core::RankedTarget;
use serde::Serialize;

pub const SCHEMA_VERSION: &str = "1.0";

/// The effective run arguments, echoed in the JSON envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentsView<'a> {
    pub keywords: &'a [String],
    pub published_after_days: u32,
    pub top: u32,
    pub json_output: bool,
    pub pretty_json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonEnvelope<'a> {
    schema_version: &'static str,
    generated_at_utc: DateTime<Utc>,
    arguments: ArgumentsView<'a>,
    total: usize,
    results: &'a [RankedTarget],
    warnings: &'a [String],
}

pub fn render_json(
    arguments: ArgumentsView<'_>,
    generated_at_utc: DateTime<Utc>,
    results: &[RankedTarget],
    warnings: &[String],
    pretty: bool,
) -> serde_json::Result<String> {
    let envelope = JsonEnvelope {
        schema_version: SCHEMA_VERSION,
        generated_at_utc,
        arguments,
        total: results.len(),
        results,
        warnings,
    };
    if pretty {
        serde_json::to_string_pretty(&envelope)
    } else {
        serde_json::to_string(&envelope)
    }
}

/// One block per show, ranked order.
pub fn render_text(results: &[RankedTarget], warning_count: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Warnings: {warning_count}");
    if results.is_empty() {
        let _ = writeln!(out, "No ranked shows.");
        return out;
    }

    for (rank, target) in results.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} [{}] score={:.3} reach={:.2} frequency={:.2} niche={:.2} activity={:.2} lang={}",
            rank + 1,
            target.show_name,
            target.outreach_priority,
            target.score,
            target.reach,
            target.frequency,
            target.niche_fit,
            target.activity_score,
            target.detected_language,
        );
        let _ = writeln!(
            out,
            "   contact: {}",
            target.contact_email.as_deref().unwrap_or("-")
        );
        for title in &target.recent_episode_titles {
            let _ = writeln!(out, "   - {title}");
        }
    }
    out
}
