//! RSS feed parser.
//!
//! Reads the document with a namespace-aware `quick-xml` reader and keeps a
//! stack of open element keys. Elements in the iTunes podcast namespace are
//! keyed `itunes:<local>` regardless of the prefix the feed binds; elements
//! without a namespace use their bare local name.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use nudge_core::{Episode, FeedPayload};
use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use crate::email::extract_first_email;

/// Maximum number of episodes kept in a [`FeedPayload`].
pub const MAX_FEED_EPISODES: usize = 3;

const ITUNES_NS: &[u8] = b"http://www.itunes.com/dtds/podcast-1.0.dtd";

/// A structured, non-exceptional parse problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// Stable machine-readable code: `empty_feed`, `invalid_feed`,
    /// `parse_exception` or `invalid_pub_date`.
    pub code: &'static str,
    pub message: String,
}

impl ParseIssue {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Result of [`parse_feed`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// Best-effort payload plus any non-fatal issues.
    Parsed {
        payload: FeedPayload,
        issues: Vec<ParseIssue>,
    },
    /// The feed could not be used at all.
    Failed(ParseIssue),
}

impl ParseOutcome {
    /// The payload, when parsing succeeded.
    #[must_use]
    pub fn payload(&self) -> Option<&FeedPayload> {
        match self {
            ParseOutcome::Parsed { payload, .. } => Some(payload),
            ParseOutcome::Failed(_) => None,
        }
    }
}

#[derive(Default)]
struct RawItem {
    title: Option<String>,
    description: Option<String>,
    pub_date: Option<String>,
    extra_descriptions: Vec<String>,
}

#[derive(Default)]
struct RawChannel {
    seen: bool,
    itunes_email: Option<String>,
    owner_email: Option<String>,
    language: Option<String>,
    descriptions: Vec<String>,
    items: Vec<RawItem>,
}

/// Parse raw feed markup into a [`FeedPayload`].
///
/// Empty input, a missing `<channel>` under the document root, and malformed
/// XML produce [`ParseOutcome::Failed`]. Unparseable `pubDate`s are recorded
/// as `invalid_pub_date` issues and the episode is kept without a timestamp.
#[must_use]
pub fn parse_feed(xml: &str) -> ParseOutcome {
    if xml.trim().is_empty() {
        return ParseOutcome::Failed(ParseIssue::new("empty_feed", "RSS feed XML is empty."));
    }

    let channel = match read_channel(xml) {
        Ok(channel) => channel,
        Err(message) => return ParseOutcome::Failed(ParseIssue::new("parse_exception", message)),
    };

    if !channel.seen {
        return ParseOutcome::Failed(ParseIssue::new(
            "invalid_feed",
            "RSS channel node was not found.",
        ));
    }

    let mut issues = Vec::new();
    let contact_email = extract_contact_email(&channel);
    let language = channel
        .language
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string);
    let episodes = build_episodes(channel.items, &mut issues);

    ParseOutcome::Parsed {
        payload: FeedPayload {
            contact_email,
            language,
            episodes,
        },
        issues,
    }
}

fn read_channel(xml: &str) -> Result<RawChannel, String> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut channel = RawChannel::default();
    let mut stack: Vec<String> = Vec::new();
    // Text gathered for each open element, including descendants' text.
    let mut texts: Vec<String> = Vec::new();

    loop {
        let (resolved, event) = reader
            .read_resolved_event()
            .map_err(|e| format!("malformed XML: {e}"))?;
        match event {
            Event::Start(e) => {
                let key = element_key(&resolved, e.local_name().as_ref());
                if stack.len() == 2 && stack[1] == "channel" && key == "item" {
                    channel.items.push(RawItem::default());
                }
                if stack.len() == 1 && key == "channel" {
                    channel.seen = true;
                }
                stack.push(key);
                texts.push(String::new());
            }
            Event::Empty(e) => {
                let key = element_key(&resolved, e.local_name().as_ref());
                if stack.len() == 2 && stack[1] == "channel" && key == "item" {
                    channel.items.push(RawItem::default());
                }
                if stack.len() == 1 && key == "channel" {
                    channel.seen = true;
                }
            }
            Event::Text(e) => {
                let text = e.unescape().map_err(|e| e.to_string())?;
                append_text(&mut texts, &text);
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                append_text(&mut texts, &text);
            }
            Event::End(_) => {
                let text = texts.pop().unwrap_or_default();
                let path: Vec<&str> = stack.iter().map(String::as_str).collect();
                record_value(&mut channel, &path, &text);
                stack.pop();
                if let Some(parent) = texts.last_mut() {
                    if !text.is_empty() {
                        if !parent.is_empty() {
                            parent.push(' ');
                        }
                        parent.push_str(&text);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(format!(
            "unexpected end of document inside <{}>",
            stack.last().map_or("", String::as_str)
        ));
    }

    Ok(channel)
}

fn element_key(resolved: &ResolveResult<'_>, local: &[u8]) -> String {
    let local = String::from_utf8_lossy(local);
    match resolved {
        ResolveResult::Bound(ns) if ns.as_ref() == ITUNES_NS => format!("itunes:{local}"),
        ResolveResult::Bound(ns) => format!("{{{}}}{local}", String::from_utf8_lossy(ns.as_ref())),
        ResolveResult::Unknown(prefix) => format!("{}:{local}", String::from_utf8_lossy(prefix)),
        ResolveResult::Unbound => local.into_owned(),
    }
}

fn append_text(texts: &mut [String], text: &str) {
    if let Some(current) = texts.last_mut() {
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(text);
    }
}

fn record_value(channel: &mut RawChannel, path: &[&str], text: &str) {
    match path {
        [_, "channel", "itunes:email"] => set_first(&mut channel.itunes_email, text),
        [_, "channel", "itunes:owner", "itunes:email"] => set_first(&mut channel.owner_email, text),
        [_, "channel", "language"] => set_first(&mut channel.language, text),
        [_, "channel", "description"] => channel.descriptions.push(text.to_string()),
        [_, "channel", "item", field] => {
            let Some(item) = channel.items.last_mut() else {
                return;
            };
            match *field {
                "title" => set_first(&mut item.title, text),
                "description" => {
                    if item.description.is_none() {
                        item.description = Some(text.to_string());
                    } else {
                        item.extra_descriptions.push(text.to_string());
                    }
                }
                "pubDate" => set_first(&mut item.pub_date, text),
                _ => {}
            }
        }
        _ => {}
    }
}

fn set_first(slot: &mut Option<String>, text: &str) {
    if slot.is_none() {
        *slot = Some(text.to_string());
    }
}

/// Email precedence: channel `itunes:email`, then owner block, then the first
/// address found in channel and item descriptions.
fn extract_contact_email(channel: &RawChannel) -> Option<String> {
    let declared = [&channel.itunes_email, &channel.owner_email]
        .into_iter()
        .flatten()
        .map(|v| v.trim())
        .find(|v| !v.is_empty());
    if let Some(email) = declared {
        return Some(email.to_string());
    }

    let item_descriptions = channel.items.iter().flat_map(|item| {
        item.description
            .iter()
            .chain(item.extra_descriptions.iter())
    });
    let text_to_search = channel
        .descriptions
        .iter()
        .chain(item_descriptions)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");

    extract_first_email(&text_to_search)
}

fn build_episodes(items: Vec<RawItem>, issues: &mut Vec<ParseIssue>) -> Vec<Episode> {
    let mut episodes: Vec<Episode> = items
        .into_iter()
        .map(|item| {
            let title = item.title.as_deref().unwrap_or("").trim().to_string();
            let description = item.description.as_deref().unwrap_or("").trim().to_string();
            let raw_published = item
                .pub_date
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string);

            let published_at = match raw_published.as_deref() {
                Some(raw) => {
                    let parsed = parse_pub_date(raw);
                    if parsed.is_none() {
                        issues.push(ParseIssue::new(
                            "invalid_pub_date",
                            format!("Unable to parse pubDate '{raw}' for episode '{title}'."),
                        ));
                    }
                    parsed
                }
                None => None,
            };

            Episode {
                title,
                description,
                published_at,
                raw_published,
            }
        })
        .collect();

    // Stable sort: dated episodes newest-first, undated last, feed order breaks ties.
    episodes.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    episodes.truncate(MAX_FEED_EPISODES);
    episodes
}

const NAIVE_DATE_TIME_FORMATS: [&str; 3] =
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse a feed date: RFC 2822 first (the RSS norm), then RFC 3339, then a
/// couple of bare ISO forms interpreted as UTC.
pub(crate) fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
