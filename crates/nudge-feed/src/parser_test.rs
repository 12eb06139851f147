use chrono::{TimeZone, Utc};

use super::*;

fn parsed(xml: &str) -> (FeedPayload, Vec<ParseIssue>) {
    match parse_feed(xml) {
        ParseOutcome::Parsed { payload, issues } => (payload, issues),
        ParseOutcome::Failed(issue) => panic!("expected parsed feed, got failure: {issue}"),
    }
}

fn failed_code(xml: &str) -> &'static str {
    match parse_feed(xml) {
        ParseOutcome::Failed(issue) => issue.code,
        ParseOutcome::Parsed { .. } => panic!("expected failure"),
    }
}

// -----------------------------------------------------------------------
// structural failures
// -----------------------------------------------------------------------

#[test]
fn empty_input_fails_with_empty_feed() {
    assert_eq!(failed_code(""), "empty_feed");
    assert_eq!(failed_code("   \n\t"), "empty_feed");
}

#[test]
fn missing_channel_fails_with_invalid_feed() {
    assert_eq!(failed_code("<rss />"), "invalid_feed");
    assert_eq!(failed_code(r#"<rss version="2.0"><item/></rss>"#), "invalid_feed");
}

#[test]
fn nested_channel_is_not_the_channel_container() {
    assert_eq!(
        failed_code("<rss><wrapper><channel><title>x</title></channel></wrapper></rss>"),
        "invalid_feed"
    );
}

#[test]
fn mismatched_tags_fail_with_parse_exception() {
    assert_eq!(
        failed_code("<rss><channel><title>x</description></channel></rss>"),
        "parse_exception"
    );
}

#[test]
fn truncated_document_fails_with_parse_exception() {
    assert_eq!(
        failed_code("<rss><channel><item><title>Unclosed"),
        "parse_exception"
    );
}

#[test]
fn empty_channel_parses_with_no_episodes() {
    let (payload, issues) = parsed(r#"<rss version="2.0"><channel></channel></rss>"#);
    assert!(payload.episodes.is_empty());
    assert!(payload.contact_email.is_none());
    assert!(issues.is_empty());
}

// -----------------------------------------------------------------------
// contact email precedence
// -----------------------------------------------------------------------

#[test]
fn channel_itunes_email_wins_over_owner() {
    let xml = r#"<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel>
    <itunes:email> editor@b2bgrowth.com </itunes:email>
    <itunes:owner><itunes:email>owner@b2bgrowth.com</itunes:email></itunes:owner>
  </channel>
</rss>"#;
    let (payload, _) = parsed(xml);
    assert_eq!(payload.contact_email.as_deref(), Some("editor@b2bgrowth.com"));
}

#[test]
fn owner_email_wins_over_obfuscated_text() {
    let xml = r#"<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel>
    <description>Write to contact (at) example.com for guest spots.</description>
    <itunes:owner>
      <itunes:name>Team</itunes:name>
      <itunes:email>team@example.org</itunes:email>
    </itunes:owner>
  </channel>
</rss>"#;
    let (payload, _) = parsed(xml);
    assert_eq!(payload.contact_email.as_deref(), Some("team@example.org"));
}

#[test]
fn obfuscated_text_only_is_deobfuscated() {
    let xml = r#"<rss version="2.0">
  <channel>
    <description>Write to contact (at) example.com for guest spots.</description>
  </channel>
</rss>"#;
    let (payload, _) = parsed(xml);
    assert_eq!(payload.contact_email.as_deref(), Some("contact@example.com"));
}

#[test]
fn item_descriptions_are_scanned_after_channel_description() {
    let xml = r#"<rss version="2.0">
  <channel>
    <description>No address here.</description>
    <item><title>One</title><description>Reach host[at]first.fm</description></item>
    <item><title>Two</title><description>Or other@second.fm</description></item>
  </channel>
</rss>"#;
    let (payload, _) = parsed(xml);
    assert_eq!(payload.contact_email.as_deref(), Some("host@first.fm"));
}

#[test]
fn custom_prefix_bound_to_itunes_namespace_is_honoured() {
    let xml = r#"<rss xmlns:it="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel><it:email>pod@example.net</it:email></channel>
</rss>"#;
    let (payload, _) = parsed(xml);
    assert_eq!(payload.contact_email.as_deref(), Some("pod@example.net"));
}

#[test]
fn blank_declared_email_falls_through_to_text_scan() {
    let xml = r#"<rss xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel>
    <itunes:email>   </itunes:email>
    <description>hello@fallback.io</description>
  </channel>
</rss>"#;
    let (payload, _) = parsed(xml);
    assert_eq!(payload.contact_email.as_deref(), Some("hello@fallback.io"));
}

// -----------------------------------------------------------------------
// language
// -----------------------------------------------------------------------

#[test]
fn channel_language_is_captured() {
    let (payload, _) = parsed("<rss><channel><language> hu-HU </language></channel></rss>");
    assert_eq!(payload.language.as_deref(), Some("hu-HU"));
}

// -----------------------------------------------------------------------
// episodes
// -----------------------------------------------------------------------

#[test]
fn episodes_sorted_newest_first_and_truncated_to_three() {
    let xml = r#"<rss><channel>
    <item><title>Oldest</title><pubDate>Mon, 01 Dec 2025 15:00:00 GMT</pubDate></item>
    <item><title>Newest</title><pubDate>Fri, 20 Feb 2026 10:00:00 GMT</pubDate></item>
    <item><title>Middle</title><pubDate>Mon, 12 Jan 2026 15:00:00 GMT</pubDate></item>
    <item><title>Second</title><pubDate>Fri, 13 Feb 2026 10:00:00 GMT</pubDate></item>
  </channel></rss>"#;
    let (payload, issues) = parsed(xml);
    let titles: Vec<&str> = payload.episodes.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Newest", "Second", "Middle"]);
    assert!(issues.is_empty());
}

#[test]
fn undated_episodes_sort_after_dated_in_feed_order() {
    let xml = r#"<rss><channel>
    <item><title>Undated A</title></item>
    <item><title>Dated</title><pubDate>Fri, 20 Feb 2026 10:00:00 GMT</pubDate></item>
    <item><title>Undated B</title></item>
  </channel></rss>"#;
    let (payload, _) = parsed(xml);
    let titles: Vec<&str> = payload.episodes.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Dated", "Undated A", "Undated B"]);
}

#[test]
fn invalid_pub_date_is_reported_but_episode_kept() {
    let xml = r#"<rss><channel>
    <item><title>Demand capture</title><pubDate>Invalid Date Example</pubDate></item>
  </channel></rss>"#;
    let (payload, issues) = parsed(xml);
    assert_eq!(payload.episodes.len(), 1);
    let episode = &payload.episodes[0];
    assert!(episode.published_at.is_none());
    assert_eq!(episode.raw_published.as_deref(), Some("Invalid Date Example"));
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].code, "invalid_pub_date");
    assert!(issues[0].message.contains("Invalid Date Example"));
    assert!(issues[0].message.contains("Demand capture"));
}

#[test]
fn offset_dates_are_normalized_to_utc() {
    let xml = r#"<rss><channel>
    <item><title>Category design</title><pubDate>Wed, 18 Feb 2026 08:00:00 -0500</pubDate></item>
  </channel></rss>"#;
    let (payload, _) = parsed(xml);
    assert_eq!(
        payload.episodes[0].published_at,
        Some(Utc.with_ymd_and_hms(2026, 2, 18, 13, 0, 0).unwrap())
    );
}

#[test]
fn cdata_and_entities_are_read() {
    let xml = r#"<rss><channel>
    <item>
      <title>Strength &amp; Conditioning</title>
      <description><![CDATA[<p>Coach interview</p>]]></description>
    </item>
  </channel></rss>"#;
    let (payload, _) = parsed(xml);
    assert_eq!(payload.episodes[0].title, "Strength & Conditioning");
    assert_eq!(payload.episodes[0].description, "<p>Coach interview</p>");
}

#[test]
fn missing_title_and_description_default_to_empty() {
    let (payload, _) = parsed("<rss><channel><item><pubDate>2026-02-01</pubDate></item></channel></rss>");
    assert_eq!(payload.episodes[0].title, "");
    assert_eq!(payload.episodes[0].description, "");
    assert_eq!(
        payload.episodes[0].published_at,
        Some(Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap())
    );
}

// -----------------------------------------------------------------------
// parse_pub_date
// -----------------------------------------------------------------------

#[test]
fn pub_date_accepts_rfc3339() {
    assert_eq!(
        parse_pub_date("2026-02-20T10:00:00+01:00"),
        Some(Utc.with_ymd_and_hms(2026, 2, 20, 9, 0, 0).unwrap())
    );
}

#[test]
fn pub_date_reads_zoneless_iso_as_utc() {
    let expected = Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap();
    assert_eq!(parse_pub_date("2026-01-01T10:00:00"), Some(expected));
    assert_eq!(parse_pub_date("2026-01-01T10:00:00.000"), Some(expected));
    assert_eq!(parse_pub_date("2026-01-01 10:00:00"), Some(expected));
}

#[test]
fn pub_date_rejects_garbage() {
    assert_eq!(parse_pub_date("yesterday"), None);
}
