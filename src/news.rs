//! Recent storylines for a race, pulled from syndicated news feeds.

use crate::client::Client;
use crate::error::Result;
use crate::utils::search_url;
use chrono::DateTime;
use rss::Channel;
use serde::Serialize;
use std::collections::HashSet;
use tracing::warn;

const GOOGLE_FEED: &str = "https://news.google.com/rss/search";
const BING_FEED: &str = "https://www.bing.com/news/search";

/// Items inspected per feed before filtering.
const FEED_LIMIT: usize = 12;
/// Storylines kept per state.
const MAX_ITEMS: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsItem {
    pub point: String,
    pub date: String,
    pub source: String,
    pub url: String,
}

/// RFC 2822 publication date to an ISO date, raw string when it does not
/// parse.
fn format_pub_date(raw: &str) -> String {
    match DateTime::parse_from_rfc2822(raw.trim()) {
        Ok(parsed) => parsed.date_naive().to_string(),
        Err(_) => raw.trim().to_string(),
    }
}

/// Decodes one feed and keeps items naming the state. Publisher suffixes
/// after `" - "` and stray CDATA wrappers are trimmed from headlines.
fn parse_feed(xml: &str, state_name: &str, limit: usize) -> Result<Vec<NewsItem>> {
    let channel = Channel::read_from(xml.as_bytes())?;
    let state_lo = state_name.to_lowercase();

    let mut out = vec![];
    for item in channel.items().iter().take(limit) {
        let mut title = item.title().unwrap_or_default().trim().to_string();
        if let Some((headline, _)) = title.split_once(" - ") {
            title = headline.to_string();
        }
        if let Some(stripped) = title.strip_prefix("CDATA[") {
            title = stripped.trim_end_matches(']').to_string();
        }

        let link = item.link().unwrap_or_default().trim();
        if title.is_empty() || link.is_empty() {
            continue;
        }
        if !title.to_lowercase().contains(&state_lo) {
            continue;
        }

        out.push(NewsItem {
            date: item.pub_date().map(format_pub_date).unwrap_or_default(),
            source: item
                .source()
                .and_then(|s| s.title())
                .unwrap_or_default()
                .trim()
                .to_string(),
            point: title,
            url: link.to_string(),
        });
    }
    Ok(out)
}

/// Concatenates per-feed batches, dropping repeats of the same normalized
/// headline, bounded to [`MAX_ITEMS`].
fn merge_items(batches: Vec<Vec<NewsItem>>) -> Vec<NewsItem> {
    let mut seen = HashSet::new();
    let mut out = vec![];
    for batch in batches {
        for item in batch {
            if !seen.insert(item.point.to_lowercase()) {
                continue;
            }
            out.push(item);
            if out.len() >= MAX_ITEMS {
                return out;
            }
        }
    }
    out
}

/// Static "search this topic" links shown when both feeds come up empty.
fn placeholders(state_name: &str, query: &str) -> Vec<NewsItem> {
    vec![
        NewsItem {
            point: format!("Track the latest {state_name} Senate primary coverage (Google News)."),
            date: String::new(),
            source: "Google News".to_string(),
            url: search_url(
                "https://news.google.com/search",
                &[("q", query), ("hl", "en-US"), ("gl", "US"), ("ceid", "US:en")],
            ),
        },
        NewsItem {
            point: format!("Track the latest {state_name} Senate primary coverage (Bing News)."),
            date: String::new(),
            source: "Bing News".to_string(),
            url: search_url("https://www.bing.com/news/search", &[("q", query)]),
        },
        NewsItem {
            point: format!("Review campaign reporting and updates for the {state_name} race."),
            date: String::new(),
            source: "News search".to_string(),
            url: search_url("https://duckduckgo.com/", &[("q", query)]),
        },
    ]
}

/// Storylines for one state: Google News first, Bing News second, dedup by
/// headline, static search links when nothing matched.
pub async fn storylines(client: &Client, state_name: &str) -> Vec<NewsItem> {
    let query = format!("{state_name} Senate race 2026 primary");
    let feeds: [(&str, Vec<(&str, &str)>); 2] = [
        (
            GOOGLE_FEED,
            vec![
                ("q", query.as_str()),
                ("hl", "en-US"),
                ("gl", "US"),
                ("ceid", "US:en"),
            ],
        ),
        (BING_FEED, vec![("q", query.as_str()), ("format", "RSS")]),
    ];

    let mut batches = vec![];
    for (base, params) in feeds {
        let batch = async {
            let xml = client.fetch_text_with_query(base, &params).await?;
            parse_feed(&xml, state_name, FEED_LIMIT)
        }
        .await;
        match batch {
            Ok(items) => batches.push(items),
            Err(e) => warn!("Feed {} failed for {}: {}", base, state_name, e),
        }
    }

    let out = merge_items(batches);
    if out.is_empty() {
        placeholders(state_name, &query)
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn feed(items: &str) -> String {
        format!(
            r#"<?xml version="1.0"?><rss version="2.0"><channel>
                <title>search</title><link>http://example.com</link>
                <description>q</description>{items}</channel></rss>"#
        )
    }

    fn item(title: &str, link: &str, pub_date: &str, source: &str) -> String {
        format!(
            r#"<item><title>{title}</title><link>{link}</link>
                <pubDate>{pub_date}</pubDate>
                <source url="http://example.com">{source}</source></item>"#
        )
    }

    #[test]
    fn keeps_only_items_naming_the_state() {
        let xml = feed(&format!(
            "{}{}",
            item(
                "Georgia Senate primary heats up - The Paper",
                "https://example.com/1",
                "Wed, 18 Feb 2026 12:00:00 GMT",
                "The Paper"
            ),
            item(
                "Ohio race news",
                "https://example.com/2",
                "bad date",
                "Elsewhere"
            ),
        ));
        let items = parse_feed(&xml, "Georgia", FEED_LIMIT).unwrap();
        assert_eq!(
            items,
            vec![NewsItem {
                point: "Georgia Senate primary heats up".to_string(),
                date: "2026-02-18".to_string(),
                source: "The Paper".to_string(),
                url: "https://example.com/1".to_string(),
            }]
        );
    }

    #[test]
    fn unparseable_date_passes_through_raw() {
        let xml = feed(&item(
            "Maine Senate primary poll",
            "https://example.com/3",
            "sometime in February",
            "Wire",
        ));
        let items = parse_feed(&xml, "Maine", FEED_LIMIT).unwrap();
        assert_eq!(items[0].date, "sometime in February");
    }

    #[test]
    fn merge_dedups_by_normalized_headline() {
        let a = NewsItem {
            point: "Georgia Senate Primary Heats Up".to_string(),
            date: String::new(),
            source: "A".to_string(),
            url: "https://example.com/a".to_string(),
        };
        let b = NewsItem {
            point: "georgia senate primary heats up".to_string(),
            date: String::new(),
            source: "B".to_string(),
            url: "https://example.com/b".to_string(),
        };
        let merged = merge_items(vec![vec![a.clone()], vec![b]]);
        assert_eq!(merged, vec![a]);
    }

    #[test]
    fn merge_bounds_output() {
        let items: Vec<NewsItem> = (0..10)
            .map(|i| NewsItem {
                point: format!("headline {i}"),
                date: String::new(),
                source: String::new(),
                url: format!("https://example.com/{i}"),
            })
            .collect();
        assert_eq!(merge_items(vec![items]).len(), MAX_ITEMS);
    }

    #[test]
    fn placeholders_embed_the_query() {
        let out = placeholders("Georgia", "Georgia Senate race 2026 primary");
        assert_eq!(out.len(), 3);
        assert!(out[0].url.contains("news.google.com"));
        assert!(out[0].url.contains("Georgia+Senate+race+2026+primary"));
        assert_eq!(out[2].source, "News search");
    }
}
