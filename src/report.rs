//! Output payload assembly and serialization. Each subcommand builds one
//! payload per run; every sub-fetch is independently best-effort.

use crate::client::Client;
use crate::error::Result;
use crate::markets::{Kalshi, MarketListing, MarketSource, Polymarket};
use crate::news::{self, NewsItem};
use crate::polls::{self, PollingRef, ToplineBlock};
use crate::states::{code_to_name, SENATE_ELECTION_STATES};
use crate::tracker::{self, RaceEntry, PRIMARY_DAY, RACES};
use crate::{calendar, ratings};
use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

pub const REFRESH_TARGET: &str = "24-48 hours";

/// Static source attribution published alongside the data.
#[derive(Debug, Serialize)]
pub struct SourceUrls {
    pub cook: &'static str,
    pub ncsl: &'static str,
    pub polymarket: &'static str,
    pub kalshi: &'static str,
    pub polls: &'static str,
    pub news: &'static str,
}

pub fn source_urls() -> SourceUrls {
    SourceUrls {
        cook: ratings::RATINGS_URL,
        ncsl: calendar::CALENDAR_URL,
        polymarket: "https://polymarket.com",
        kalshi: "https://kalshi.com",
        polls: "https://www.realclearpolitics.com",
        news: "https://news.google.com",
    }
}

#[derive(Debug, Serialize)]
pub struct Odds {
    pub polymarket: Vec<MarketListing>,
    pub kalshi: Vec<MarketListing>,
}

#[derive(Debug, Serialize)]
pub struct SwingState {
    pub state: String,
    pub state_name: String,
    pub cook_rating: String,
    pub primary_date: String,
    pub odds: Odds,
    pub polls_toplines: Vec<ToplineBlock>,
    pub polls: Vec<PollingRef>,
    pub storylines: Vec<NewsItem>,
    pub race_summary: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CalendarState {
    pub state: String,
    pub state_name: String,
    pub primary_date: String,
    pub competitive: bool,
    pub cook_rating: String,
}

#[derive(Debug, Serialize)]
pub struct RacesPayload {
    pub updated_at: String,
    pub refresh_target: &'static str,
    pub sources: SourceUrls,
    pub senate_election_states: Vec<CalendarState>,
    pub swing_states: Vec<SwingState>,
}

#[derive(Debug, Serialize)]
pub struct TrackerPayload {
    pub updated_at: String,
    pub primary_day: &'static str,
    pub races: Vec<RaceEntry>,
}

pub fn timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Per-race tracker payload: one entry per configured race, in order.
pub async fn build_tracker(client: &Client) -> TrackerPayload {
    let mut races = vec![];
    for spec in &RACES {
        races.push(tracker::build_race_entry(client, spec).await);
    }
    TrackerPayload {
        updated_at: timestamp(),
        primary_day: PRIMARY_DAY,
        races,
    }
}

fn not_available() -> String {
    "Not available".to_string()
}

/// Swing-state payload: ratings and dates first, then the per-state
/// sub-fetches, then the full Senate-map calendar.
pub async fn build_races(client: &Client) -> RacesPayload {
    let cook = ratings::fetch_swing_ratings(client).await;
    info!(
        "Ratings source: {}",
        if cook.is_fallback() { "defaults" } else { "live" }
    );
    let dates = calendar::fetch_primary_dates(client).await;
    info!(
        "Primary dates source: {}",
        if dates.is_fallback() { "defaults" } else { "live" }
    );
    let cook = cook.into_inner();
    let dates = dates.into_inner();

    let mut swing_states = vec![];
    for (code, rating) in &cook {
        let state_name = rating.state_name.clone();
        info!("Assembling {}", code);

        let polymarket = Polymarket.listings(client, &state_name).await;
        let kalshi = Kalshi.listings(client, &state_name).await;
        let toplines = polls::default_toplines(code);
        let race_summary = polls::summarize_race(
            &state_name,
            &rating.cook_rating,
            &toplines,
            polymarket.len(),
            kalshi.len(),
        );

        swing_states.push(SwingState {
            state: code.clone(),
            state_name: state_name.clone(),
            cook_rating: rating.cook_rating.clone(),
            primary_date: dates.get(code).cloned().unwrap_or_else(not_available),
            odds: Odds { polymarket, kalshi },
            polls_toplines: toplines,
            polls: polls::polling_refs(client, &state_name).await,
            storylines: news::storylines(client, &state_name).await,
            race_summary,
        });
    }

    let senate_election_states = SENATE_ELECTION_STATES
        .iter()
        .map(|code| {
            let swing = cook.get(*code);
            CalendarState {
                state: code.to_string(),
                state_name: code_to_name(code).to_string(),
                primary_date: dates.get(*code).cloned().unwrap_or_else(not_available),
                competitive: swing.is_some(),
                cook_rating: swing
                    .map(|r| r.cook_rating.clone())
                    .unwrap_or_else(|| "Not rated competitive".to_string()),
            }
        })
        .collect();

    RacesPayload {
        updated_at: timestamp(),
        refresh_target: REFRESH_TARGET,
        sources: source_urls(),
        senate_election_states,
        swing_states,
    }
}

/// Writes the payload as indented JSON, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, payload: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(payload)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazy_regex::regex;
    use pretty_assertions::assert_eq;

    #[test]
    fn timestamp_matches_published_format() {
        assert!(regex!(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2} UTC$").is_match(&timestamp()));
    }

    #[test]
    fn swing_state_serializes_with_expected_keys() {
        let state = SwingState {
            state: "GA".to_string(),
            state_name: "Georgia".to_string(),
            cook_rating: "Toss Up".to_string(),
            primary_date: "May 19, 2026".to_string(),
            odds: Odds {
                polymarket: vec![],
                kalshi: vec![],
            },
            polls_toplines: polls::default_toplines("GA"),
            polls: vec![],
            storylines: vec![],
            race_summary: vec![],
        };
        let value = serde_json::to_value(&state).unwrap();
        for key in [
            "state",
            "state_name",
            "cook_rating",
            "primary_date",
            "odds",
            "polls_toplines",
            "polls",
            "storylines",
            "race_summary",
        ] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(value["odds"]["polymarket"], serde_json::json!([]));
        assert_eq!(
            value["polls_toplines"][0]["polls"][0]["pollster"],
            "RCP Average"
        );
    }

    #[test]
    fn write_json_creates_parents_and_indents() {
        let dir = std::env::temp_dir().join("race-tracker-report-test");
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("data").join("out.json");

        write_json(&path, &serde_json::json!({"races": []})).unwrap();
        let body = fs::read_to_string(&path).unwrap();
        assert_eq!(body, "{\n  \"races\": []\n}");

        fs::remove_dir_all(&dir).unwrap();
    }
}
