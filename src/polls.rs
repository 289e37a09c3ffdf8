//! Polling-aggregator references, static topline tables and per-race
//! summary bullets for the swing-state report.

use crate::client::Client;
use crate::utils::{first_number, search_url};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollingRef {
    pub source: String,
    pub value: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToplineRow {
    pub pollster: String,
    pub date: String,
    pub sample: String,
    pub values: Vec<String>,
    pub spread: String,
}

/// A race's standardized topline table: contest labels, candidate order and
/// poll rows, the first row being the aggregate average.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToplineBlock {
    pub contest: String,
    pub race_name: String,
    pub candidates: Vec<String>,
    pub polls: Vec<ToplineRow>,
}

fn topline_row(
    pollster: &str,
    date: &str,
    sample: &str,
    values: &[&str],
    spread: &str,
) -> ToplineRow {
    ToplineRow {
        pollster: pollster.to_string(),
        date: date.to_string(),
        sample: sample.to_string(),
        values: values.iter().map(|v| v.to_string()).collect(),
        spread: spread.to_string(),
    }
}

/// Static topline tables for races with a standardized table loaded.
pub fn default_toplines(state_code: &str) -> Vec<ToplineBlock> {
    if state_code != "GA" {
        return vec![];
    }
    vec![ToplineBlock {
        contest: "2026 Georgia Senate".to_string(),
        race_name: "2026 Georgia Senate - Republican Primary".to_string(),
        candidates: vec![
            "Collins".to_string(),
            "Carter".to_string(),
            "Dooley".to_string(),
        ],
        polls: vec![
            topline_row(
                "RCP Average",
                "7/28 - 2/18",
                "—",
                &["29.5", "17.8", "10.3"],
                "Collins +11.7",
            ),
            topline_row(
                "Quantus Insights",
                "2/17 - 2/18",
                "1337 LV",
                &["36", "11", "9"],
                "Collins +25",
            ),
            topline_row(
                "InsiderAdvantage/Rosetta",
                "12/18 - 12/19",
                "1000 LV",
                &["25", "20", "12"],
                "Collins +5",
            ),
            topline_row(
                "Atlanta Journal-Constitution",
                "10/13 - 10/21",
                "1000 LV",
                &["30", "20", "12"],
                "Collins +10",
            ),
            topline_row(
                "TIPP**",
                "7/28 - 8/1",
                "RV",
                &["27", "20", "8"],
                "Collins +7",
            ),
        ],
    }]
}

fn aggregator_ref(source: &str, value: &str, url: String) -> PollingRef {
    PollingRef {
        source: source.to_string(),
        value: value.to_string(),
        url,
    }
}

/// Polling-aggregator links for a state: the race page is probed for known
/// aggregator names, then the static search links are appended.
pub async fn polling_refs(client: &Client, state_name: &str) -> Vec<PollingRef> {
    let mut refs = vec![];
    let race_page = format!(
        "https://en.wikipedia.org/wiki/2026_United_States_Senate_election_in_{}",
        state_name.replace(' ', "_")
    );

    match client.fetch_text(&race_page).await {
        Ok(page) => {
            if page.contains("RealClearPolitics") {
                refs.push(aggregator_ref(
                    "RealClearPolitics",
                    "See aggregate on race page",
                    race_page.clone(),
                ));
            }
            if page.contains("Race to the WH") || page.contains("RaceToTheWH") {
                refs.push(aggregator_ref(
                    "Race to the WH",
                    "See aggregate on race page",
                    race_page.clone(),
                ));
            }
            if page.contains("Decision Desk HQ") {
                refs.push(aggregator_ref(
                    "Decision Desk HQ",
                    "See aggregate on race page",
                    race_page.clone(),
                ));
            }
        }
        Err(e) => warn!("Race page probe failed for {}: {}", state_name, e),
    }

    refs.push(aggregator_ref(
        "RealClearPolitics",
        "Latest polling links",
        search_url(
            "https://www.realclearpolitics.com/search/",
            &[(
                "q",
                &format!("{state_name} senate race polls 2026 realclearpolitics"),
            )],
        ),
    ));
    refs.push(aggregator_ref(
        "Race to the WH",
        "Polling + forecast search",
        search_url(
            "https://www.racetothewh.com/search",
            &[("q", &format!("{state_name} senate race 2026 polling"))],
        ),
    ));
    refs.push(aggregator_ref(
        "Decision Desk HQ",
        "Polling aggregate search",
        search_url(
            "https://duckduckgo.com/",
            &[(
                "q",
                &format!(
                    "site:decisiondeskhq.com {state_name} senate race 2026 polling aggregate"
                ),
            )],
        ),
    ));
    refs
}

/// Narrative bullets for a swing state, from its toplines and how much
/// market coverage matched.
pub fn summarize_race(
    state_name: &str,
    cook_rating: &str,
    toplines: &[ToplineBlock],
    polymarket_count: usize,
    kalshi_count: usize,
) -> Vec<String> {
    let mut bullets = vec![];

    match toplines.first().filter(|block| !block.polls.is_empty()) {
        Some(block) => {
            let average = &block.polls[0];
            let values: Option<Vec<f64>> =
                average.values.iter().map(|v| first_number(v)).collect();

            let mut leader = "";
            if let Some(values) = values.filter(|v| !v.is_empty() && !block.candidates.is_empty())
            {
                let leader_idx = values
                    .iter()
                    .enumerate()
                    .max_by(|(ia, a), (ib, b)| a.partial_cmp(b).unwrap().then(ib.cmp(ia)))
                    .map(|(i, _)| i)
                    .unwrap_or_default();
                leader = &block.candidates[leader_idx];
                bullets.push(format!(
                    "Polling toplines show {leader} ahead in the {state_name} Republican primary (RCP Average: {}).",
                    average.spread
                ));
            }

            if let Some(latest) = block.polls.get(1) {
                bullets.push(format!(
                    "Latest listed survey is {} ({}, {}), showing {}.",
                    latest.pollster, latest.date, latest.sample, latest.spread
                ));
            }

            if !leader.is_empty() {
                bullets.push(format!(
                    "Across listed polls, {leader} leads each release, indicating a clear name-recognition and vote-intent advantage at this stage."
                ));
            }
        }
        None => {
            bullets.push(format!(
                "{state_name} is currently rated {cook_rating} by Cook Political Report."
            ));
            bullets.push(
                "No standardized primary topline table has been loaded yet for this race page."
                    .to_string(),
            );
        }
    }

    if polymarket_count + kalshi_count > 0 {
        bullets.push(format!(
            "Prediction market coverage is active ({polymarket_count} Polymarket / {kalshi_count} Kalshi listings currently matched)."
        ));
    } else {
        bullets.push(
            "Prediction market activity for this specific primary appears limited or not yet listed in the matched feeds."
                .to_string(),
        );
    }

    bullets.push(
        "Fundraising toplines are not yet integrated in this release; adding FEC candidate receipts/disbursements is the next data upgrade."
            .to_string(),
    );
    bullets
}
