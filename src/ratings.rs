//! Cook Political Report race ratings, with a hardcoded swing-state table
//! standing in whenever the live page cannot be parsed.

use crate::client::Client;
use crate::error::Result;
use crate::states::{code_to_name, is_state_code};
use crate::utils::strip_tags;
use crate::Fetched;
use lazy_regex::{regex, Regex};
use std::collections::BTreeMap;
use tracing::warn;

pub const RATINGS_URL: &str = "https://www.cookpolitical.com/ratings/senate-race-ratings";

/// A live scrape is only trusted when it matched at least this many states.
const MIN_LIVE_STATES: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct RaceRating {
    pub state_name: String,
    pub cook_rating: String,
}

fn rating(code: &str, label: &str) -> (String, RaceRating) {
    (
        code.to_string(),
        RaceRating {
            state_name: code_to_name(code).to_string(),
            cook_rating: label.to_string(),
        },
    )
}

/// Fallback swing-state table, used verbatim when the live scrape fails or
/// comes back too thin.
pub fn default_swing() -> BTreeMap<String, RaceRating> {
    BTreeMap::from([
        rating("NH", "Lean Democrat"),
        rating("GA", "Toss Up"),
        rating("ME", "Toss Up"),
        rating("MI", "Toss Up"),
        rating("NC", "Toss Up"),
        rating("AK", "Lean Republican"),
        rating("OH", "Lean Republican"),
    ])
}

/// The competitive bands of the ratings page, walked over its tag-stripped
/// text. Each band runs from its own label to the next band's.
fn parse_bands(text: &str) -> BTreeMap<String, RaceRating> {
    let bands: [(&Regex, &str); 3] = [
        (regex!(r"(?i)Lean D(.*?)Toss Up"), "Lean Democrat"),
        (regex!(r"(?i)Toss Up(.*?)Lean R"), "Toss Up"),
        (regex!(r"(?i)Lean R(.*?)Likely R"), "Lean Republican"),
    ];

    let mut out = BTreeMap::new();
    for (re, label) in bands {
        let Some(caps) = re.captures(text) else {
            continue;
        };
        // A band lists entries as "<code> <candidate name>".
        for entry in regex!(r"\b([A-Z]{2})\s+([A-Za-z\-’' ]{2,35})\b").captures_iter(&caps[1]) {
            let code = &entry[1];
            if is_state_code(code) {
                let (code, r) = rating(code, label);
                out.insert(code, r);
            }
        }
    }
    out
}

fn resolve(parsed: Result<BTreeMap<String, RaceRating>>) -> Fetched<BTreeMap<String, RaceRating>> {
    match parsed {
        Ok(out) if out.len() >= MIN_LIVE_STATES => Fetched::Live(out),
        Ok(out) => {
            warn!(
                "Ratings page matched only {} states, falling back to defaults",
                out.len()
            );
            Fetched::Fallback(default_swing())
        }
        Err(e) => {
            warn!("Ratings fetch failed ({}), falling back to defaults", e);
            Fetched::Fallback(default_swing())
        }
    }
}

pub async fn fetch_swing_ratings(client: &Client) -> Fetched<BTreeMap<String, RaceRating>> {
    let parsed = async {
        let raw = client.fetch_text(RATINGS_URL).await?;
        Ok(parse_bands(&strip_tags(&raw)))
    }
    .await;
    resolve(parsed)
}
