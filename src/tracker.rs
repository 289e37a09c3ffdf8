//! Per-race primary tracker: configured races, encyclopedia page fetch and
//! per-race entry assembly.

use crate::client::Client;
use crate::error::Result;
use crate::snapshot::build_snapshot;
use crate::wikitable::{extract_notes, find_table, parse_table, PollRow};
use scraper::Html;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const PARSE_API: &str = "https://en.wikipedia.org/w/api.php";

/// Election day the tracker counts down to.
pub const PRIMARY_DAY: &str = "2026-05-19";

/// Hand-authored race configuration: which page to scrape, how to recognize
/// the polling table, and the candidate display order.
pub struct RaceSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub page: &'static str,
    pub required_headers: &'static [&'static str],
    pub candidates: &'static [&'static str],
    /// Names whose presence in the header marks a speculative table variant
    /// whose rows must not be published.
    pub excluded_header_names: &'static [&'static str],
}

pub const RACES: [RaceSpec; 6] = [
    RaceSpec {
        id: "us_senate_gop",
        name: "U.S. Senate (Republican Primary)",
        page: "2026_United_States_Senate_election_in_Alabama",
        required_headers: &[
            "Poll source",
            "Date(s)",
            "Jared Hudson",
            "Steve Marshall",
            "Barry Moore",
        ],
        candidates: &["Steve Marshall", "Barry Moore", "Jared Hudson"],
        excluded_header_names: &[],
    },
    RaceSpec {
        id: "governor_gop",
        name: "Governor (Republican Primary)",
        page: "2026_Alabama_gubernatorial_election",
        required_headers: &["Poll source", "Date(s)", "Ken McFeeters", "Tommy Tuberville"],
        candidates: &["Tommy Tuberville", "Ken McFeeters"],
        excluded_header_names: &[],
    },
    RaceSpec {
        id: "lt_governor_gop",
        name: "Lieutenant Governor (Republican Primary)",
        page: "2026_Alabama_lieutenant_gubernatorial_election",
        required_headers: &[
            "Poll source",
            "Date(s)",
            "Wes Allen",
            "A.J. McCarron",
            "Rick Pate",
        ],
        candidates: &[
            "Wes Allen",
            "A.J. McCarron",
            "Rick Pate",
            "Nicole Wadsworth",
            "John Wahl",
        ],
        excluded_header_names: &[],
    },
    RaceSpec {
        id: "attorney_general_gop",
        name: "Attorney General (Republican Primary)",
        page: "2026_Alabama_Attorney_General_election",
        required_headers: &[
            "Poll source",
            "Date(s)",
            "Pamela Casey",
            "Jay Mitchell",
            "Katherine Robertson",
        ],
        candidates: &["Jay Mitchell", "Katherine Robertson", "Pamela Casey"],
        excluded_header_names: &[],
    },
    RaceSpec {
        id: "secretary_of_state_gop",
        name: "Secretary of State (Republican Primary)",
        page: "2026_Alabama_Secretary_of_State_election",
        required_headers: &["Poll source", "Date(s)", "Caroleene Dobson", "Andrew Sorrell"],
        candidates: &["Andrew Sorrell", "Caroleene Dobson"],
        excluded_header_names: &[],
    },
    RaceSpec {
        id: "al1_house_gop",
        name: "AL-1 Congressional District (Republican Primary)",
        page: "2026_United_States_House_of_Representatives_elections_in_Alabama",
        required_headers: &["Poll source", "Date(s)", "Jerry Carl", "Rhett Marques"],
        candidates: &[
            "Jerry Carl",
            "Rhett Marques",
            "Jimmy Dees",
            "Joshua McKee",
            "John Mills",
            "James Richardson",
            "Austin Sidwell",
        ],
        // Speculative variant naming a non-candidate.
        excluded_header_names: &["Heather Moore"],
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub snapshot: Vec<String>,
    pub columns: Vec<String>,
    pub polls: Vec<PollRow>,
}

#[derive(Deserialize)]
struct ParseResponse {
    parse: Option<ParseBody>,
}

#[derive(Deserialize)]
struct ParseBody {
    #[serde(default)]
    text: String,
}

/// Compact candidate name for table columns.
fn display_name(name: &str) -> &str {
    name.split_whitespace().last().unwrap_or(name)
}

fn placeholder(spec: &RaceSpec, snapshot: &str) -> RaceEntry {
    RaceEntry {
        id: spec.id,
        name: spec.name,
        snapshot: vec![snapshot.to_string()],
        columns: vec![],
        polls: vec![],
    }
}

/// Builds one race entry. Any failure degrades to a placeholder entry; the
/// run never aborts over a single race.
pub async fn build_race_entry(client: &Client, spec: &RaceSpec) -> RaceEntry {
    match try_build(client, spec).await {
        Ok(entry) => entry,
        Err(e) => {
            warn!("Race {} not refreshed: {}", spec.id, e);
            placeholder(spec, "Unable to load this race in the current refresh.")
        }
    }
}

async fn try_build(client: &Client, spec: &RaceSpec) -> Result<RaceEntry> {
    let body = client
        .fetch_text_with_query(
            PARSE_API,
            &[
                ("action", "parse"),
                ("page", spec.page),
                ("prop", "text"),
                ("formatversion", "2"),
                ("format", "json"),
            ],
        )
        .await?;
    let response: ParseResponse = serde_json::from_str(&body)?;
    let html = response.parse.map(|p| p.text).unwrap_or_default();
    if html.is_empty() {
        return Ok(placeholder(
            spec,
            "Polling data is not currently available from the configured source.",
        ));
    }

    let doc = Html::parse_document(&html);
    let notes = extract_notes(&doc);
    let Some(table) = find_table(&doc, spec.required_headers) else {
        return Ok(placeholder(
            spec,
            "Polling table not found for this race on the source page.",
        ));
    };

    let parsed = parse_table(table, &notes, spec.candidates, spec.excluded_header_names);
    info!("Race {}: {} poll rows", spec.id, parsed.rows.len());

    Ok(RaceEntry {
        id: spec.id,
        name: spec.name,
        snapshot: build_snapshot(spec.name, &parsed),
        columns: parsed
            .candidates
            .iter()
            .map(|c| display_name(c).to_string())
            .collect(),
        polls: parsed.rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_names_compact_to_surname() {
        assert_eq!(display_name("A.J. McCarron"), "McCarron");
        assert_eq!(display_name("Steve Marshall"), "Marshall");
        assert_eq!(display_name("Tuberville"), "Tuberville");
    }

    #[test]
    fn race_ids_are_unique() {
        for (i, a) in RACES.iter().enumerate() {
            for b in &RACES[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn every_required_candidate_header_is_a_candidate_somewhere() {
        // Each race's display order must cover the headers it insists on.
        for race in &RACES {
            for header in race.required_headers {
                if *header == "Poll source" || *header == "Date(s)" {
                    continue;
                }
                assert!(
                    race.candidates.contains(header),
                    "{}: {} not in candidate order",
                    race.id,
                    header
                );
            }
        }
    }
}
