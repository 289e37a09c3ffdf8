//! State primary dates from the NCSL calendar page, overlaid on a fallback
//! table covering every 2026 Senate-election state.

use crate::client::Client;
use crate::error::Result;
use crate::states::name_to_code;
use crate::utils::unescape_entities;
use crate::Fetched;
use chrono::{Datelike, NaiveDate};
use lazy_regex::regex;
use std::collections::BTreeMap;
use tracing::warn;

pub const CALENDAR_URL: &str =
    "https://www.ncsl.org/elections-and-campaigns/2026-state-primary-election-dates";

/// Fallback primary dates for 2026 Senate-election states. Live rows
/// override these entry by entry when the page parses.
pub fn default_primary_dates() -> BTreeMap<String, String> {
    [
        ("AL", "May 19, 2026"),
        ("AK", "August 18, 2026"),
        ("AR", "March 3, 2026"),
        ("CO", "June 30, 2026"),
        ("DE", "September 10, 2026"),
        ("GA", "May 19, 2026"),
        ("ID", "May 19, 2026"),
        ("IL", "March 17, 2026"),
        ("IA", "June 2, 2026"),
        ("KS", "August 4, 2026"),
        ("KY", "May 19, 2026"),
        ("LA", "November 3, 2026"),
        ("ME", "June 9, 2026"),
        ("MA", "September 8, 2026"),
        ("MI", "August 4, 2026"),
        ("MN", "August 11, 2026"),
        ("MS", "March 10, 2026"),
        ("MT", "June 2, 2026"),
        ("NE", "May 12, 2026"),
        ("NH", "September 8, 2026"),
        ("NJ", "June 2, 2026"),
        ("NM", "June 2, 2026"),
        ("NC", "March 3, 2026"),
        ("OH", "May 5, 2026"),
        ("OK", "June 16, 2026"),
        ("OR", "May 19, 2026"),
        ("RI", "September 8, 2026"),
        ("SC", "June 9, 2026"),
        ("SD", "June 2, 2026"),
        ("TN", "August 6, 2026"),
        ("TX", "March 3, 2026"),
        ("VA", "June 16, 2026"),
        ("WV", "May 12, 2026"),
        ("WY", "August 18, 2026"),
    ]
    .into_iter()
    .map(|(code, date)| (code.to_string(), date.to_string()))
    .collect()
}

/// `"05/19/2026"` -> `"May 19, 2026"`.
fn format_mmddyyyy(raw: &str) -> Option<String> {
    let d = NaiveDate::parse_from_str(raw, "%m/%d/%Y").ok()?;
    Some(format!("{} {}, {}", d.format("%B"), d.day(), d.year()))
}

/// Matches calendar rows like `<td>Georgia</td><td>05/19/2026</td>`.
fn parse_rows(raw: &str) -> BTreeMap<String, String> {
    let mut dates = BTreeMap::new();
    for caps in
        regex!(r">([A-Za-z ]+)</td>\s*<td>\s*([0-9]{2}/[0-9]{2}/[0-9]{4})\s*</td>").captures_iter(raw)
    {
        let state_name = unescape_entities(caps[1].trim());
        let (Some(code), Some(date)) = (name_to_code(&state_name), format_mmddyyyy(&caps[2]))
        else {
            continue;
        };
        dates.insert(code.to_string(), date);
    }
    dates
}

/// Live dates overlaid on the defaults. Any fetch or parse problem leaves
/// the defaults untouched.
pub async fn fetch_primary_dates(client: &Client) -> Fetched<BTreeMap<String, String>> {
    let live: Result<BTreeMap<String, String>> = async {
        let raw = client.fetch_text(CALENDAR_URL).await?;
        Ok(parse_rows(&raw))
    }
    .await;

    let mut merged = default_primary_dates();
    match live {
        Ok(live) if !live.is_empty() => {
            merged.extend(live);
            Fetched::Live(merged)
        }
        Ok(_) => {
            warn!("Calendar page yielded no rows, using default dates");
            Fetched::Fallback(merged)
        }
        Err(e) => {
            warn!("Calendar fetch failed ({}), using default dates", e);
            Fetched::Fallback(merged)
        }
    }
}
