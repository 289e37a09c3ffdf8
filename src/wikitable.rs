//! Polling-table extraction from rendered encyclopedia HTML.
//!
//! Pages render polls as `table.wikitable` elements. A race is matched to
//! its table by required header tokens, candidate columns are detected by
//! name and put back into the requested display order, and each row gets a
//! computed spread line.

use crate::utils::{clean_text, first_number};
use lazy_regex::regex;
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Keep only the most recent rows of a matched table.
pub const MAX_ROWS: usize = 8;

/// Column offset used when none of the requested candidate names appears in
/// the header row: poll source, dates, sample, margin of error come first.
const CANDIDATE_COLUMN_OFFSET: usize = 4;

const E: &str = "Invalid selector";
lazy_static! {
    static ref WIKITABLE: Selector = Selector::parse("table.wikitable").expect(E);
    static ref TR: Selector = Selector::parse("tr").expect(E);
    static ref TH: Selector = Selector::parse("th").expect(E);
    static ref TD: Selector = Selector::parse("td").expect(E);
    static ref CITE_NOTE: Selector = Selector::parse(r#"li[id^="cite_note-"]"#).expect(E);
    static ref NOTE_LINK: Selector = Selector::parse(r#"a[href^="http"]"#).expect(E);
    static ref REF_LINK: Selector = Selector::parse(r#"sup.reference a"#).expect(E);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollRow {
    pub pollster: String,
    pub pollster_url: String,
    pub date: String,
    pub sample: String,
    pub values: Vec<String>,
    pub spread: String,
}

/// One matched polling table: ordered candidate columns plus the most
/// recent rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PollTable {
    pub candidates: Vec<String>,
    pub rows: Vec<PollRow>,
}

fn cell_text(el: ElementRef) -> String {
    clean_text(&el.text().collect::<Vec<_>>().join(" "))
}

fn header_cells(table: ElementRef) -> Vec<String> {
    table
        .select(&TR)
        .next()
        .map(|tr| tr.select(&TH).map(cell_text).collect())
        .unwrap_or_default()
}

/// Resolves `cite_note` list items to their first external link, so a
/// pollster's citation superscript can be turned into a source URL.
pub fn extract_notes(doc: &Html) -> HashMap<String, String> {
    let mut notes = HashMap::new();
    for li in doc.select(&CITE_NOTE) {
        let Some(id) = li.value().attr("id") else {
            continue;
        };
        if let Some(href) = li
            .select(&NOTE_LINK)
            .filter_map(|a| a.value().attr("href"))
            .next()
        {
            notes.insert(id.to_string(), href.to_string());
        }
    }
    notes
}

/// First table whose header row contains every required token, in any
/// order and possibly among extra tokens.
pub fn find_table<'a>(doc: &'a Html, must_include: &[&str]) -> Option<ElementRef<'a>> {
    doc.select(&WIKITABLE).find(|table| {
        let joined = header_cells(*table).join(" | ");
        must_include.iter().all(|tok| joined.contains(tok))
    })
}

/// Extracts the candidate columns and poll rows of a matched table.
///
/// Candidate columns run from the first header naming a requested candidate
/// (positional fallback when none matches) up to an "Other"/"Undecided"
/// column. Requested display order wins; columns the request did not name
/// are appended. Row cells are aligned to the header from the right, which
/// tolerates rows carrying an extra leading cell.
///
/// `excluded_header_names` drops the whole row set when the header names
/// someone who is not actually a candidate (speculative table variants).
pub fn parse_table(
    table: ElementRef,
    notes: &HashMap<String, String>,
    target_candidates: &[&str],
    excluded_header_names: &[&str],
) -> PollTable {
    let headers = header_cells(table);
    if headers.is_empty() {
        return PollTable::default();
    }

    let region_start = headers
        .iter()
        .position(|h| target_candidates.contains(&h.as_str()))
        .unwrap_or_else(|| CANDIDATE_COLUMN_OFFSET.min(headers.len()));
    let region_end = headers[region_start..]
        .iter()
        .position(|h| {
            let h = h.to_lowercase();
            h == "other" || h == "undecided"
        })
        .map_or(headers.len(), |p| region_start + p);
    let candidate_headers = &headers[region_start..region_end];

    // Requested display order where possible, unseen columns appended.
    let mut candidates: Vec<String> = target_candidates
        .iter()
        .filter(|c| candidate_headers.iter().any(|h| h == *c))
        .map(|c| c.to_string())
        .collect();
    for h in candidate_headers {
        if !candidates.contains(h) {
            candidates.push(h.clone());
        }
    }
    let column_of: Vec<usize> = candidates
        .iter()
        .map(|c| {
            region_start
                + candidate_headers
                    .iter()
                    .position(|h| h == c)
                    .unwrap_or_default()
        })
        .collect();

    let joined_headers = headers.join(" ");
    if excluded_header_names
        .iter()
        .any(|name| joined_headers.contains(name))
    {
        return PollTable {
            candidates,
            rows: vec![],
        };
    }

    let mut rows = vec![];
    for tr in table.select(&TR).skip(1) {
        let tds: Vec<ElementRef> = tr.select(&TD).collect();
        // Pollster, dates and sample cells must stay clear of the
        // right-aligned candidate cells.
        let trailing = headers.len() - region_start;
        if tds.len() < trailing + 3 {
            continue;
        }

        let pollster = cell_text(tds[0]);
        if pollster.is_empty() {
            continue;
        }
        let pollster = regex!(r"\s*\(R\)\s*$").replace(&pollster, "").to_string();

        let date = cell_text(tds[1]);
        let sample = cell_text(tds[2]);

        let pollster_url = tds[0]
            .select(&REF_LINK)
            .filter_map(|a| a.value().attr("href"))
            .find_map(|href| href.strip_prefix('#'))
            .and_then(|id| notes.get(id))
            .cloned()
            .unwrap_or_default();

        let values: Vec<String> = column_of
            .iter()
            .map(|&p| cell_text(tds[tds.len() - (headers.len() - p)]))
            .collect();
        let spread = spread_line(&candidates, &values);

        rows.push(PollRow {
            pollster,
            pollster_url,
            date,
            sample,
            values,
            spread,
        });
        if rows.len() == MAX_ROWS {
            break;
        }
    }

    PollTable { candidates, rows }
}

/// Leading-margin line for one poll row, e.g. `"Marshall +5"`. Ties break
/// to the first maximal value; any unparseable value marks the spread
/// unknown.
pub fn spread_line(candidates: &[String], values: &[String]) -> String {
    let numeric: Option<Vec<f64>> = values.iter().map(|v| first_number(v)).collect();
    let Some(numeric) = numeric else {
        return "—".to_string();
    };
    if numeric.len() < 2 {
        return "—".to_string();
    }

    let winner = numeric
        .iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| a.partial_cmp(b).unwrap().then(ib.cmp(ia)))
        .map(|(i, _)| i)
        .unwrap_or_default();
    let mut sorted = numeric.clone();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap());
    let lead = sorted[0] - sorted[1];

    let surname = candidates[winner]
        .split_whitespace()
        .last()
        .unwrap_or_default();
    format!("{} +{:.1}", surname, lead).replace(".0", "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table_of(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn locator_requires_every_token() {
        let doc = table_of(concat!(
            r#"<table class="wikitable"><tr><th>Poll source</th><th>Smith</th></tr></table>"#,
            r#"<table class="wikitable"><tr><th>Extra</th><th>Poll source</th>"#,
            r#"<th>Date(s)</th><th>Jones</th></tr></table>"#,
        ));
        let t = find_table(&doc, &["Poll source", "Date(s)", "Jones"]).expect("table");
        assert!(header_cells(t).contains(&"Jones".to_string()));
        assert!(find_table(&doc, &["Poll source", "Date(s)", "Nobody"]).is_none());
    }

    #[test]
    fn parses_single_row_with_short_header() {
        let doc = table_of(
            r#"<table class="wikitable">
                <tr><th>Poll source</th><th>Date(s)</th><th>A</th><th>B</th><th>Other</th></tr>
                <tr><td>Pollster X</td><td>1/1-1/2</td><td>500 LV</td>
                    <td>40</td><td>35</td><td>5</td></tr>
            </table>"#,
        );
        let table = find_table(&doc, &["Poll source", "Date(s)", "A", "B", "Other"]).unwrap();
        let parsed = parse_table(table, &HashMap::new(), &["A", "B"], &[]);

        assert_eq!(parsed.candidates, vec!["A", "B"]);
        assert_eq!(parsed.rows.len(), 1);
        let row = &parsed.rows[0];
        assert_eq!(row.pollster, "Pollster X");
        assert_eq!(row.date, "1/1-1/2");
        assert_eq!(row.sample, "500 LV");
        assert_eq!(row.values, vec!["40", "35"]);
        assert_eq!(row.spread, "A +5");
    }

    #[test]
    fn requested_order_wins_and_unseen_columns_append() {
        let doc = table_of(
            r#"<table class="wikitable">
                <tr><th>Poll source</th><th>Date(s)</th><th>Sample</th><th>MoE</th>
                    <th>Barry Moore</th><th>Steve Marshall</th><th>Jared Hudson</th>
                    <th>Undecided</th></tr>
                <tr><td>Acme</td><td>2/1-2/3</td><td>600 LV</td><td>±4%</td>
                    <td>20</td><td>41</td><td>7</td><td>32</td></tr>
            </table>"#,
        );
        let table = find_table(&doc, &["Poll source"]).unwrap();
        let parsed = parse_table(table, &HashMap::new(), &["Steve Marshall", "Barry Moore"], &[]);

        assert_eq!(
            parsed.candidates,
            vec!["Steve Marshall", "Barry Moore", "Jared Hudson"]
        );
        assert_eq!(parsed.rows[0].values, vec!["41", "20", "7"]);
        assert_eq!(parsed.rows[0].spread, "Marshall +21");
    }

    #[test]
    fn unparseable_value_marks_spread_unknown() {
        let doc = table_of(
            r#"<table class="wikitable">
                <tr><th>Poll source</th><th>Date(s)</th><th>A</th><th>B</th><th>Other</th></tr>
                <tr><td>Pollster Y</td><td>1/5</td><td>RV</td>
                    <td>—</td><td>35</td><td>5</td></tr>
            </table>"#,
        );
        let table = find_table(&doc, &["Poll source"]).unwrap();
        let parsed = parse_table(table, &HashMap::new(), &["A", "B"], &[]);
        assert_eq!(parsed.rows[0].spread, "—");
    }

    #[test]
    fn citation_superscript_resolves_to_source_url() {
        let doc = table_of(
            r##"<ol><li id="cite_note-px-1">
                <a href="#top">jump</a>
                <a href="https://example.com/poll.pdf">source</a>
            </li></ol>
            <table class="wikitable">
                <tr><th>Poll source</th><th>Date(s)</th><th>A</th><th>B</th><th>Other</th></tr>
                <tr><td>Pollster X (R) <sup class="reference">
                        <a href="#cite_note-px-1">[1]</a></sup></td>
                    <td>1/1</td><td>500 LV</td><td>40</td><td>35</td><td>5</td></tr>
            </table>"##,
        );
        let notes = extract_notes(&doc);
        assert_eq!(notes["cite_note-px-1"], "https://example.com/poll.pdf");

        let table = find_table(&doc, &["Poll source"]).unwrap();
        let parsed = parse_table(table, &notes, &["A", "B"], &[]);
        assert_eq!(parsed.rows[0].pollster, "Pollster X");
        assert_eq!(parsed.rows[0].pollster_url, "https://example.com/poll.pdf");
    }

    #[test]
    fn excluded_header_name_drops_rows() {
        let doc = table_of(
            r#"<table class="wikitable">
                <tr><th>Poll source</th><th>Date(s)</th><th>A</th><th>Heather Moore</th></tr>
                <tr><td>Pollster Z</td><td>1/1</td><td>LV</td><td>40</td><td>35</td></tr>
            </table>"#,
        );
        let table = find_table(&doc, &["Poll source"]).unwrap();
        let parsed = parse_table(table, &HashMap::new(), &["A"], &["Heather Moore"]);
        assert!(parsed.rows.is_empty());
    }

    #[test]
    fn spread_tie_breaks_to_first_maximum() {
        let candidates = vec!["Ann Alpha".to_string(), "Bob Beta".to_string()];
        assert_eq!(
            spread_line(&candidates, &["40".to_string(), "40".to_string()]),
            "Alpha +0"
        );
        assert_eq!(
            spread_line(&candidates, &["29.5".to_string(), "17.8".to_string()]),
            "Alpha +11.7"
        );
    }
}
