//! Human-readable bullets summarizing a race's polling table.

use crate::utils::first_number;
use crate::wikitable::PollTable;

/// Majority threshold the leader is checked against.
const MAJORITY: f64 = 50.0;

/// Pure function of the parsed table: leader of the most recent row, the
/// next-most-recent release, and whether anyone is near a majority.
pub fn build_snapshot(race_name: &str, table: &PollTable) -> Vec<String> {
    let Some(first) = table.rows.first() else {
        return vec![format!(
            "No currently published polling table was found for {race_name}."
        )];
    };

    let values: Option<Vec<f64>> = first.values.iter().map(|v| first_number(v)).collect();
    let mut bullets = vec![];

    match &values {
        Some(vals) if vals.len() >= 2 => {
            let leader_idx = vals
                .iter()
                .enumerate()
                .max_by(|(ia, a), (ib, b)| a.partial_cmp(b).unwrap().then(ib.cmp(ia)))
                .map(|(i, _)| i)
                .unwrap_or_default();
            bullets.push(format!(
                "{} leads the most recent published poll row ({}).",
                table.candidates[leader_idx], first.spread
            ));
        }
        _ => {
            bullets.push(
                "The most recent poll row shows a fragmented field with no clear majority."
                    .to_string(),
            );
        }
    }

    if let Some(second) = table.rows.get(1) {
        bullets.push(format!(
            "Next-most-recent row is {} ({}, {}).",
            second.pollster, second.date, second.sample
        ));
    }

    let below_majority = matches!(
        &values,
        Some(vals) if vals.len() >= 2
            && vals.iter().fold(f64::MIN, |m, v| m.max(*v)) < MAJORITY
    );
    if below_majority {
        bullets.push(
            "No candidate is near an outright majority in recent toplines, keeping runoff dynamics relevant."
                .to_string(),
        );
    } else {
        bullets.push("Recent toplines show a clear front-runner advantage.".to_string());
    }

    bullets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wikitable::PollRow;
    use pretty_assertions::assert_eq;

    fn row(pollster: &str, date: &str, sample: &str, values: &[&str], spread: &str) -> PollRow {
        PollRow {
            pollster: pollster.to_string(),
            pollster_url: String::new(),
            date: date.to_string(),
            sample: sample.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
            spread: spread.to_string(),
        }
    }

    #[test]
    fn empty_table_yields_single_placeholder() {
        let bullets = build_snapshot("Governor (Republican Primary)", &PollTable::default());
        assert_eq!(
            bullets,
            vec![
                "No currently published polling table was found for Governor (Republican Primary)."
            ]
        );
    }

    #[test]
    fn leader_and_runoff_note_below_majority() {
        let table = PollTable {
            candidates: vec!["Steve Marshall".to_string(), "Barry Moore".to_string()],
            rows: vec![
                row("Acme", "2/1-2/3", "600 LV", &["41", "20"], "Marshall +21"),
                row("Beta Poll", "1/5-1/7", "500 LV", &["38", "22"], "Marshall +16"),
            ],
        };
        let bullets = build_snapshot("U.S. Senate (Republican Primary)", &table);
        assert_eq!(
            bullets,
            vec![
                "Steve Marshall leads the most recent published poll row (Marshall +21).",
                "Next-most-recent row is Beta Poll (1/5-1/7, 500 LV).",
                "No candidate is near an outright majority in recent toplines, keeping runoff dynamics relevant.",
            ]
        );
    }

    #[test]
    fn majority_leader_gets_front_runner_note() {
        let table = PollTable {
            candidates: vec!["Tommy Tuberville".to_string(), "Ken McFeeters".to_string()],
            rows: vec![row("Acme", "2/1", "600 LV", &["62", "11"], "Tuberville +51")],
        };
        let bullets = build_snapshot("Governor (Republican Primary)", &table);
        assert_eq!(bullets.len(), 2);
        assert_eq!(
            bullets[1],
            "Recent toplines show a clear front-runner advantage."
        );
    }

    #[test]
    fn unparseable_values_flag_fragmented_field() {
        let table = PollTable {
            candidates: vec!["A".to_string(), "B".to_string()],
            rows: vec![row("Acme", "2/1", "RV", &["—", "20"], "—")],
        };
        let bullets = build_snapshot("race", &table);
        assert_eq!(
            bullets[0],
            "The most recent poll row shows a fragmented field with no clear majority."
        );
    }
}
