//! Static state lookup tables shared by every source parser.

/// Full state name to postal code, all fifty states.
pub const STATE_CODES: [(&str, &str); 50] = [
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("Delaware", "DE"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Hawaii", "HI"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Iowa", "IA"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Maine", "ME"),
    ("Maryland", "MD"),
    ("Massachusetts", "MA"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Mississippi", "MS"),
    ("Missouri", "MO"),
    ("Montana", "MT"),
    ("Nebraska", "NE"),
    ("Nevada", "NV"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("New York", "NY"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Vermont", "VT"),
    ("Virginia", "VA"),
    ("Washington", "WA"),
    ("West Virginia", "WV"),
    ("Wisconsin", "WI"),
    ("Wyoming", "WY"),
];

/// 2026 Senate election map coverage (regular + expected specials surfaced
/// in ratings).
pub const SENATE_ELECTION_STATES: [&str; 34] = [
    "AL", "AK", "AR", "CO", "DE", "GA", "ID", "IL", "IA", "KS", "KY", "LA", "ME", "MA", "MI",
    "MN", "MS", "MT", "NE", "NH", "NJ", "NM", "NC", "OH", "OK", "OR", "RI", "SC", "SD", "TN",
    "TX", "VA", "WV", "WY",
];

pub fn name_to_code(name: &str) -> Option<&'static str> {
    STATE_CODES
        .iter()
        .find(|(state_name, _)| *state_name == name)
        .map(|(_, code)| *code)
}

/// Resolves a postal code back to the state name. Unknown codes come back
/// unchanged so callers can render them as-is.
pub fn code_to_name(code: &str) -> &str {
    STATE_CODES
        .iter()
        .find(|(_, c)| *c == code)
        .map_or(code, |(state_name, _)| state_name)
}

pub fn is_state_code(code: &str) -> bool {
    STATE_CODES.iter().any(|(_, c)| *c == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        assert_eq!(name_to_code("New Hampshire"), Some("NH"));
        assert_eq!(code_to_name("NH"), "New Hampshire");
        assert_eq!(code_to_name("ZZ"), "ZZ");
        assert!(is_state_code("GA"));
        assert!(!is_state_code("DC"));
    }

    #[test]
    fn every_senate_state_is_known() {
        for code in SENATE_ELECTION_STATES {
            assert!(is_state_code(code), "unknown code {code}");
        }
    }
}
