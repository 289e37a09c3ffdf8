use lazy_regex::regex;
use std::borrow::Borrow;

/// Strips `[..]` citation markers and collapses runs of whitespace.
pub fn clean_text(text: &str) -> String {
    let text = regex!(r"\[[^\]]+\]").replace_all(text, "");
    let text = regex!(r"\s+").replace_all(text.borrow(), " ");
    text.trim().to_string()
}

/// Replaces markup tags with spaces and collapses whitespace, leaving the
/// visible text of an HTML fragment on a single line.
pub fn strip_tags(html: &str) -> String {
    let text = regex!(r"<[^>]+>").replace_all(html, " ");
    let text = regex!(r"\s+").replace_all(text.borrow(), " ");
    unescape_entities(text.trim())
}

/// Decodes the handful of entities that actually show up in the scraped
/// pages. Unknown entities pass through untouched.
pub fn unescape_entities(text: &str) -> String {
    regex!(r"&(#x?[0-9a-fA-F]+|[a-zA-Z]+);")
        .replace_all(text, |caps: &lazy_regex::Captures| {
            let body = &caps[1];
            match body {
                "amp" => "&".to_string(),
                "lt" => "<".to_string(),
                "gt" => ">".to_string(),
                "quot" => "\"".to_string(),
                "apos" => "'".to_string(),
                "nbsp" => " ".to_string(),
                "ndash" => "\u{2013}".to_string(),
                "mdash" => "\u{2014}".to_string(),
                _ => decode_numeric(body).unwrap_or_else(|| caps[0].to_string()),
            }
        })
        .into_owned()
}

fn decode_numeric(body: &str) -> Option<String> {
    let code = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()?
    } else if let Some(dec) = body.strip_prefix('#') {
        dec.parse().ok()?
    } else {
        return None;
    };
    char::from_u32(code).map(String::from)
}

/// Builds a search link with an encoded query string. Bases are static and
/// always parse; a bad base degrades to itself.
pub fn search_url(base: &str, params: &[(&str, &str)]) -> String {
    reqwest::Url::parse_with_params(base, params)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| base.to_string())
}

/// First embedded number in a cell, e.g. `"40%"` -> 40.0, `"~35.5"` -> 35.5.
/// Strings without digits have no extractable value.
pub fn first_number(value: &str) -> Option<f64> {
    regex!(r"([0-9]+(?:\.[0-9]+)?)")
        .captures(value)
        .and_then(|c| c[1].parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clean_strips_citations_and_whitespace() {
        assert_eq!(clean_text("  Steve   Marshall[1][a]\n"), "Steve Marshall");
        assert_eq!(clean_text("40[note 2]"), "40");
    }

    #[test]
    fn strip_tags_flattens_markup() {
        assert_eq!(
            strip_tags("<td><b>Toss&nbsp;Up</b></td>\n<td>GA &amp; ME</td>"),
            "Toss Up GA & ME"
        );
    }

    #[test]
    fn first_number_takes_first_token() {
        assert_eq!(first_number("40"), Some(40.0));
        assert_eq!(first_number("29.5%"), Some(29.5));
        assert_eq!(first_number("~12.3 (est)"), Some(12.3));
        assert_eq!(first_number("500 LV"), Some(500.0));
    }

    #[test]
    fn first_number_unavailable_without_digits() {
        assert_eq!(first_number("—"), None);
        assert_eq!(first_number(""), None);
        assert_eq!(first_number("n/a"), None);
    }

    #[test]
    fn entities_decode_including_numeric() {
        assert_eq!(unescape_entities("O&#39;Brien &amp; Co"), "O'Brien & Co");
        assert_eq!(unescape_entities("&#x2013; &unknown;"), "\u{2013} &unknown;");
    }
}
