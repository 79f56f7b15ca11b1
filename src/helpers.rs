//! Text and URL helpers shared by the TPLC extraction code
//!
//! - Whitespace normalization of rendered cell text
//! - Defensive count parsing (`"1,234"` -> `Some(1234)`, `"N/A"` -> `None`)
//! - Link rewriting against the fixed site prefixes
//!
//! # Examples
//!
//! ```
//! use tplc_scraper::helpers::{parse_count, rewrite_parent_link};
//!
//! assert_eq!(parse_count(" 1,234 "), Some(1234));
//! assert_eq!(parse_count("n/a"), None);
//!
//! let link = rewrite_parent_link("../detail?id=9", "https://example.gov/cfdocs/");
//! assert_eq!(link, "https://example.gov/cfdocs/detail?id=9");
//! ```

use regex::Regex;
use scraper::ElementRef;
use std::sync::LazyLock;
use url::Url;

static RESULTS_PHRASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d[\d,]*)\s*results?").expect("valid results-count pattern"));

/// Collapse runs of whitespace into single spaces and trim the ends
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Rendered text of an element, whitespace-normalized
pub fn element_text(element: &ElementRef<'_>) -> String {
    normalize_ws(&element.text().collect::<String>())
}

/// Parse a count cell. Thousands separators are stripped; anything that is
/// not a plain run of ASCII digits afterwards yields `None`.
pub fn parse_count(s: &str) -> Option<u64> {
    let digits: String = s.trim().chars().filter(|c| *c != ',').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Rewrite a `../`-relative href onto `base`. Other hrefs are returned as-is.
pub fn rewrite_parent_link(href: &str, base: &str) -> String {
    if !href.starts_with("../") {
        return href.to_string();
    }
    let mut rest = href;
    while let Some(stripped) = rest.strip_prefix("../") {
        rest = stripped;
    }
    format!("{}{}", base, rest)
}

/// Resolve an href against `base`. `None` when either does not parse.
pub fn resolve_link(base: &str, href: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    base.join(href.trim()).ok().map(String::from)
}

/// Number of results reported by a results-count indicator such as
/// `"1,024 results for syringe"`. `None` when the text carries no count.
pub fn parse_result_count(text: &str) -> Option<u64> {
    let normalized = normalize_ws(text).to_lowercase();
    RESULTS_PHRASE
        .captures(&normalized)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_count(m.as_str()))
}

/// Clip page content for error diagnostics without splitting a character
pub fn truncate_for_log(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}... [{} bytes total]", &s[..idx], s.len()),
        None => s.to_string(),
    }
}
