//! List marker recognition.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{roman_value, ListMarker, MarkerKind};

/// Glyphs accepted as bullet markers.
pub const BULLETS: &[char] = &['•', '●', '◦', '▪', '▫', '■', '□', '◆', '◇', '-', '*'];

static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([•●◦▪▫■□◆◇*-])\s+\S").expect("valid bullet regex"));
static NUMERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)([.)])\s+\S").expect("valid numeric regex"));
static ROMAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([ivxIVX]+)([.)])\s+\S").expect("valid roman regex"));
static LETTERED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-zA-Z])([.)])\s+\S").expect("valid lettered regex"));
static BARE_ORDERED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+|[a-zA-Z]|[ivxIVX]+)[.)]$").expect("valid marker regex"));

/// Recognize a list marker at the start of `text`.
///
/// Returns the marker and its length in characters (delimiter included,
/// trailing whitespace excluded). The marker must be followed by
/// whitespace and more text. A lone `i`, `v` or `x` is reported as roman;
/// callers that track lettered sequences may reinterpret it.
pub fn parse_marker(text: &str) -> Option<(ListMarker, usize)> {
    let text = text.trim_start();

    if let Some(caps) = BULLET_RE.captures(text) {
        let symbol = caps.get(1)?.as_str();
        return Some((ListMarker::bullet(symbol), 1));
    }

    let ordered = |caps: regex::Captures<'_>, kind: MarkerKind| {
        let label = caps.get(1)?.as_str();
        let delimiter = caps.get(2)?.as_str().chars().next()?;
        let len = label.chars().count() + 1;
        Some((ListMarker::ordered(kind, label, delimiter), len))
    };

    if let Some(caps) = NUMERIC_RE.captures(text) {
        return ordered(caps, MarkerKind::Numeric);
    }
    if let Some(caps) = ROMAN_RE.captures(text) {
        let label = caps.get(1)?.as_str();
        let uniform_case = label.chars().all(|c| c.is_lowercase())
            || label.chars().all(|c| c.is_uppercase());
        if uniform_case && roman_value(label).is_some() {
            return ordered(caps, MarkerKind::Roman);
        }
    }
    if let Some(caps) = LETTERED_RE.captures(text) {
        return ordered(caps, MarkerKind::Lettered);
    }
    None
}

/// Check whether `text` is nothing but a list marker (`•`, `1.`, `b)`).
pub fn is_bare_marker(text: &str) -> bool {
    let trimmed = text.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if BULLETS.contains(&c) => true,
        (Some(_), Some(_)) => BARE_ORDERED_RE.is_match(trimmed),
        _ => false,
    }
}

/// Check whether `text` is a single bullet glyph.
pub fn is_bullet(text: &str) -> bool {
    let mut chars = text.trim().chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if BULLETS.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(text: &str) -> Option<MarkerKind> {
        parse_marker(text).map(|(m, _)| m.kind)
    }

    #[test]
    fn test_bullet_markers() {
        let (marker, len) = parse_marker("• Apple").unwrap();
        assert_eq!(marker.kind, MarkerKind::Bullet);
        assert_eq!(marker.label, "•");
        assert_eq!(len, 1);

        assert_eq!(kind("- dash item"), Some(MarkerKind::Bullet));
        assert_eq!(kind("▪ square"), Some(MarkerKind::Bullet));
        assert_eq!(kind("-dash"), None);
        assert_eq!(kind("•"), None);
    }

    #[test]
    fn test_ordered_markers() {
        let (marker, len) = parse_marker("12) Twelfth").unwrap();
        assert_eq!(marker.kind, MarkerKind::Numeric);
        assert_eq!(marker.label, "12");
        assert_eq!(marker.delimiter, Some(')'));
        assert_eq!(len, 3);

        assert_eq!(kind("b. second"), Some(MarkerKind::Lettered));
        assert_eq!(kind("iv. fourth"), Some(MarkerKind::Roman));
        assert_eq!(kind("IX) ninth"), Some(MarkerKind::Roman));
        assert_eq!(kind("i. first"), Some(MarkerKind::Roman));
        assert_eq!(kind("3.5 percent"), None);
        assert_eq!(kind("1.Intro"), None);
    }

    #[test]
    fn test_mixed_case_roman_is_rejected() {
        assert_eq!(kind("Vi. mixed"), None);
        assert_eq!(kind("I. Upper"), Some(MarkerKind::Roman));
    }

    #[test]
    fn test_bare_markers() {
        assert!(is_bare_marker("•"));
        assert!(is_bare_marker(" 1. "));
        assert!(is_bare_marker("a)"));
        assert!(is_bare_marker("iv."));
        assert!(!is_bare_marker("1"));
        assert!(!is_bare_marker("Apple"));
        assert!(!is_bare_marker(""));
        assert!(is_bullet("-"));
        assert!(!is_bullet("1."));
    }
}
