//! List marker synthesis shared by the text, HTML, Markdown and DOCX renderers.

use crate::model::{List, ListItem, ListMarker, MarkerKind};

/// Nesting level of each item relative to the first item's depth.
///
/// Items shallower than the first sit at level 0, and jumps deeper than one
/// level are flattened so every item is at most one level below its
/// predecessor.
pub fn item_levels(items: &[ListItem]) -> Vec<usize> {
    let base = items.first().map_or(0, |item| item.depth as usize);
    let mut levels = Vec::with_capacity(items.len());
    let mut prev: Option<usize> = None;
    for item in items {
        let depth = (item.depth as usize).saturating_sub(base);
        let level = match prev {
            None => 0,
            Some(p) => depth.min(p + 1),
        };
        levels.push(level);
        prev = Some(level);
    }
    levels
}

/// Re-synthesize each item's marker in its original style.
///
/// Ordered counters start at the first item's own label ("3." starts at 3)
/// and count up from there; returning to a shallower level resumes that
/// level's counter.
pub fn synthesize_labels(list: &List) -> Vec<String> {
    let levels = item_levels(&list.items);
    let mut counters: Vec<Option<(MarkerKind, u32)>> = Vec::new();
    let mut labels = Vec::with_capacity(list.items.len());

    for (item, &level) in list.items.iter().zip(&levels) {
        counters.truncate(level + 1);
        counters.resize(level + 1, None);

        let kind = item.marker.kind;
        let value = match counters[level] {
            Some((k, n)) if k == kind => n + 1,
            _ => item.marker.ordinal().unwrap_or(1),
        };
        counters[level] = Some((kind, value));
        labels.push(marker_label(&item.marker, value));
    }
    labels
}

/// Marker text for an ordinal, including its delimiter.
fn marker_label(marker: &ListMarker, value: u32) -> String {
    let delimiter = marker.delimiter.unwrap_or('.');
    match marker.kind {
        MarkerKind::Bullet => marker.label.clone(),
        MarkerKind::Numeric => format!("{value}{delimiter}"),
        MarkerKind::Lettered => format!("{}{delimiter}", letter(value, marker.is_uppercase())),
        MarkerKind::Roman => {
            let roman = to_roman(value);
            if marker.is_uppercase() {
                format!("{roman}{delimiter}")
            } else {
                format!("{}{delimiter}", roman.to_lowercase())
            }
        }
    }
}

/// Letter for a 1-based ordinal, wrapping after `z`.
pub(crate) fn letter(value: u32, uppercase: bool) -> char {
    let base = if uppercase { b'A' } else { b'a' };
    let offset = (value.max(1) - 1) % 26;
    (base + offset as u8) as char
}

/// Convert number to Roman numerals.
pub fn to_roman(mut num: u32) -> String {
    let numerals = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];

    let mut result = String::new();
    for (value, symbol) in numerals {
        while num >= value {
            result.push_str(symbol);
            num -= value;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(items: Vec<ListItem>) -> List {
        let mut list = List::new(items[0].marker.kind, 0);
        for item in items {
            list.add_item(item);
        }
        list
    }

    #[test]
    fn test_to_roman() {
        assert_eq!(to_roman(1), "I");
        assert_eq!(to_roman(4), "IV");
        assert_eq!(to_roman(9), "IX");
        assert_eq!(to_roman(14), "XIV");
        assert_eq!(to_roman(2024), "MMXXIV");
    }

    #[test]
    fn test_levels_never_skip() {
        let marker = ListMarker::bullet("•");
        let items = vec![
            ListItem::new("a", 2, marker.clone()),
            ListItem::new("b", 3, marker.clone()),
            ListItem::new("c", 0, marker),
        ];
        assert_eq!(item_levels(&items), vec![0, 1, 0]);
    }

    #[test]
    fn test_levels_relative_to_first_item() {
        let marker = |label: &str| ListMarker::ordered(MarkerKind::Lettered, label, ')');
        let items = vec![
            ListItem::new("nested", 1, marker("a")),
            ListItem::new("nested two", 1, marker("b")),
            ListItem::new("deeper", 2, marker("a")),
            ListItem::new("outdented", 0, marker("c")),
        ];
        assert_eq!(item_levels(&items), vec![0, 0, 1, 0]);

        let list = list_of(items);
        assert_eq!(synthesize_labels(&list), vec!["a)", "b)", "a)", "c)"]);
    }

    #[test]
    fn test_numbering_starts_at_first_label() {
        let list = list_of(vec![
            ListItem::new("x", 0, ListMarker::ordered(MarkerKind::Numeric, "3", ')')),
            ListItem::new("y", 0, ListMarker::ordered(MarkerKind::Numeric, "4", ')')),
        ]);
        assert_eq!(synthesize_labels(&list), vec!["3)", "4)"]);
    }

    #[test]
    fn test_nested_labels_keep_style() {
        let list = list_of(vec![
            ListItem::new("one", 0, ListMarker::ordered(MarkerKind::Numeric, "1", '.')),
            ListItem::new("sub", 1, ListMarker::ordered(MarkerKind::Lettered, "a", ')')),
            ListItem::new("sub", 1, ListMarker::ordered(MarkerKind::Lettered, "b", ')')),
            ListItem::new("two", 0, ListMarker::ordered(MarkerKind::Numeric, "2", '.')),
            ListItem::new("deep", 1, ListMarker::ordered(MarkerKind::Roman, "IV", '.')),
        ]);
        assert_eq!(
            synthesize_labels(&list),
            vec!["1.", "a)", "b)", "2.", "IV."]
        );
    }

    #[test]
    fn test_bullet_keeps_glyph() {
        let list = list_of(vec![ListItem::new("x", 0, ListMarker::bullet("◦"))]);
        assert_eq!(synthesize_labels(&list), vec!["◦"]);
    }

    #[test]
    fn test_letter_wraps() {
        assert_eq!(letter(1, false), 'a');
        assert_eq!(letter(27, true), 'A');
    }
}
