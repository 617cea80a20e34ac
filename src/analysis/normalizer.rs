//! Span normalization: raw page spans into ordered lines.
//!
//! Spans are cleaned up (NFKC, collapsed whitespace), sorted top to bottom
//! and left to right, grouped into baselines and merged into [`Line`]s.
//! Wide horizontal gaps split a baseline into separate lines so that table
//! cells and side-by-side text stay apart.

use std::collections::BTreeMap;

use unicode_normalization::UnicodeNormalization;

use super::markers::is_bare_marker;
use super::AnalysisOptions;
use crate::model::{push_run, BBox, Line, PageLayout, TextRun, TextSpan};

/// A span with cleaned-up text.
#[derive(Debug, Clone)]
struct PreparedSpan<'a> {
    span: &'a TextSpan,
    text: String,
    leading_space: bool,
    trailing_space: bool,
}

impl<'a> PreparedSpan<'a> {
    fn new(span: &'a TextSpan) -> Option<Self> {
        let normalized: String = span.text.nfkc().collect();
        let text = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.is_empty() {
            return None;
        }
        Some(Self {
            span,
            text,
            leading_space: normalized.starts_with(char::is_whitespace),
            trailing_space: normalized.ends_with(char::is_whitespace),
        })
    }

    fn bbox(&self) -> &BBox {
        &self.span.bbox
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Turn one page's spans into lines in reading order.
///
/// Lines come out ordered by descending vertical position, then ascending
/// left edge. A page without visible text yields no lines.
pub fn normalize_page(page: &PageLayout, options: &AnalysisOptions) -> Vec<Line> {
    let mut spans: Vec<PreparedSpan<'_>> = page.spans.iter().filter_map(PreparedSpan::new).collect();
    if spans.is_empty() {
        return Vec::new();
    }

    // Top to bottom (PDF y grows upward), then left to right
    spans.sort_by(|a, b| {
        b.bbox()
            .center_y()
            .total_cmp(&a.bbox().center_y())
            .then(a.bbox().x0.total_cmp(&b.bbox().x0))
    });

    let mut lines = Vec::new();
    for mut row in group_into_baselines(spans, options.line_merge_tolerance) {
        row.sort_by(|a, b| a.bbox().x0.total_cmp(&b.bbox().x0));
        for fragment in split_on_column_gaps(&row, options.column_gap_ratio) {
            lines.push(build_line(fragment, page.index, options.space_gap_ratio));
        }
    }

    log::debug!(
        "Page {}: {} spans normalized into {} lines",
        page.index,
        page.spans.len(),
        lines.len()
    );
    lines
}

/// Group sorted spans whose vertical centers lie within the tolerance band.
fn group_into_baselines(spans: Vec<PreparedSpan<'_>>, tolerance: f32) -> Vec<Vec<PreparedSpan<'_>>> {
    let mut rows: Vec<Vec<PreparedSpan<'_>>> = Vec::new();
    let mut current: Vec<PreparedSpan<'_>> = Vec::new();
    let mut current_y = 0.0f32;
    let mut current_size = 0.0f32;

    for span in spans {
        let y = span.bbox().center_y();
        let size = span.span.size;
        let same_line = !current.is_empty()
            && (current_y - y).abs() <= current_size.min(size) * tolerance;

        if same_line {
            current.push(span);
            continue;
        }
        if !current.is_empty() {
            rows.push(std::mem::take(&mut current));
        }
        current_y = y;
        current_size = size;
        current.push(span);
    }

    if !current.is_empty() {
        rows.push(current);
    }
    rows
}

/// Split a baseline wherever the horizontal gap exceeds `ratio * font size`.
///
/// A fragment consisting only of a list marker stays attached to the text
/// that follows it.
fn split_on_column_gaps<'r, 'a>(row: &'r [PreparedSpan<'a>], ratio: f32) -> Vec<&'r [PreparedSpan<'a>]> {
    let mut fragments = Vec::new();
    let mut start = 0;

    for i in 1..row.len() {
        let prev = &row[i - 1];
        let curr = &row[i];
        let gap = curr.bbox().x0 - prev.bbox().x1;
        let size = prev.span.size.max(curr.span.size);
        if gap <= ratio * size {
            continue;
        }

        let left: String = row[start..i]
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        if is_bare_marker(&left) {
            continue;
        }

        fragments.push(&row[start..i]);
        start = i;
    }

    if start < row.len() {
        fragments.push(&row[start..]);
    }
    fragments
}

/// Merge left-to-right spans into a single line.
fn build_line(parts: &[PreparedSpan<'_>], page: u32, space_gap_ratio: f32) -> Line {
    let mut runs: Vec<TextRun> = Vec::new();
    let mut bbox = *parts[0].bbox();
    let mut sizes: BTreeMap<i32, usize> = BTreeMap::new();
    let mut total_chars = 0usize;
    let mut bold_chars = 0usize;
    let mut italic_chars = 0usize;

    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            let prev = &parts[i - 1];
            if needs_space(prev, part, space_gap_ratio) {
                let (bold, italic) = (prev.span.bold, prev.span.italic);
                push_run(&mut runs, " ", bold, italic);
            }
        }
        push_run(&mut runs, &part.text, part.span.bold, part.span.italic);

        let chars = part.char_count();
        total_chars += chars;
        if part.span.bold {
            bold_chars += chars;
        }
        if part.span.italic {
            italic_chars += chars;
        }
        *sizes.entry(size_key(part.span.size)).or_insert(0) += chars;
        bbox = bbox.union(part.bbox());
    }

    // Dominant size by character count; ties go to the larger size
    let font_size = sizes
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then(a.0.cmp(b.0)))
        .map(|(key, _)| *key as f32 / 10.0)
        .unwrap_or(parts[0].span.size);

    Line {
        runs,
        font_size,
        bold: bold_chars * 2 > total_chars,
        italic: italic_chars * 2 > total_chars,
        bbox,
        page,
    }
}

/// Decide whether a space separates two adjacent spans.
fn needs_space(prev: &PreparedSpan<'_>, curr: &PreparedSpan<'_>, space_gap_ratio: f32) -> bool {
    if prev.trailing_space || curr.leading_space {
        return true;
    }

    let prev_last = prev.text.chars().last();
    let curr_first = curr.text.chars().next();
    let both_spaceless = prev_last.map(is_spaceless_script_char).unwrap_or(false)
        && curr_first.map(is_spaceless_script_char).unwrap_or(false);
    if both_spaceless {
        return false;
    }

    let gap = curr.bbox().x0 - prev.bbox().x1;
    gap >= prev.span.char_width() * space_gap_ratio
}

/// Font size histogram key at 0.1 pt precision.
pub(crate) fn size_key(size: f32) -> i32 {
    (size * 10.0).round() as i32
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub(crate) fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions A-F
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x0: f32, y0: f32, x1: f32, size: f32) -> TextSpan {
        TextSpan::new(text, "Helvetica", size, BBox::new(x0, y0, x1, y0 + size))
    }

    fn page(spans: Vec<TextSpan>) -> PageLayout {
        let mut page = PageLayout::letter(0);
        page.spans = spans;
        page
    }

    #[test]
    fn test_empty_page() {
        let lines = normalize_page(&page(vec![]), &AnalysisOptions::default());
        assert!(lines.is_empty());

        let lines = normalize_page(&page(vec![span("   ", 72.0, 700.0, 90.0, 12.0)]), &AnalysisOptions::default());
        assert!(lines.is_empty());
    }

    #[test]
    fn test_spans_on_baseline_merge_with_space() {
        let lines = normalize_page(
            &page(vec![
                span("world", 110.0, 700.5, 140.0, 12.0),
                span("Hello", 72.0, 700.0, 102.0, 12.0),
            ]),
            &AnalysisOptions::default(),
        );
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "Hello world");
        assert_eq!(lines[0].bbox.x0, 72.0);
        assert_eq!(lines[0].bbox.x1, 140.0);
    }

    #[test]
    fn test_tight_gap_inserts_no_space() {
        let lines = normalize_page(
            &page(vec![
                span("Hel", 72.0, 700.0, 90.0, 12.0),
                span("lo", 90.5, 700.0, 102.0, 12.0),
            ]),
            &AnalysisOptions::default(),
        );
        assert_eq!(lines[0].text(), "Hello");
    }

    #[test]
    fn test_cjk_never_spaced() {
        let lines = normalize_page(
            &page(vec![
                span("日本", 72.0, 700.0, 96.0, 12.0),
                span("語", 104.0, 700.0, 116.0, 12.0),
            ]),
            &AnalysisOptions::default(),
        );
        assert_eq!(lines[0].text(), "日本語");
    }

    #[test]
    fn test_reading_order_top_to_bottom() {
        let lines = normalize_page(
            &page(vec![
                span("second", 72.0, 680.0, 110.0, 12.0),
                span("first", 72.0, 700.0, 100.0, 12.0),
                span("third", 72.0, 660.0, 100.0, 12.0),
            ]),
            &AnalysisOptions::default(),
        );
        let texts: Vec<String> = lines.iter().map(|l| l.text()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert!(lines.windows(2).all(|w| w[0].y() > w[1].y()));
    }

    #[test]
    fn test_wide_gap_splits_line() {
        let lines = normalize_page(
            &page(vec![
                span("Name", 72.0, 700.0, 100.0, 12.0),
                span("Age", 200.0, 700.0, 220.0, 12.0),
            ]),
            &AnalysisOptions::default(),
        );
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "Name");
        assert_eq!(lines[1].text(), "Age");
    }

    #[test]
    fn test_marker_not_split_from_text() {
        let lines = normalize_page(
            &page(vec![
                span("•", 72.0, 700.0, 76.0, 12.0),
                span("Apple", 120.0, 700.0, 150.0, 12.0),
            ]),
            &AnalysisOptions::default(),
        );
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "• Apple");
    }

    #[test]
    fn test_nfkc_and_whitespace_collapse() {
        let lines = normalize_page(
            &page(vec![span("\u{FB01}ne   print", 72.0, 700.0, 130.0, 12.0)]),
            &AnalysisOptions::default(),
        );
        assert_eq!(lines[0].text(), "fine print");
    }

    #[test]
    fn test_dominant_size_and_weight() {
        let bold = TextSpan::new("Important", "Helvetica-Bold", 14.0, BBox::new(72.0, 700.0, 140.0, 714.0));
        let plain = span("note", 145.0, 700.0, 170.0, 10.0);
        let lines = normalize_page(&page(vec![bold, plain]), &AnalysisOptions::default());

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].font_size, 14.0);
        assert!(lines[0].bold);
        assert_eq!(lines[0].runs.len(), 2);
        assert!(lines[0].runs[0].bold);
        assert_eq!(lines[0].runs[0].text, "Important ");
    }

    #[test]
    fn test_size_key() {
        assert_eq!(size_key(12.0), 120);
        assert_eq!(size_key(10.96), 110);
    }
}
