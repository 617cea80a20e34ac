//! Structure classification: heading, list item or paragraph per line.

use std::collections::BTreeMap;

use super::markers::parse_marker;
use super::normalizer::size_key;
use super::options::HEADING_LEVELS;
use super::AnalysisOptions;
use crate::model::{Alignment, ClassifiedLine, Line, ListMarker, MarkerKind, Role};

/// Default body size when a document has no lines.
const DEFAULT_BODY_SIZE: f32 = 12.0;

/// Document-wide font statistics used to classify every page.
///
/// Built once after all pages are normalized, then shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentProfile {
    /// Body text font size (most common line size)
    pub body_size: f32,

    /// Distinct heading styles as (size key, bold), largest first
    pub heading_styles: Vec<(i32, bool)>,

    size_histogram: BTreeMap<i32, usize>,

    heading_size_ratio: f32,
}

impl DocumentProfile {
    /// Build the profile.
    ///
    /// `all_lines` feeds the body size; `text_lines` (lines not absorbed by
    /// tables) feed the heading style ranking.
    pub fn build<'a>(
        all_lines: impl IntoIterator<Item = &'a Line>,
        text_lines: impl IntoIterator<Item = &'a Line>,
        options: &AnalysisOptions,
    ) -> Self {
        let mut size_histogram: BTreeMap<i32, usize> = BTreeMap::new();
        for line in all_lines {
            *size_histogram.entry(size_key(line.font_size)).or_insert(0) += 1;
        }

        // Ascending iteration with a strict comparison keeps the smaller size on ties
        let mut body_key = None;
        let mut best = 0usize;
        for (&key, &count) in &size_histogram {
            if count > best {
                best = count;
                body_key = Some(key);
            }
        }
        let body_size = body_key
            .map(|k| k as f32 / 10.0)
            .unwrap_or(DEFAULT_BODY_SIZE);

        let mut profile = Self {
            body_size,
            heading_styles: Vec::new(),
            size_histogram,
            heading_size_ratio: options.heading_size_ratio,
        };

        let mut styles: Vec<(i32, bool)> = text_lines
            .into_iter()
            .filter(|line| profile.is_heading_candidate(line.font_size, line.bold))
            .map(|line| (size_key(line.font_size), line.bold))
            .collect();
        // Larger first, bold before regular at equal size
        styles.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
        styles.dedup();
        profile.heading_styles = styles;

        log::debug!(
            "Document profile: body size {:.1}pt, {} heading styles",
            profile.body_size,
            profile.heading_styles.len()
        );
        profile
    }

    /// Line count per font size (0.1 pt precision), smallest size first.
    pub fn font_sizes(&self) -> Vec<(f32, usize)> {
        self.size_histogram
            .iter()
            .map(|(&key, &count)| (key as f32 / 10.0, count))
            .collect()
    }

    /// Whether a line with this size and weight may be a heading.
    pub fn is_heading_candidate(&self, font_size: f32, bold: bool) -> bool {
        let size = size_key(font_size) as f32 / 10.0;
        let threshold = self.body_size * self.heading_size_ratio;
        size + 1e-3 >= threshold || (bold && size + 1e-3 >= self.body_size)
    }

    /// Heading level (1-6) for a line, or `None` for body text.
    pub fn heading_level(&self, line: &Line) -> Option<u8> {
        if !self.is_heading_candidate(line.font_size, line.bold) {
            return None;
        }
        let style = (size_key(line.font_size), line.bold);
        let rank = self.heading_styles.iter().position(|s| *s == style)?;
        let styles = self.heading_styles.len();

        let level = if styles <= HEADING_LEVELS {
            rank + 1
        } else {
            1 + rank * HEADING_LEVELS / styles
        };
        Some(level.min(HEADING_LEVELS) as u8)
    }
}

/// Classify the lines of one page.
///
/// `fixed` carries roles decided earlier (table cells); lines with a fixed
/// role keep it. Alignment is left at its default for the caller to fill.
pub fn classify_page(
    lines: Vec<Line>,
    fixed: Vec<Option<Role>>,
    profile: &DocumentProfile,
    options: &AnalysisOptions,
) -> Vec<ClassifiedLine> {
    let mut classified = Vec::with_capacity(lines.len());
    let mut previous_marker: Option<ListMarker> = None;

    let mut fixed = fixed.into_iter();

    for mut line in lines {
        let role = if let Some(role) = fixed.next().flatten() {
            role
        } else if let Some(level) = profile.heading_level(&line) {
            Role::Heading { level }
        } else if let Some((mut marker, len)) = parse_marker(&line.text()) {
            if continues_lettered(previous_marker.as_ref(), &marker) {
                marker.kind = MarkerKind::Lettered;
            }
            line.strip_prefix_chars(len);
            previous_marker = Some(marker.clone());
            // depth is resolved once the page's list indent is known
            Role::ListItem { marker, depth: 0 }
        } else {
            Role::Paragraph
        };

        classified.push(ClassifiedLine {
            line,
            role,
            alignment: Alignment::Left,
        });
    }

    assign_list_depths(&mut classified, options.list_indent_step);
    classified
}

/// A single-letter roman marker right after the preceding letter is lettered.
fn continues_lettered(previous: Option<&ListMarker>, marker: &ListMarker) -> bool {
    let previous = match previous {
        Some(p) if p.kind == MarkerKind::Lettered => p,
        _ => return false,
    };
    if marker.kind != MarkerKind::Roman || marker.label.chars().count() != 1 {
        return false;
    }
    let (Some(prev), Some(curr)) = (previous.label.chars().next(), marker.label.chars().next()) else {
        return false;
    };
    prev.is_uppercase() == curr.is_uppercase()
        && (prev.to_ascii_lowercase() as u32) + 1 == curr.to_ascii_lowercase() as u32
}

/// Nesting depth from the indent relative to the leftmost list item on the page.
fn assign_list_depths(lines: &mut [ClassifiedLine], step: f32) {
    let min_indent = lines
        .iter()
        .filter(|l| l.is_list_item())
        .map(|l| l.line.x0())
        .fold(f32::INFINITY, f32::min);
    if !min_indent.is_finite() {
        return;
    }

    for line in lines.iter_mut() {
        let x0 = line.line.x0();
        if let Role::ListItem { depth, .. } = &mut line.role {
            let levels = ((x0 - min_indent) / step).round();
            *depth = levels.clamp(0.0, u8::MAX as f32) as u8;
        }
    }
}
