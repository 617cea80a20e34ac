//! Line-level intermediates produced by the analysis pipeline.

use super::paragraph::{push_run, runs_text};
use super::{Alignment, BBox, ListMarker, TextRun};
use serde::{Deserialize, Serialize};

/// Spans sharing a baseline, merged left to right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Styled runs; consecutive runs never share a style
    pub runs: Vec<TextRun>,

    /// Dominant font size (by character count)
    pub font_size: f32,

    /// More than half of the characters are bold
    pub bold: bool,

    /// More than half of the characters are italic
    pub italic: bool,

    /// Bounding box of the merged spans
    pub bbox: BBox,

    /// Source page (0-based)
    pub page: u32,
}

impl Line {
    /// Create a single-run line.
    pub fn new(text: impl Into<String>, font_size: f32, bbox: BBox, page: u32) -> Self {
        Self {
            runs: vec![TextRun::new(text)],
            font_size,
            bold: false,
            italic: false,
            bbox,
            page,
        }
    }

    /// Mark the whole line bold.
    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        for run in &mut self.runs {
            run.bold = true;
        }
        self
    }

    /// Full text of the line.
    pub fn text(&self) -> String {
        runs_text(&self.runs)
    }

    /// Vertical position (box center).
    pub fn y(&self) -> f32 {
        self.bbox.center_y()
    }

    /// Left edge.
    pub fn x0(&self) -> f32 {
        self.bbox.x0
    }

    /// Right edge.
    pub fn x1(&self) -> f32 {
        self.bbox.x1
    }

    /// Drop the first `chars` characters of text, then any leading whitespace.
    ///
    /// Runs emptied by the cut are removed.
    pub fn strip_prefix_chars(&mut self, chars: usize) {
        let mut remaining = chars;
        let mut runs = Vec::with_capacity(self.runs.len());
        let mut trimming = true;

        for run in self.runs.drain(..) {
            let mut text = run.text.as_str();
            if remaining > 0 {
                let cut = text
                    .char_indices()
                    .nth(remaining)
                    .map(|(i, _)| i)
                    .unwrap_or(text.len());
                remaining -= text[..cut].chars().count();
                text = &text[cut..];
            }
            if remaining == 0 && trimming {
                text = text.trim_start();
                trimming = text.is_empty();
            }
            push_run(&mut runs, text, run.bold, run.italic);
        }
        self.runs = runs;
    }
}

/// Structural role of a line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Role {
    /// Heading of the given level (1-6)
    Heading {
        /// Heading level
        level: u8,
    },
    /// List item; the marker has been stripped from the line text
    ListItem {
        /// The stripped marker
        marker: ListMarker,
        /// Nesting depth
        depth: u8,
    },
    /// Cell of a detected table
    TableCell {
        /// Row index
        row: usize,
        /// Column index
        col: usize,
    },
    /// Body text
    Paragraph,
}

/// A line with its role and alignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedLine {
    /// The line
    pub line: Line,
    /// Structural role
    pub role: Role,
    /// Horizontal alignment
    pub alignment: Alignment,
}

impl ClassifiedLine {
    /// Check if this line is a heading.
    pub fn is_heading(&self) -> bool {
        matches!(self.role, Role::Heading { .. })
    }

    /// Check if this line is a list item.
    pub fn is_list_item(&self) -> bool {
        matches!(self.role, Role::ListItem { .. })
    }
}
