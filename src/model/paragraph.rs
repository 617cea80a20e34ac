//! Text-level types shared by lines and blocks.

use serde::{Deserialize, Serialize};

/// A run of text with consistent styling.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub text: String,

    /// Bold text
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,

    /// Italic text
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl TextRun {
    /// Create a new text run with default style.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }

    /// Create a bold text run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            italic: false,
        }
    }

    /// Create an italic text run.
    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: true,
        }
    }

    /// Create a run with explicit style flags.
    pub fn styled(text: impl Into<String>, bold: bool, italic: bool) -> Self {
        Self {
            text: text.into(),
            bold,
            italic,
        }
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Check whether two runs carry the same style.
    pub fn same_style(&self, other: &TextRun) -> bool {
        self.bold == other.bold && self.italic == other.italic
    }
}

/// Append `text` to a run sequence, extending the last run when styles match.
pub fn push_run(runs: &mut Vec<TextRun>, text: &str, bold: bool, italic: bool) {
    if text.is_empty() {
        return;
    }
    match runs.last_mut() {
        Some(last) if last.bold == bold && last.italic == italic => last.text.push_str(text),
        _ => runs.push(TextRun::styled(text, bold, italic)),
    }
}

/// Concatenate two run sequences with a single space between them.
pub fn join_runs(runs: &mut Vec<TextRun>, other: &[TextRun]) {
    if !runs.is_empty() && !other.is_empty() {
        // the separator takes the style of the preceding run
        let (bold, italic) = runs
            .last()
            .map(|r| (r.bold, r.italic))
            .unwrap_or((false, false));
        push_run(runs, " ", bold, italic);
    }
    for run in other {
        push_run(runs, &run.text, run.bold, run.italic);
    }
}

/// Plain text of a run sequence.
pub fn runs_text(runs: &[TextRun]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}

/// Text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left alignment (default)
    #[default]
    Left,
    /// Center alignment
    Center,
    /// Right alignment
    Right,
}

impl Alignment {
    /// CSS / OOXML keyword for this alignment.
    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

/// Category of a list-prefix symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    /// •, -, *, ◦ ...
    Bullet,
    /// 1. 2) ...
    Numeric,
    /// a. B) ...
    Lettered,
    /// i. IV) ...
    Roman,
}

impl MarkerKind {
    /// Whether lists of this kind are ordered.
    pub fn is_ordered(&self) -> bool {
        !matches!(self, MarkerKind::Bullet)
    }
}

/// The list marker found at the start of a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMarker {
    /// Marker category
    pub kind: MarkerKind,

    /// Marker text without its delimiter ("•", "12", "b", "iv")
    pub label: String,

    /// Trailing delimiter ('.' or ')'), absent for bullets
    pub delimiter: Option<char>,
}

impl ListMarker {
    /// Create a bullet marker.
    pub fn bullet(symbol: impl Into<String>) -> Self {
        Self {
            kind: MarkerKind::Bullet,
            label: symbol.into(),
            delimiter: None,
        }
    }

    /// Create an ordered marker.
    pub fn ordered(kind: MarkerKind, label: impl Into<String>, delimiter: char) -> Self {
        Self {
            kind,
            label: label.into(),
            delimiter: Some(delimiter),
        }
    }

    /// Whether the label is written in upper case.
    pub fn is_uppercase(&self) -> bool {
        self.label.chars().any(|c| c.is_uppercase())
    }

    /// Ordinal value of the label (1-based) for ordered markers.
    pub fn ordinal(&self) -> Option<u32> {
        match self.kind {
            MarkerKind::Bullet => None,
            MarkerKind::Numeric => self.label.parse().ok(),
            MarkerKind::Lettered => {
                let c = self.label.chars().next()?.to_ascii_lowercase();
                c.is_ascii_lowercase().then(|| c as u32 - 'a' as u32 + 1)
            }
            MarkerKind::Roman => roman_value(&self.label),
        }
    }
}

/// Parse a roman numeral (either case) into its value.
pub fn roman_value(text: &str) -> Option<u32> {
    if text.is_empty() {
        return None;
    }
    let mut total = 0u32;
    let mut prev = 0u32;
    for c in text.chars().rev() {
        let value = match c.to_ascii_lowercase() {
            'i' => 1,
            'v' => 5,
            'x' => 10,
            'l' => 50,
            'c' => 100,
            'd' => 500,
            'm' => 1000,
            _ => return None,
        };
        if value < prev {
            total = total.checked_sub(value)?;
        } else {
            total += value;
            prev = value;
        }
    }
    (total > 0).then_some(total)
}
