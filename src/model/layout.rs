//! Raw page layout records handed over by the PDF parsing layer.

use serde::{Deserialize, Serialize};

/// An axis-aligned box in PDF user space (origin bottom-left, y grows upward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Bottom edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Top edge
    pub y1: f32,
}

impl BBox {
    /// Create a box, swapping corners that arrive out of order.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Copy of this box with ordered corners.
    pub fn normalized(&self) -> Self {
        Self::new(self.x0, self.y0, self.x1, self.y1)
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Vertical center.
    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Same box moved by `dx`, `dy`.
    pub fn translate(&self, dx: f32, dy: f32) -> BBox {
        BBox {
            x0: self.x0 + dx,
            y0: self.y0 + dy,
            x1: self.x1 + dx,
            y1: self.y1 + dy,
        }
    }

    /// Check that every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }
}

/// A text span with position and style information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SpanRecord")]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// Font family name (e.g., "Helvetica-Bold")
    pub font: String,
    /// Font size in points
    pub size: f32,
    /// Whether the font is bold
    pub bold: bool,
    /// Whether the font is italic
    pub italic: bool,
    /// Bounding box in page coordinates
    pub bbox: BBox,
}

/// Wire form of a span; missing style flags fall back to the font name.
#[derive(Deserialize)]
struct SpanRecord {
    text: String,
    #[serde(default)]
    font: String,
    size: f32,
    bold: Option<bool>,
    italic: Option<bool>,
    bbox: BBox,
}

impl From<SpanRecord> for TextSpan {
    fn from(record: SpanRecord) -> Self {
        let span = TextSpan::new(record.text, record.font, record.size, record.bbox);
        let bold = record.bold.unwrap_or(span.bold);
        let italic = record.italic.unwrap_or(span.italic);
        span.with_bold(bold).with_italic(italic)
    }
}

impl TextSpan {
    /// Create a new span; bold and italic are inferred from the font name.
    pub fn new(text: impl Into<String>, font: impl Into<String>, size: f32, bbox: BBox) -> Self {
        let font = font.into();
        let lower = font.to_lowercase();
        let bold = lower.contains("bold") || lower.contains("black") || lower.contains("heavy");
        let italic = lower.contains("italic") || lower.contains("oblique");

        Self {
            text: text.into(),
            font,
            size,
            bold,
            italic,
            bbox: bbox.normalized(),
        }
    }

    /// Set the bold flag and return self.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Set the italic flag and return self.
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    /// Average width of one character, falling back to half the font size.
    pub fn char_width(&self) -> f32 {
        let chars = self.text.chars().count();
        if chars > 0 && self.bbox.width() > 0.0 {
            self.bbox.width() / chars as f32
        } else {
            self.size * 0.5
        }
    }
}

/// The layout of one page as produced by the PDF parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// Page index (0-based)
    pub index: u32,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Spans in content-stream order
    #[serde(default)]
    pub spans: Vec<TextSpan>,
}

impl PageLayout {
    /// Create an empty page with the given dimensions.
    pub fn new(index: u32, width: f32, height: f32) -> Self {
        Self {
            index,
            width,
            height,
            spans: Vec::new(),
        }
    }

    /// Create an empty US Letter page (8.5 x 11 inches).
    pub fn letter(index: u32) -> Self {
        Self::new(index, 612.0, 792.0)
    }

    /// Add a span to the page.
    pub fn add_span(&mut self, span: TextSpan) {
        self.spans.push(span);
    }

    /// Builder form of [`PageLayout::add_span`].
    pub fn with_span(mut self, span: TextSpan) -> Self {
        self.spans.push(span);
        self
    }

    /// Check if the page carries no spans.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}
