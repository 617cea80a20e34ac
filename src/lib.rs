//! # pdfshape
//!
//! Layout reconstruction for PDF text.
//!
//! A PDF parser hands over positioned text spans per page; this library
//! infers headings, lists, tables, paragraphs and alignment from their
//! geometry and typography, and renders the resulting document to plain
//! text, HTML, Markdown, DOCX or JSON.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfshape::{layouts_from_file, render};
//!
//! fn main() -> pdfshape::Result<()> {
//!     // Load the parser's page layouts
//!     let pages = layouts_from_file("layout.json")?;
//!
//!     // Reconstruct the document and render it
//!     let doc = pdfshape::analyze(&pages)?;
//!     let markdown = render::to_markdown(&doc, &render::RenderOptions::default())?;
//!     println!("{}", markdown);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Structure inference**: headings from font statistics, lists from
//!   markers and indentation, tables from column alignment
//! - **Multiple output formats**: text, HTML, Markdown, DOCX, JSON
//! - **Parallel processing**: per-page stages run on Rayon
//! - **CJK support**: no spaces inserted between spaceless-script spans

pub mod analysis;
pub mod convert;
pub mod error;
pub mod model;
pub mod render;

// Re-export commonly used types
pub use analysis::{Analysis, AnalysisOptions, Analyzer};
pub use convert::{
    convert, ConvertOptions, ConvertResult, Converter, LayoutMode, RenderedDocument,
};
pub use error::{Error, Result};
pub use model::{
    Alignment, BBox, Block, Document, List, ListItem, ListMarker, MarkerKind, Metadata,
    PageLayout, Table, TextRun, TextSpan,
};
pub use render::{JsonFormat, OutputFormat, RenderOptions, Renderer};

use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// Accepted shapes of a layout file.
#[derive(Deserialize)]
#[serde(untagged)]
enum LayoutFile {
    Pages(Vec<PageLayout>),
    Wrapped { pages: Vec<PageLayout> },
}

impl From<LayoutFile> for Vec<PageLayout> {
    fn from(file: LayoutFile) -> Self {
        match file {
            LayoutFile::Pages(pages) | LayoutFile::Wrapped { pages } => pages,
        }
    }
}

/// Parse page layouts from JSON.
///
/// Accepts either an array of pages or an object with a `pages` array.
///
/// # Example
///
/// ```
/// let json = r#"{"pages": [{"index": 0, "width": 612, "height": 792, "spans": [
///     {"text": "Hi", "font": "Helvetica-Bold", "size": 12,
///      "bbox": {"x0": 72, "y0": 700, "x1": 90, "y1": 712}}
/// ]}]}"#;
/// let pages = pdfshape::layouts_from_json(json)?;
/// assert!(pages[0].spans[0].bold);
/// # Ok::<(), pdfshape::Error>(())
/// ```
pub fn layouts_from_json(json: &str) -> Result<Vec<PageLayout>> {
    let file: LayoutFile = serde_json::from_str(json)?;
    Ok(file.into())
}

/// Parse page layouts from a reader.
pub fn layouts_from_reader<R: Read>(reader: R) -> Result<Vec<PageLayout>> {
    let file: LayoutFile = serde_json::from_reader(reader)?;
    Ok(file.into())
}

/// Parse page layouts from a JSON file.
pub fn layouts_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<PageLayout>> {
    let data = std::fs::read_to_string(path)?;
    layouts_from_json(&data)
}

/// Reconstruct a document with default options.
///
/// Invalid pages are skipped; use [`Analyzer`] to see which.
pub fn analyze(pages: &[PageLayout]) -> Result<Document> {
    Ok(Analyzer::default().analyze(pages)?.document)
}

/// Convert page layouts to Markdown.
pub fn to_markdown(pages: &[PageLayout]) -> Result<String> {
    let doc = analyze(pages)?;
    render::to_markdown(&doc, &RenderOptions::default())
}

/// Convert page layouts to plain text.
pub fn to_text(pages: &[PageLayout], options: &RenderOptions) -> Result<String> {
    let doc = analyze(pages)?;
    render::to_text(&doc, options)
}

/// Convert page layouts to a standalone HTML page.
pub fn to_html(pages: &[PageLayout]) -> Result<String> {
    let doc = analyze(pages)?;
    Ok(render::HtmlRenderer::new(RenderOptions::default()).render_string(&doc))
}

/// Convert page layouts to DOCX bytes.
pub fn to_docx(pages: &[PageLayout]) -> Result<Vec<u8>> {
    let doc = analyze(pages)?;
    render::DocxRenderer::new().render(&doc)
}

/// Convert page layouts to JSON.
pub fn to_json(pages: &[PageLayout], format: JsonFormat) -> Result<String> {
    let doc = analyze(pages)?;
    render::to_json(&doc, format)
}

/// Builder for analyzing and rendering page layouts.
///
/// # Example
///
/// ```
/// use pdfshape::{PageLayout, Pdfshape};
///
/// let markdown = Pdfshape::new()
///     .sequential()
///     .with_heading_size_ratio(1.3)
///     .analyze(&[PageLayout::letter(0)])?
///     .to_markdown()?;
/// assert!(markdown.is_empty());
/// # Ok::<(), pdfshape::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pdfshape {
    analysis_options: AnalysisOptions,
    render_options: RenderOptions,
    layout_mode: LayoutMode,
}

impl Pdfshape {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.analysis_options = self.analysis_options.sequential();
        self
    }

    /// Flatten all text into one paragraph before rendering.
    pub fn clean(mut self) -> Self {
        self.layout_mode = LayoutMode::Clean;
        self
    }

    /// Set the heading size ratio.
    pub fn with_heading_size_ratio(mut self, ratio: f32) -> Self {
        self.analysis_options = self.analysis_options.with_heading_size_ratio(ratio);
        self
    }

    /// Replace the analysis options.
    pub fn with_analysis_options(mut self, options: AnalysisOptions) -> Self {
        self.analysis_options = options;
        self
    }

    /// Replace the render options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Analyze pages and return a result wrapper.
    pub fn analyze(self, pages: &[PageLayout]) -> Result<PdfshapeResult> {
        let analysis = Analyzer::new(self.analysis_options).analyze(pages)?;
        let document = match self.layout_mode {
            LayoutMode::Preserve => analysis.document,
            LayoutMode::Clean => analysis.document.flattened(),
        };
        Ok(PdfshapeResult {
            document,
            page_errors: analysis.page_errors,
            render_options: self.render_options,
        })
    }
}

/// Result of analyzing page layouts.
#[derive(Debug)]
pub struct PdfshapeResult {
    /// The reconstructed document
    pub document: Document,
    /// Pages that were skipped
    pub page_errors: Vec<Error>,
    /// Render options to use
    render_options: RenderOptions,
}

impl PdfshapeResult {
    /// Convert to Markdown.
    pub fn to_markdown(&self) -> Result<String> {
        render::to_markdown(&self.document, &self.render_options)
    }

    /// Convert to plain text.
    pub fn to_text(&self) -> Result<String> {
        render::to_text(&self.document, &self.render_options)
    }

    /// Convert to HTML.
    pub fn to_html(&self) -> Result<String> {
        Ok(render::HtmlRenderer::new(self.render_options.clone()).render_string(&self.document))
    }

    /// Convert to DOCX bytes.
    pub fn to_docx(&self) -> Result<Vec<u8>> {
        render::DocxRenderer::new().render(&self.document)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_options() {
        let builder = Pdfshape::new().sequential().clean().with_heading_size_ratio(1.5);
        assert!(!builder.analysis_options.parallel);
        assert_eq!(builder.analysis_options.heading_size_ratio, 1.5);
        assert_eq!(builder.layout_mode, LayoutMode::Clean);
    }

    #[test]
    fn test_layouts_from_json_array() {
        let json = r#"[{"index": 0, "width": 612, "height": 792}]"#;
        let pages = layouts_from_json(json).unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].is_empty());
    }

    #[test]
    fn test_layouts_from_json_explicit_flags() {
        let json = r#"[{"index": 3, "width": 612, "height": 792, "spans": [
            {"text": "x", "font": "Times-Bold", "size": 10, "bold": false, "italic": true,
             "bbox": {"x0": 10, "y0": 20, "x1": 15, "y1": 30}}
        ]}]"#;
        let pages = layouts_from_json(json).unwrap();
        let span = &pages[0].spans[0];
        assert!(!span.bold);
        assert!(span.italic);
        assert_eq!(pages[0].index, 3);
    }

    #[test]
    fn test_layouts_from_json_invalid() {
        assert!(matches!(layouts_from_json("{\"pages\": 5}"), Err(Error::Json(_))));
        assert!(matches!(layouts_from_json("not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_empty_pages_render_empty() {
        let pages = vec![PageLayout::letter(0)];
        assert_eq!(to_markdown(&pages).unwrap(), "");
        assert_eq!(to_text(&pages, &RenderOptions::default()).unwrap(), "");
        assert!(to_html(&pages).unwrap().contains("<body>"));
        assert!(!to_docx(&pages).unwrap().is_empty());
    }
}
