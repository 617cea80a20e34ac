//! Conversion facade: page layouts in, rendered files out.
//!
//! Analysis runs once; every requested format is then rendered from the same
//! [`Document`]. A failure in one format is reported next to the others'
//! successes instead of aborting the conversion.
//!
//! # Example
//!
//! ```
//! use pdfshape::convert::{convert, ConvertOptions};
//! use pdfshape::model::{BBox, PageLayout, TextSpan};
//! use pdfshape::render::OutputFormat;
//!
//! let page = PageLayout::letter(0).with_span(TextSpan::new(
//!     "Hello",
//!     "Helvetica",
//!     12.0,
//!     BBox::new(72.0, 700.0, 102.0, 712.0),
//! ));
//! let options = ConvertOptions::new().with_formats([OutputFormat::Markdown]);
//! let result = convert(&[page], &options)?;
//! let markdown = result.get(OutputFormat::Markdown).unwrap();
//! assert_eq!(markdown.file_name, "document.md");
//! # Ok::<(), pdfshape::Error>(())
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisOptions, Analyzer};
use crate::error::{Error, Result};
use crate::model::{Document, PageLayout};
use crate::render::{renderer_for, OutputFormat, RenderOptions};

/// How much structure survives into the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Headings, lists, tables and alignment as reconstructed
    #[default]
    Preserve,
    /// All text as one plain paragraph; tables are dropped
    Clean,
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutMode::Preserve => f.write_str("preserve"),
            LayoutMode::Clean => f.write_str("clean"),
        }
    }
}

impl FromStr for LayoutMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "preserve" => Ok(LayoutMode::Preserve),
            "clean" => Ok(LayoutMode::Clean),
            _ => Err(Error::InvalidOption {
                name: "layout_mode",
                reason: format!("expected `preserve` or `clean`, got `{s}`"),
            }),
        }
    }
}

/// Options for document conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Analysis options
    pub analysis: AnalysisOptions,

    /// Rendering options
    pub render: RenderOptions,

    /// Formats to produce, in order
    pub formats: Vec<OutputFormat>,

    /// Layout mode
    pub layout_mode: LayoutMode,

    /// File stem for the rendered files
    pub name: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            analysis: AnalysisOptions::default(),
            render: RenderOptions::default(),
            formats: vec![
                OutputFormat::Text,
                OutputFormat::Html,
                OutputFormat::Markdown,
                OutputFormat::Docx,
            ],
            layout_mode: LayoutMode::Preserve,
            name: "document".to_string(),
        }
    }
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set analysis options.
    pub fn with_analysis_options(mut self, options: AnalysisOptions) -> Self {
        self.analysis = options;
        self
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Replace the requested formats.
    pub fn with_formats(mut self, formats: impl IntoIterator<Item = OutputFormat>) -> Self {
        self.formats = formats.into_iter().collect();
        self
    }

    /// Add one format if not already requested.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        if !self.formats.contains(&format) {
            self.formats.push(format);
        }
        self
    }

    /// Set the layout mode.
    pub fn with_layout_mode(mut self, mode: LayoutMode) -> Self {
        self.layout_mode = mode;
        self
    }

    /// Set the output file stem.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// One rendered output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// `<stem>.<extension>`
    pub file_name: String,

    /// Output format
    pub format: OutputFormat,

    /// MIME type of the bytes
    pub mime_type: &'static str,

    /// Rendered content
    pub bytes: Vec<u8>,
}

impl RenderedDocument {
    /// Content as UTF-8 text, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    /// Get content length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the content is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Result of a conversion.
#[derive(Debug)]
pub struct ConvertResult {
    /// The document every format was rendered from
    pub document: Document,

    /// One entry per requested format, in request order
    pub outputs: Vec<(OutputFormat, Result<RenderedDocument>)>,

    /// Pages skipped during analysis
    pub page_errors: Vec<Error>,
}

impl ConvertResult {
    /// The successful output for a format.
    pub fn get(&self, format: OutputFormat) -> Option<&RenderedDocument> {
        self.outputs
            .iter()
            .find(|(f, _)| *f == format)
            .and_then(|(_, result)| result.as_ref().ok())
    }

    /// Formats that failed to render, with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (OutputFormat, &Error)> {
        self.outputs
            .iter()
            .filter_map(|(format, result)| result.as_ref().err().map(|e| (*format, e)))
    }

    /// Whether every page was analyzed and every format rendered.
    pub fn is_complete(&self) -> bool {
        self.page_errors.is_empty() && self.outputs.iter().all(|(_, r)| r.is_ok())
    }
}

/// Runs analysis once and renders the requested formats.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
    cancel: Option<Arc<AtomicBool>>,
}

impl Converter {
    /// Create a converter with the given options.
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            cancel: None,
        }
    }

    /// Attach a cancellation flag passed through to the analyzer.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Get the conversion options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Analyze the pages and render every requested format.
    pub fn convert(&self, pages: &[PageLayout]) -> Result<ConvertResult> {
        let mut analyzer = Analyzer::new(self.options.analysis.clone());
        if let Some(flag) = &self.cancel {
            analyzer = analyzer.with_cancel_flag(Arc::clone(flag));
        }
        let analysis = analyzer.analyze(pages)?;

        let mut document = match self.options.layout_mode {
            LayoutMode::Preserve => analysis.document,
            LayoutMode::Clean => analysis.document.flattened(),
        };
        document.metadata.created.get_or_insert_with(Utc::now);

        let outputs = self
            .options
            .formats
            .iter()
            .map(|&format| (format, self.render(&document, format)))
            .collect::<Vec<_>>();

        for (format, result) in &outputs {
            if let Err(e) = result {
                log::warn!("{format} output failed: {e}");
            }
        }

        Ok(ConvertResult {
            document,
            outputs,
            page_errors: analysis.page_errors,
        })
    }

    fn render(&self, document: &Document, format: OutputFormat) -> Result<RenderedDocument> {
        let bytes = renderer_for(format, &self.options.render).render(document)?;
        Ok(RenderedDocument {
            file_name: format!("{}.{}", self.options.name, format.extension()),
            format,
            mime_type: format.mime_type(),
            bytes,
        })
    }
}

/// Convert pages with the given options.
pub fn convert(pages: &[PageLayout], options: &ConvertOptions) -> Result<ConvertResult> {
    Converter::new(options.clone()).convert(pages)
}
