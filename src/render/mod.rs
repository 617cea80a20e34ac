//! Rendering module for converting documents to various output formats.
//!
//! Every format implements [`Renderer`]. Renderers never modify the
//! [`Document`]; a failure in one format leaves the document usable by the
//! others.

mod docx;
mod html;
mod json;
mod markdown;
mod numbering;
mod options;
mod text;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Document;

pub use docx::DocxRenderer;
pub use html::HtmlRenderer;
pub use json::{to_json, JsonFormat, JsonRenderer};
pub use markdown::{to_markdown, MarkdownRenderer};
pub use numbering::{item_levels, synthesize_labels, to_roman};
pub use options::RenderOptions;
pub use text::{to_text, TextRenderer};

/// A serializer from [`Document`] to the bytes of one output format.
pub trait Renderer {
    /// The format this renderer produces.
    fn format(&self) -> OutputFormat;

    /// Serialize the document.
    fn render(&self, doc: &Document) -> Result<Vec<u8>>;
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// Standalone HTML page
    Html,
    /// Markdown
    Markdown,
    /// Office Open XML word-processing document
    Docx,
    /// JSON dump of the document model
    Json,
}

impl OutputFormat {
    /// Every format, in a stable order.
    pub const ALL: [OutputFormat; 5] = [
        OutputFormat::Text,
        OutputFormat::Html,
        OutputFormat::Markdown,
        OutputFormat::Docx,
        OutputFormat::Json,
    ];

    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Html => "html",
            OutputFormat::Markdown => "md",
            OutputFormat::Docx => "docx",
            OutputFormat::Json => "json",
        }
    }

    /// MIME type of the rendered bytes.
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text/plain; charset=utf-8",
            OutputFormat::Html => "text/html; charset=utf-8",
            OutputFormat::Markdown => "text/markdown; charset=utf-8",
            OutputFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            OutputFormat::Json => "application/json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Text => "TXT",
            OutputFormat::Html => "HTML",
            OutputFormat::Markdown => "Markdown",
            OutputFormat::Docx => "DOCX",
            OutputFormat::Json => "JSON",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "txt" | "text" => Ok(OutputFormat::Text),
            "html" | "htm" => Ok(OutputFormat::Html),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "docx" | "word" => Ok(OutputFormat::Docx),
            "json" => Ok(OutputFormat::Json),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

/// Create the renderer for a format.
pub fn renderer_for(format: OutputFormat, options: &RenderOptions) -> Box<dyn Renderer + Send + Sync> {
    match format {
        OutputFormat::Text => Box::new(TextRenderer::new(options.clone())),
        OutputFormat::Html => Box::new(HtmlRenderer::new(options.clone())),
        OutputFormat::Markdown => Box::new(MarkdownRenderer::new(options.clone())),
        OutputFormat::Docx => Box::new(DocxRenderer::new()),
        OutputFormat::Json => Box::new(JsonRenderer::new(options.json_format)),
    }
}

/// Render a document in one format.
pub fn render(doc: &Document, format: OutputFormat, options: &RenderOptions) -> Result<Vec<u8>> {
    renderer_for(format, options).render(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("TXT".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!(" docx ".parse::<OutputFormat>().unwrap(), OutputFormat::Docx);
        assert!(matches!("pdf".parse::<OutputFormat>(), Err(Error::UnknownFormat(_))));
    }

    #[test]
    fn test_format_metadata() {
        assert_eq!(OutputFormat::Markdown.extension(), "md");
        assert_eq!(OutputFormat::Docx.to_string(), "DOCX");
        assert!(OutputFormat::Html.mime_type().starts_with("text/html"));
    }

    #[test]
    fn test_renderer_for_reports_format() {
        let options = RenderOptions::default();
        for format in OutputFormat::ALL {
            assert_eq!(renderer_for(format, &options).format(), format);
        }
    }

    #[test]
    fn test_empty_document_renders_in_every_format() {
        let doc = Document::new();
        let options = RenderOptions::default();
        for format in OutputFormat::ALL {
            assert!(render(&doc, format, &options).is_ok(), "{format} failed");
        }
    }
}
