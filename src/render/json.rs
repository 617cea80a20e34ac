//! JSON rendering of the document model.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Document;

use super::{OutputFormat, Renderer};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a document to JSON.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(doc),
        JsonFormat::Compact => serde_json::to_string(doc),
    };

    result.map_err(|e| Error::render(OutputFormat::Json, e.to_string()))
}

/// JSON renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer {
    format: JsonFormat,
}

impl JsonRenderer {
    /// Create a JSON renderer with the given layout.
    pub fn new(format: JsonFormat) -> Self {
        Self { format }
    }
}

impl Renderer for JsonRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }

    fn render(&self, doc: &Document) -> Result<Vec<u8>> {
        to_json(doc, self.format).map(String::into_bytes)
    }
}
