//! Error types for pdfshape library.

use std::io;
use thiserror::Error;

use crate::render::OutputFormat;

/// Result type alias for pdfshape operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reconstructing or rendering a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Layout input or JSON output could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The DOCX package could not be written.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A page layout is structurally invalid and was skipped.
    #[error("Invalid page {page}: {reason}")]
    InvalidPage {
        /// Zero-based page index
        page: u32,
        /// What was wrong with the page
        reason: String,
    },

    /// An analysis option is out of range.
    #[error("Invalid option `{name}`: {reason}")]
    InvalidOption {
        /// Option name
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// A renderer could not serialize the document.
    #[error("{format} rendering error: {message}")]
    Render {
        /// Format that failed
        format: OutputFormat,
        /// Failure description
        message: String,
    },

    /// The output format name is not recognized.
    #[error("Unknown output format: {0}")]
    UnknownFormat(String),

    /// The caller cancelled the conversion.
    #[error("Conversion cancelled")]
    Cancelled,
}

impl Error {
    /// Build a rendering error for the given format.
    pub fn render(format: OutputFormat, message: impl Into<String>) -> Self {
        Error::Render {
            format,
            message: message.into(),
        }
    }

    /// Build an invalid page error.
    pub fn invalid_page(page: u32, reason: impl Into<String>) -> Self {
        Error::InvalidPage {
            page,
            reason: reason.into(),
        }
    }
}
