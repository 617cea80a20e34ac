//! Layout reconstruction.
//!
//! The [`Analyzer`] drives the stages in order:
//!
//! 1. [`normalizer`]: spans into ordered lines, per page
//! 2. [`table_detector`]: column-aligned rows into tables, per page
//! 3. [`classifier`]: heading / list item / paragraph roles against a
//!    document-wide [`DocumentProfile`]
//! 4. [`alignment`]: left / center / right from the page's text column
//! 5. [`assembler`]: lines and tables into blocks, page by page

pub mod alignment;
pub mod assembler;
pub mod classifier;
pub mod markers;
pub mod normalizer;
mod options;
mod pipeline;
pub mod table_detector;

pub use alignment::{block_alignment, ColumnBounds};
pub use assembler::{Assembler, PageAnalysis};
pub use classifier::{classify_page, DocumentProfile};
pub use markers::parse_marker;
pub use normalizer::normalize_page;
pub use options::{AnalysisOptions, HEADING_LEVELS};
pub use pipeline::{Analysis, Analyzer};
pub use table_detector::{DetectedTable, TableDetector};
