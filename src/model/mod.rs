//! Document model types.
//!
//! Raw page layouts come in, a [`Document`] of blocks goes out to the
//! renderers. [`Line`] and [`ClassifiedLine`] are the per-request
//! intermediates in between.

mod document;
mod layout;
mod line;
mod paragraph;
mod table;

pub use document::{Block, Document, List, ListItem, Metadata};
pub use layout::{BBox, PageLayout, TextSpan};
pub use line::{ClassifiedLine, Line, Role};
pub use paragraph::{
    join_runs, push_run, roman_value, runs_text, Alignment, ListMarker, MarkerKind, TextRun,
};
pub use table::Table;
