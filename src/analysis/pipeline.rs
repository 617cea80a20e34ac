//! The analysis pipeline: page layouts in, one [`Document`] out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use super::alignment::ColumnBounds;
use super::assembler::{Assembler, PageAnalysis};
use super::classifier::{classify_page, DocumentProfile};
use super::normalizer::normalize_page;
use super::table_detector::{cell_roles, DetectedTable, TableDetector};
use super::AnalysisOptions;
use crate::error::{Error, Result};
use crate::model::{Document, Line, Metadata, PageLayout};

/// Result of analyzing a set of pages.
#[derive(Debug)]
pub struct Analysis {
    /// The reconstructed document
    pub document: Document,

    /// Pages that were skipped, each as [`Error::InvalidPage`]
    pub page_errors: Vec<Error>,

    /// Document-wide font statistics
    pub profile: DocumentProfile,

    /// Number of lines produced by normalization
    pub line_count: usize,
}

/// Lines and tables of one page after the first pass.
struct PreparedPage {
    index: u32,
    lines: Vec<Line>,
    tables: Vec<DetectedTable>,
}

/// Runs normalization, classification, alignment, table detection and
/// assembly over a document's pages.
///
/// # Example
///
/// ```
/// use pdfshape::analysis::{AnalysisOptions, Analyzer};
/// use pdfshape::model::{BBox, PageLayout, TextSpan};
///
/// let page = PageLayout::letter(0).with_span(TextSpan::new(
///     "Hello",
///     "Helvetica",
///     12.0,
///     BBox::new(72.0, 700.0, 102.0, 712.0),
/// ));
/// let analysis = Analyzer::new(AnalysisOptions::default()).analyze(&[page])?;
/// assert_eq!(analysis.document.plain_text(), "Hello");
/// # Ok::<(), pdfshape::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    options: AnalysisOptions,
    cancel: Option<Arc<AtomicBool>>,
}

impl Analyzer {
    /// Create an analyzer with the given options.
    pub fn new(options: AnalysisOptions) -> Self {
        Self {
            options,
            cancel: None,
        }
    }

    /// Attach a cancellation flag, checked between pages and stages.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Get the analysis options.
    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Analyze pages given in document order.
    ///
    /// Structurally invalid pages are skipped and reported in
    /// [`Analysis::page_errors`]; the remaining pages are still analyzed.
    pub fn analyze(&self, pages: &[PageLayout]) -> Result<Analysis> {
        self.options.validate()?;
        self.check_cancelled()?;

        // Pass 1: per page normalization and table detection
        let results: Vec<Result<PreparedPage>> = if self.options.parallel {
            pages.par_iter().map(|page| self.prepare_page(page)).collect()
        } else {
            pages.iter().map(|page| self.prepare_page(page)).collect()
        };
        self.check_cancelled()?;

        let mut prepared = Vec::with_capacity(results.len());
        let mut page_errors = Vec::new();
        for result in results {
            match result {
                Ok(page) => prepared.push(page),
                Err(err @ Error::InvalidPage { .. }) => {
                    log::warn!("Skipping page: {err}");
                    page_errors.push(err);
                }
                Err(err) => return Err(err),
            }
        }

        // Barrier: document-wide statistics
        let all_lines = prepared.iter().flat_map(|p| &p.lines);
        let text_lines = prepared.iter().flat_map(|p| {
            let absorbed = cell_roles(&p.tables, p.lines.len());
            p.lines
                .iter()
                .zip(absorbed)
                .filter(|(_, role)| role.is_none())
                .map(|(line, _)| line)
        });
        let profile = DocumentProfile::build(all_lines, text_lines, &self.options);
        let line_count = prepared.iter().map(|p| p.lines.len()).sum();
        self.check_cancelled()?;

        // Pass 2: per page classification and alignment
        let analyzed: Vec<PageAnalysis> = if self.options.parallel {
            prepared
                .into_par_iter()
                .map(|page| self.classify(page, &profile))
                .collect()
        } else {
            prepared
                .into_iter()
                .map(|page| self.classify(page, &profile))
                .collect()
        };
        self.check_cancelled()?;

        // Join: assemble in page order
        let assembler = Assembler::new(&self.options, profile.body_size);
        let mut document = Document {
            metadata: Metadata {
                title: None,
                page_count: pages.len() as u32,
                created: None,
            },
            blocks: Vec::new(),
        };
        for page in analyzed {
            document.blocks.extend(assembler.assemble_page(page));
        }

        log::debug!(
            "Analyzed {} pages: {} lines, {} blocks, {} page errors",
            pages.len(),
            line_count,
            document.blocks.len(),
            page_errors.len()
        );

        Ok(Analysis {
            document,
            page_errors,
            profile,
            line_count,
        })
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(Error::Cancelled),
            _ => Ok(()),
        }
    }

    fn prepare_page(&self, page: &PageLayout) -> Result<PreparedPage> {
        self.check_cancelled()?;
        validate_page(page)?;

        let lines = normalize_page(page, &self.options);
        let tables = TableDetector::new(&self.options).detect(&lines, page.index);
        Ok(PreparedPage {
            index: page.index,
            lines,
            tables,
        })
    }

    fn classify(&self, page: PreparedPage, profile: &DocumentProfile) -> PageAnalysis {
        let bounds = ColumnBounds::from_lines(&page.lines);
        let fixed = cell_roles(&page.tables, page.lines.len());

        let mut lines = classify_page(page.lines, fixed, profile, &self.options);
        if let Some(bounds) = bounds {
            for line in &mut lines {
                line.alignment = bounds.infer(&line.line.bbox, &self.options);
            }
        }

        PageAnalysis {
            index: page.index,
            lines,
            tables: page.tables,
        }
    }
}

/// Reject pages whose geometry cannot be reasoned about.
fn validate_page(page: &PageLayout) -> Result<()> {
    if !page.width.is_finite() || !page.height.is_finite() {
        return Err(Error::invalid_page(page.index, "non-finite page dimensions"));
    }
    if page.width <= 0.0 || page.height <= 0.0 {
        return Err(Error::invalid_page(
            page.index,
            format!("non-positive page dimensions {}x{}", page.width, page.height),
        ));
    }
    if let Some(span) = page
        .spans
        .iter()
        .find(|s| !s.bbox.is_finite() || !s.size.is_finite())
    {
        return Err(Error::invalid_page(
            page.index,
            format!("span {:?} has non-finite geometry", span.text),
        ));
    }
    Ok(())
}
