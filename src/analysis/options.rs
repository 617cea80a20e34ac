//! Analysis options and configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of heading levels the classifier assigns.
pub const HEADING_LEVELS: usize = 6;

/// Tunable thresholds for layout reconstruction.
///
/// Every field has a default, so a JSON file only needs to name the knobs
/// it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// A line is a heading candidate when its size is at least
    /// `body size * heading_size_ratio`
    pub heading_size_ratio: f32,

    /// Horizontal distance (points) per list nesting level
    pub list_indent_step: f32,

    /// Paragraph break threshold as a multiple of the median line pitch
    pub paragraph_break_ratio: f32,

    /// Minimum consecutive aligned rows that form a table
    pub table_min_rows: usize,

    /// Allowed drift (points) of a cell's left edge from its column
    pub table_column_tolerance: f32,

    /// Maximum difference of left/right gaps for centered text, as a
    /// fraction of the column width
    pub alignment_symmetry_tolerance: f32,

    /// Minimum gap counted as an indent, as a fraction of the column width
    pub alignment_min_indent: f32,

    /// Spans whose centers differ by less than `font size * line_merge_tolerance`
    /// share a line
    pub line_merge_tolerance: f32,

    /// Gaps narrower than `char width * space_gap_ratio` get no space
    pub space_gap_ratio: f32,

    /// Gaps wider than `font size * column_gap_ratio` split a line in two
    pub column_gap_ratio: f32,

    /// Tables with more columns are rejected as word-level splits
    pub table_max_columns: usize,

    /// Tables whose mean cell length exceeds this are rejected as prose
    pub table_max_mean_cell_chars: usize,

    /// Run per-page stages on the rayon pool
    pub parallel: bool,
}

impl AnalysisOptions {
    /// Create new analysis options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Set the heading size ratio.
    pub fn with_heading_size_ratio(mut self, ratio: f32) -> Self {
        self.heading_size_ratio = ratio;
        self
    }

    /// Set the list indent step.
    pub fn with_list_indent_step(mut self, step: f32) -> Self {
        self.list_indent_step = step;
        self
    }

    /// Set the paragraph break ratio.
    pub fn with_paragraph_break_ratio(mut self, ratio: f32) -> Self {
        self.paragraph_break_ratio = ratio;
        self
    }

    /// Set the minimum number of table rows.
    pub fn with_table_min_rows(mut self, rows: usize) -> Self {
        self.table_min_rows = rows;
        self
    }

    /// Set the table column tolerance.
    pub fn with_table_column_tolerance(mut self, tolerance: f32) -> Self {
        self.table_column_tolerance = tolerance;
        self
    }

    /// Set both alignment tolerances.
    pub fn with_alignment_tolerances(mut self, symmetry: f32, min_indent: f32) -> Self {
        self.alignment_symmetry_tolerance = symmetry;
        self.alignment_min_indent = min_indent;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Reject non-positive or non-finite knobs.
    pub fn validate(&self) -> Result<()> {
        let ratios = [
            ("heading_size_ratio", self.heading_size_ratio),
            ("list_indent_step", self.list_indent_step),
            ("paragraph_break_ratio", self.paragraph_break_ratio),
            ("table_column_tolerance", self.table_column_tolerance),
            ("alignment_symmetry_tolerance", self.alignment_symmetry_tolerance),
            ("alignment_min_indent", self.alignment_min_indent),
            ("line_merge_tolerance", self.line_merge_tolerance),
            ("space_gap_ratio", self.space_gap_ratio),
            ("column_gap_ratio", self.column_gap_ratio),
        ];
        for (name, value) in ratios {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidOption {
                    name,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }

        if self.table_min_rows < 2 {
            return Err(Error::InvalidOption {
                name: "table_min_rows",
                reason: format!("a table needs at least 2 rows, got {}", self.table_min_rows),
            });
        }
        if self.table_max_columns < 2 {
            return Err(Error::InvalidOption {
                name: "table_max_columns",
                reason: format!("a table needs at least 2 columns, got {}", self.table_max_columns),
            });
        }
        if self.table_max_mean_cell_chars == 0 {
            return Err(Error::InvalidOption {
                name: "table_max_mean_cell_chars",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            heading_size_ratio: 1.2,
            list_indent_step: 18.0,
            paragraph_break_ratio: 1.5,
            table_min_rows: 2,
            table_column_tolerance: 5.0,
            alignment_symmetry_tolerance: 0.10,
            alignment_min_indent: 0.05,
            line_merge_tolerance: 0.5,
            space_gap_ratio: 0.3,
            column_gap_ratio: 2.5,
            table_max_columns: 8,
            table_max_mean_cell_chars: 40,
            parallel: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = AnalysisOptions::default();
        assert_eq!(options.heading_size_ratio, 1.2);
        assert_eq!(options.table_min_rows, 2);
        assert!(options.parallel);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_options_builder() {
        let options = AnalysisOptions::new()
            .with_heading_size_ratio(1.5)
            .with_list_indent_step(12.0)
            .with_alignment_tolerances(0.2, 0.1)
            .sequential();

        assert_eq!(options.heading_size_ratio, 1.5);
        assert_eq!(options.list_indent_step, 12.0);
        assert_eq!(options.alignment_symmetry_tolerance, 0.2);
        assert!(!options.parallel);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options = AnalysisOptions::from_json(r#"{"table_min_rows": 3}"#).unwrap();
        assert_eq!(options.table_min_rows, 3);
        assert_eq!(options.list_indent_step, 18.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let options = AnalysisOptions::new().with_paragraph_break_ratio(0.0);
        assert!(matches!(
            options.validate(),
            Err(Error::InvalidOption { name: "paragraph_break_ratio", .. })
        ));

        let options = AnalysisOptions::new().with_heading_size_ratio(f32::NAN);
        assert!(options.validate().is_err());

        let options = AnalysisOptions::new().with_table_min_rows(1);
        assert!(options.validate().is_err());

        assert!(AnalysisOptions::from_json(r#"{"list_indent_step": -4}"#).is_err());
    }
}
