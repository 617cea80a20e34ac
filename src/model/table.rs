//! Table types.

use serde::{Deserialize, Serialize};

/// A table grid recovered from aligned lines.
///
/// Every row has the same number of cells; short rows are padded with
/// empty strings when the table is built.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    /// Rows of cell text
    pub rows: Vec<Vec<String>>,

    /// Whether the first row is a header row
    pub has_header: bool,

    /// First and last source page (0-based, inclusive)
    pub pages: (u32, u32),
}

impl Table {
    /// Create a table from rows, padding short rows to the widest row.
    pub fn new(rows: Vec<Vec<String>>, has_header: bool, page: u32) -> Self {
        let mut table = Self {
            rows,
            has_header,
            pages: (page, page),
        };
        table.pad();
        table
    }

    /// Create a table from string slices.
    pub fn from_strings<S: Into<String>>(
        rows: impl IntoIterator<Item = impl IntoIterator<Item = S>>,
        has_header: bool,
        page: u32,
    ) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        Self::new(rows, has_header, page)
    }

    /// Pad every row to the same column count.
    pub fn pad(&mut self) {
        let columns = self.rows.iter().map(|r| r.len()).max().unwrap_or(0);
        for row in &mut self.rows {
            row.resize(columns, String::new());
        }
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.rows.first().map(|r| r.len()).unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get the header row, if any.
    pub fn header(&self) -> Option<&[String]> {
        if self.has_header {
            self.rows.first().map(|r| r.as_slice())
        } else {
            None
        }
    }

    /// Get body rows (non-header).
    pub fn body(&self) -> &[Vec<String>] {
        if self.has_header && !self.rows.is_empty() {
            &self.rows[1..]
        } else {
            &self.rows
        }
    }

    /// Source page of the first row.
    pub fn page(&self) -> u32 {
        self.pages.0
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self, delimiter: &str) -> String {
        self.rows
            .iter()
            .map(|row| row.join(delimiter))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_rows_are_padded() {
        let table = Table::from_strings(vec![vec!["A", "B", "C"], vec!["1"], vec!["2", "3"]], true, 0);
        assert_eq!(table.column_count(), 3);
        assert!(table.rows.iter().all(|r| r.len() == 3));
        assert_eq!(table.rows[1], vec!["1", "", ""]);
    }

    #[test]
    fn test_header_and_body() {
        let table = Table::from_strings(vec![vec!["Name", "Age"], vec!["Ann", "31"]], true, 2);
        assert_eq!(table.header().unwrap(), &["Name".to_string(), "Age".to_string()]);
        assert_eq!(table.body().len(), 1);
        assert_eq!(table.pages, (2, 2));

        let table = Table::from_strings(vec![vec!["Ann", "31"]], false, 0);
        assert!(table.header().is_none());
        assert_eq!(table.body().len(), 1);
    }

    #[test]
    fn test_plain_text() {
        let table = Table::from_strings(vec![vec!["a", "b"], vec!["c", "d"]], true, 0);
        assert_eq!(table.plain_text("\t"), "a\tb\nc\td");
    }
}
