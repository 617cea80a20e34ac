//! Table detection from column-aligned lines.
//!
//! Lines are grouped into rows by vertical position. A run of consecutive
//! rows whose cells start at the same x positions as the first row's cells
//! forms a table; the first row becomes the header. No ruling lines are
//! needed, only text alignment.

use std::collections::HashMap;

use super::markers::{is_bare_marker, is_bullet};
use super::AnalysisOptions;
use crate::model::{Line, Role, Table};

/// Vertical tolerance for row grouping, as a fraction of font size.
const ROW_TOLERANCE_FACTOR: f32 = 0.5;

/// Position of one absorbed line inside a detected table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    /// Index of the line in the page's line sequence
    pub line: usize,
    /// Row index in the table
    pub row: usize,
    /// Column index in the table
    pub col: usize,
}

/// A table found on a page plus the lines it absorbed.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedTable {
    /// The table grid
    pub table: Table,
    /// Absorbed lines, in reading order
    pub cells: Vec<CellRef>,
    /// Left edges of the columns
    pub columns: Vec<f32>,
}

impl DetectedTable {
    /// Index of the first absorbed line.
    pub fn first_line(&self) -> usize {
        self.cells.iter().map(|c| c.line).min().unwrap_or(0)
    }
}

/// A row of line indices sharing a vertical position, sorted by x.
#[derive(Debug, Clone)]
struct RowData {
    lines: Vec<usize>,
}

/// Detects tables in one page's lines.
pub struct TableDetector<'a> {
    options: &'a AnalysisOptions,
}

impl<'a> TableDetector<'a> {
    /// Create a detector using the given options.
    pub fn new(options: &'a AnalysisOptions) -> Self {
        Self { options }
    }

    /// Detect tables among `lines` (one page, reading order).
    ///
    /// The result depends only on the input, so running it twice yields the
    /// same tables.
    pub fn detect(&self, lines: &[Line], page: u32) -> Vec<DetectedTable> {
        let rows = self.group_into_rows(lines);
        log::debug!("TableDetector: page {page}: {} lines in {} rows", lines.len(), rows.len());

        if rows.len() < self.options.table_min_rows {
            return Vec::new();
        }

        let mut tables = Vec::new();
        let mut start = 0;
        while start < rows.len() {
            let Some((end, columns)) = self.find_region(lines, &rows, start) else {
                start += 1;
                continue;
            };

            let region = &rows[start..end];
            if let Some(reason) = self.reject_reason(lines, region, &columns) {
                log::debug!("TableDetector: rows {start}..{end} rejected: {reason}");
                start += 1;
                continue;
            }

            log::debug!(
                "TableDetector: table with {} rows x {} columns at rows {start}..{end}",
                region.len(),
                columns.len()
            );
            tables.push(self.to_table(lines, region, columns, page));
            start = end;
        }
        tables
    }

    /// Group lines into rows by vertical position.
    fn group_into_rows(&self, lines: &[Line]) -> Vec<RowData> {
        let mut rows: Vec<RowData> = Vec::new();
        let mut current: Vec<usize> = Vec::new();
        let mut current_y = 0.0f32;
        let mut current_size = 0.0f32;

        for (i, line) in lines.iter().enumerate() {
            let tolerance = current_size.min(line.font_size) * ROW_TOLERANCE_FACTOR;
            if !current.is_empty() && (current_y - line.y()).abs() <= tolerance {
                current.push(i);
                continue;
            }
            if !current.is_empty() {
                rows.push(RowData {
                    lines: std::mem::take(&mut current),
                });
            }
            current_y = line.y();
            current_size = line.font_size;
            current.push(i);
        }
        if !current.is_empty() {
            rows.push(RowData { lines: current });
        }

        for row in &mut rows {
            row.lines.sort_by(|a, b| lines[*a].x0().total_cmp(&lines[*b].x0()));
        }
        rows
    }

    /// Longest run of aligned rows starting at `start`.
    ///
    /// Returns the exclusive end row and the column left edges taken from the
    /// first row, or `None` when the run is shorter than `table_min_rows`.
    fn find_region(&self, lines: &[Line], rows: &[RowData], start: usize) -> Option<(usize, Vec<f32>)> {
        let first = &rows[start];
        if first.lines.len() < 2 {
            return None;
        }
        let columns: Vec<f32> = first.lines.iter().map(|&i| lines[i].x0()).collect();

        let mut end = start + 1;
        while end < rows.len() && self.row_fits(lines, &rows[end], &columns) {
            end += 1;
        }

        (end - start >= self.options.table_min_rows).then_some((end, columns))
    }

    /// A row fits when it has at least two cells and every cell starts at a column.
    fn row_fits(&self, lines: &[Line], row: &RowData, columns: &[f32]) -> bool {
        row.lines.len() >= 2
            && row.lines.len() <= columns.len()
            && row
                .lines
                .iter()
                .all(|&i| self.column_for(lines[i].x0(), columns).is_some())
    }

    /// Column whose left edge is within tolerance of `x`, nearest first.
    fn column_for(&self, x: f32, columns: &[f32]) -> Option<usize> {
        columns
            .iter()
            .enumerate()
            .map(|(i, c)| (i, (x - c).abs()))
            .filter(|(_, d)| *d <= self.options.table_column_tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Why a candidate region is not a table, if it is not.
    fn reject_reason(&self, lines: &[Line], region: &[RowData], columns: &[f32]) -> Option<&'static str> {
        if columns.len() > self.options.table_max_columns {
            return Some("too many columns");
        }
        if self.is_list_pattern(lines, region, columns) {
            return Some("list pattern");
        }

        let (chars, cells) = region
            .iter()
            .flat_map(|r| &r.lines)
            .fold((0usize, 0usize), |(chars, cells), &i| {
                (chars + lines[i].text().chars().count(), cells + 1)
            });
        if cells > 0 && chars / cells > self.options.table_max_mean_cell_chars {
            return Some("prose-length cells");
        }
        None
    }

    /// Rows led by bullets (or bare numbers in two-column layouts) are lists.
    fn is_list_pattern(&self, lines: &[Line], region: &[RowData], columns: &[f32]) -> bool {
        let mut bullet_count = 0;
        let mut marker_count = 0;

        for row in region {
            let Some(&first) = row.lines.first() else {
                continue;
            };
            let text = lines[first].text();
            if is_bullet(&text) {
                bullet_count += 1;
            } else if is_bare_marker(&text) {
                marker_count += 1;
            }
        }

        let rows = region.len() as f32;
        let bullet_ratio = bullet_count as f32 / rows;
        let total_ratio = (bullet_count + marker_count) as f32 / rows;
        bullet_ratio >= 0.5 || (columns.len() == 2 && total_ratio >= 0.5)
    }

    /// Build the table grid and cell references for a region.
    fn to_table(&self, lines: &[Line], region: &[RowData], columns: Vec<f32>, page: u32) -> DetectedTable {
        let mut rows = Vec::with_capacity(region.len());
        let mut cells = Vec::new();

        for (r, row) in region.iter().enumerate() {
            let mut texts: HashMap<usize, String> = HashMap::new();
            for &i in &row.lines {
                let col = self.column_for(lines[i].x0(), &columns).unwrap_or(0);
                let entry = texts.entry(col).or_default();
                if !entry.is_empty() {
                    entry.push(' ');
                }
                entry.push_str(&lines[i].text());
                cells.push(CellRef { line: i, row: r, col });
            }
            rows.push(
                (0..columns.len())
                    .map(|c| texts.remove(&c).unwrap_or_default())
                    .collect(),
            );
        }
        cells.sort_by_key(|c| c.line);

        DetectedTable {
            table: Table::new(rows, true, page),
            cells,
            columns,
        }
    }
}

/// Roles for every line of a page: `TableCell` for absorbed lines, `None` otherwise.
pub fn cell_roles(tables: &[DetectedTable], line_count: usize) -> Vec<Option<Role>> {
    let mut roles = vec![None; line_count];
    for table in tables {
        for cell in &table.cells {
            if let Some(slot) = roles.get_mut(cell.line) {
                *slot = Some(Role::TableCell {
                    row: cell.row,
                    col: cell.col,
                });
            }
        }
    }
    roles
}
