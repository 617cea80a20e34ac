//! Alignment inference from a line's position inside the text column.

use super::AnalysisOptions;
use crate::model::{Alignment, BBox, Line};

/// Horizontal extent of the text on a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnBounds {
    /// Smallest left edge of any line
    pub left: f32,
    /// Largest right edge of any line
    pub right: f32,
}

impl ColumnBounds {
    /// Bounds covering every line, or `None` for a page without lines.
    pub fn from_lines(lines: &[Line]) -> Option<Self> {
        let first = lines.first()?;
        let mut bounds = Self {
            left: first.x0(),
            right: first.x1(),
        };
        for line in &lines[1..] {
            bounds.left = bounds.left.min(line.x0());
            bounds.right = bounds.right.max(line.x1());
        }
        Some(bounds)
    }

    /// Width of the column.
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Infer the alignment of a box inside this column.
    ///
    /// Gaps are compared as fractions of the column width: both gaps above
    /// `alignment_min_indent` and within `alignment_symmetry_tolerance` of
    /// each other is centered; a small left gap with a large right gap is
    /// left; the mirror case is right. Anything else is left.
    pub fn infer(&self, bbox: &BBox, options: &AnalysisOptions) -> Alignment {
        let width = self.width();
        if width.is_nan() || width <= 0.0 {
            return Alignment::Left;
        }

        let left_gap = (bbox.x0 - self.left).max(0.0) / width;
        let right_gap = (self.right - bbox.x1).max(0.0) / width;
        let indent = options.alignment_min_indent;

        let left_large = left_gap > indent;
        let right_large = right_gap > indent;

        if left_large
            && right_large
            && (left_gap - right_gap).abs() <= options.alignment_symmetry_tolerance
        {
            Alignment::Center
        } else if !left_large && right_large {
            Alignment::Left
        } else if left_large && !right_large {
            Alignment::Right
        } else {
            Alignment::Left
        }
    }
}

/// Alignment of a block: the most common line alignment, ties going to the
/// first line's alignment.
pub fn block_alignment(alignments: &[Alignment]) -> Alignment {
    let Some(&first) = alignments.first() else {
        return Alignment::Left;
    };

    let count = |a: Alignment| alignments.iter().filter(|x| **x == a).count();
    let mut best = first;
    let mut best_count = count(first);
    for candidate in [Alignment::Left, Alignment::Center, Alignment::Right] {
        let candidate_count = count(candidate);
        if candidate_count > best_count {
            best = candidate;
            best_count = candidate_count;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(x0: f32, x1: f32) -> Line {
        Line::new("text", 12.0, BBox::new(x0, 700.0, x1, 712.0), 0)
    }

    fn column() -> ColumnBounds {
        ColumnBounds::from_lines(&[line(72.0, 540.0)]).unwrap()
    }

    #[test]
    fn test_column_bounds() {
        let bounds = ColumnBounds::from_lines(&[line(90.0, 300.0), line(72.0, 540.0)]).unwrap();
        assert_eq!(bounds.left, 72.0);
        assert_eq!(bounds.right, 540.0);
        assert!(ColumnBounds::from_lines(&[]).is_none());
    }

    #[test]
    fn test_infer_alignment() {
        let options = AnalysisOptions::default();
        let col = column();

        assert_eq!(col.infer(&line(72.0, 540.0).bbox, &options), Alignment::Left);
        assert_eq!(col.infer(&line(72.0, 300.0).bbox, &options), Alignment::Left);
        assert_eq!(col.infer(&line(256.0, 356.0).bbox, &options), Alignment::Center);
        assert_eq!(col.infer(&line(400.0, 540.0).bbox, &options), Alignment::Right);
        // both gaps large but lopsided
        assert_eq!(col.infer(&line(100.0, 450.0).bbox, &options), Alignment::Left);
    }

    #[test]
    fn test_translation_invariance() {
        let options = AnalysisOptions::default();
        let lines = [line(72.0, 540.0), line(256.0, 356.0), line(400.0, 540.0)];
        let shifted: Vec<Line> = lines
            .iter()
            .map(|l| {
                let mut l = l.clone();
                l.bbox = l.bbox.translate(37.5, -120.0);
                l
            })
            .collect();

        let a = ColumnBounds::from_lines(&lines).unwrap();
        let b = ColumnBounds::from_lines(&shifted).unwrap();
        for (orig, moved) in lines.iter().zip(&shifted) {
            assert_eq!(a.infer(&orig.bbox, &options), b.infer(&moved.bbox, &options));
        }
    }

    #[test]
    fn test_degenerate_column_is_left() {
        let options = AnalysisOptions::default();
        let col = ColumnBounds { left: 100.0, right: 100.0 };
        assert_eq!(col.infer(&line(100.0, 100.0).bbox, &options), Alignment::Left);
    }

    #[test]
    fn test_block_alignment() {
        use Alignment::*;
        assert_eq!(block_alignment(&[]), Left);
        assert_eq!(block_alignment(&[Center, Center, Left]), Center);
        assert_eq!(block_alignment(&[Right, Left]), Right);
        assert_eq!(block_alignment(&[Left, Center, Center]), Center);
    }
}
