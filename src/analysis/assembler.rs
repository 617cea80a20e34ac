//! Document assembly: classified lines and tables into blocks.
//!
//! Pages are assembled independently and concatenated in page order, so a
//! block never spans two pages.

use std::collections::HashMap;

use super::alignment::block_alignment;
use super::table_detector::DetectedTable;
use super::AnalysisOptions;
use crate::model::{
    join_runs, push_run, runs_text, Alignment, Block, ClassifiedLine, List, ListItem, Role,
    TextRun,
};

/// Fallback line pitch as a multiple of the body size.
const FALLBACK_PITCH_FACTOR: f32 = 1.2;

/// Font size difference (points) that always starts a new paragraph.
const FONT_SIZE_BREAK: f32 = 1.0;

/// Everything the assembler needs from one page.
#[derive(Debug, Clone, Default)]
pub struct PageAnalysis {
    /// Page index (0-based)
    pub index: u32,
    /// Classified lines in reading order
    pub lines: Vec<ClassifiedLine>,
    /// Tables found on the page
    pub tables: Vec<DetectedTable>,
}

/// A block still accepting lines.
enum OpenBlock {
    Heading {
        level: u8,
        runs: Vec<TextRun>,
        alignment: Alignment,
    },
    Paragraph {
        runs: Vec<TextRun>,
        alignments: Vec<Alignment>,
    },
    List {
        list: List,
        item_x0: f32,
    },
}

/// Position and size of the most recent line added to the open block.
#[derive(Clone, Copy)]
struct LastLine {
    y: f32,
    font_size: f32,
    alignment: Alignment,
}

/// Assembles the blocks of one page.
pub struct Assembler<'a> {
    options: &'a AnalysisOptions,
    body_size: f32,
}

impl<'a> Assembler<'a> {
    /// Create an assembler for a document with the given body size.
    pub fn new(options: &'a AnalysisOptions, body_size: f32) -> Self {
        Self { options, body_size }
    }

    /// Vertical gap above which a new paragraph starts.
    ///
    /// Lower median line pitch on the page times `paragraph_break_ratio`;
    /// pages with fewer than two pitches use the body size instead. With an
    /// even count the smaller middle pitch is taken, so a single paragraph
    /// gap never raises the threshold above itself.
    pub fn paragraph_threshold(&self, lines: &[ClassifiedLine]) -> f32 {
        let mut pitches: Vec<f32> = lines
            .windows(2)
            .map(|w| w[0].line.y() - w[1].line.y())
            .filter(|p| *p > 0.1)
            .collect();

        let typical = if pitches.len() < 2 {
            self.body_size * FALLBACK_PITCH_FACTOR
        } else {
            pitches.sort_by(|a, b| a.total_cmp(b));
            pitches[(pitches.len() - 1) / 2]
        };
        typical * self.options.paragraph_break_ratio
    }

    /// Turn one page into blocks.
    pub fn assemble_page(&self, page: PageAnalysis) -> Vec<Block> {
        let threshold = self.paragraph_threshold(&page.lines);
        let index = page.index;

        // table position = its first absorbed line
        let mut table_at: HashMap<usize, usize> = HashMap::new();
        for (t, table) in page.tables.iter().enumerate() {
            table_at.insert(table.first_line(), t);
        }
        let mut tables: Vec<Option<DetectedTable>> = page.tables.into_iter().map(Some).collect();

        let mut blocks = Vec::new();
        let mut open: Option<OpenBlock> = None;
        let mut last: Option<LastLine> = None;

        for (i, classified) in page.lines.into_iter().enumerate() {
            if let Some(&t) = table_at.get(&i) {
                flush(&mut open, &mut blocks, index);
                last = None;
                if let Some(detected) = tables[t].take() {
                    blocks.push(Block::Table(detected.table));
                }
            }

            let ClassifiedLine {
                line,
                role,
                alignment,
            } = classified;
            let within = last.map_or(false, |l| l.y - line.y() <= threshold);

            match role {
                Role::TableCell { .. } => continue,
                Role::Heading { level } => {
                    let extends = matches!(
                        &open,
                        Some(OpenBlock::Heading { level: l, alignment: a, .. })
                            if *l == level && *a == alignment
                    ) && within;

                    match &mut open {
                        Some(OpenBlock::Heading { runs, .. }) if extends => {
                            append_line(runs, &line.runs);
                        }
                        _ => {
                            flush(&mut open, &mut blocks, index);
                            open = Some(OpenBlock::Heading {
                                level,
                                runs: line.runs.clone(),
                                alignment,
                            });
                        }
                    }
                }
                Role::ListItem { marker, depth } => {
                    let item = ListItem {
                        content: line.runs.clone(),
                        depth,
                        marker,
                    };
                    match &mut open {
                        Some(OpenBlock::List { list, item_x0 }) if joins_list(list, &item) => {
                            list.add_item(item);
                            *item_x0 = line.x0();
                        }
                        _ => {
                            flush(&mut open, &mut blocks, index);
                            let mut list = List::new(item.marker.kind, index);
                            list.add_item(item);
                            open = Some(OpenBlock::List {
                                list,
                                item_x0: line.x0(),
                            });
                        }
                    }
                }
                Role::Paragraph => {
                    let breaks = last.map_or(true, |l| {
                        !within
                            || l.alignment != alignment
                            || (l.font_size - line.font_size).abs() > FONT_SIZE_BREAK
                    });

                    match &mut open {
                        Some(OpenBlock::List { list, item_x0 })
                            if within && line.x0() > *item_x0 + 1.0 =>
                        {
                            if let Some(item) = list.items.last_mut() {
                                append_line(&mut item.content, &line.runs);
                            }
                        }
                        Some(OpenBlock::Paragraph { runs, alignments }) if !breaks => {
                            append_line(runs, &line.runs);
                            alignments.push(alignment);
                        }
                        _ => {
                            flush(&mut open, &mut blocks, index);
                            open = Some(OpenBlock::Paragraph {
                                runs: line.runs.clone(),
                                alignments: vec![alignment],
                            });
                        }
                    }
                }
            }

            last = Some(LastLine {
                y: line.y(),
                font_size: line.font_size,
                alignment,
            });
        }

        flush(&mut open, &mut blocks, index);

        // a table whose first line index is out of range still gets emitted
        blocks.extend(tables.into_iter().flatten().map(|t| Block::Table(t.table)));

        log::debug!("Page {index}: assembled {} blocks", blocks.len());
        blocks
    }
}

/// Same marker kind and at most one level away from the previous item.
fn joins_list(list: &List, item: &ListItem) -> bool {
    let Some(previous) = list.items.last() else {
        return false;
    };
    list.kind == item.marker.kind && previous.depth.abs_diff(item.depth) <= 1
}

/// Close the open block, if any.
fn flush(open: &mut Option<OpenBlock>, blocks: &mut Vec<Block>, page: u32) {
    let Some(block) = open.take() else {
        return;
    };
    blocks.push(match block {
        OpenBlock::Heading {
            level,
            runs,
            alignment,
        } => Block::Heading {
            level,
            content: runs,
            alignment,
            page,
        },
        OpenBlock::Paragraph { runs, alignments } => Block::Paragraph {
            content: runs,
            alignment: block_alignment(&alignments),
            page,
        },
        OpenBlock::List { list, .. } => Block::List(list),
    });
}

/// Append a line's runs, joining a hyphenated word split across the break.
fn append_line(runs: &mut Vec<TextRun>, next: &[TextRun]) {
    let text = runs_text(runs);
    let next_text = runs_text(next);

    let mut tail = text.chars().rev();
    let hyphenated = tail.next() == Some('-')
        && tail.next().map_or(false, char::is_alphabetic)
        && next_text.chars().next().map_or(false, char::is_lowercase);

    if !hyphenated {
        join_runs(runs, next);
        return;
    }

    if let Some(last) = runs.last_mut() {
        last.text.pop();
        if last.text.is_empty() {
            runs.pop();
        }
    }
    for run in next {
        push_run(runs, &run.text, run.bold, run.italic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::table_detector::CellRef;
    use crate::model::{BBox, Line, ListMarker, MarkerKind, Table};

    fn classified(text: &str, x0: f32, y: f32, size: f32, role: Role) -> ClassifiedLine {
        ClassifiedLine {
            line: Line::new(text, size, BBox::new(x0, y, x0 + 300.0, y + size), 0),
            role,
            alignment: Alignment::Left,
        }
    }

    fn para(text: &str, y: f32) -> ClassifiedLine {
        classified(text, 72.0, y, 12.0, Role::Paragraph)
    }

    fn bullet(text: &str, x0: f32, y: f32, depth: u8) -> ClassifiedLine {
        classified(
            text,
            x0,
            y,
            12.0,
            Role::ListItem {
                marker: ListMarker::bullet("•"),
                depth,
            },
        )
    }

    fn assemble(lines: Vec<ClassifiedLine>) -> Vec<Block> {
        let options = AnalysisOptions::default();
        Assembler::new(&options, 12.0).assemble_page(PageAnalysis {
            index: 0,
            lines,
            tables: Vec::new(),
        })
    }

    #[test]
    fn test_paragraph_merge_and_break() {
        let blocks = assemble(vec![
            para("First line", 700.0),
            para("second line.", 686.0),
            para("third line.", 672.0),
            para("New paragraph.", 630.0),
        ]);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].plain_text(), "First line second line. third line.");
        assert_eq!(blocks[1].plain_text(), "New paragraph.");
    }

    #[test]
    fn test_two_pitches_keep_paragraph_break() {
        let lines = vec![
            para("First paragraph line one", 700.0),
            para("first paragraph line two.", 686.0),
            para("Second paragraph.", 646.0),
        ];
        let options = AnalysisOptions::default();
        let threshold = Assembler::new(&options, 12.0).paragraph_threshold(&lines);
        assert!((threshold - 21.0).abs() < 1e-4);

        let blocks = assemble(lines);
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[0].plain_text(),
            "First paragraph line one first paragraph line two."
        );
        assert_eq!(blocks[1].plain_text(), "Second paragraph.");
    }

    #[test]
    fn test_threshold_fallback() {
        let options = AnalysisOptions::default();
        let assembler = Assembler::new(&options, 10.0);
        let threshold = assembler.paragraph_threshold(&[para("only", 700.0)]);
        assert!((threshold - 18.0).abs() < 1e-4);
    }

    #[test]
    fn test_heading_then_paragraph() {
        let blocks = assemble(vec![
            classified("Chapter One", 72.0, 740.0, 24.0, Role::Heading { level: 1 }),
            para("Body one", 700.0),
            para("Body two", 686.0),
            para("Body three", 672.0),
        ]);
        assert_eq!(blocks.len(), 2);
        assert!(matches!(blocks[0], Block::Heading { level: 1, .. }));
        assert_eq!(blocks[1].plain_text(), "Body one Body two Body three");
    }

    #[test]
    fn test_multi_line_heading_merges() {
        let blocks = assemble(vec![
            classified("A Long", 72.0, 740.0, 18.0, Role::Heading { level: 1 }),
            classified("Title", 72.0, 720.0, 18.0, Role::Heading { level: 1 }),
            para("Body", 690.0),
            para("Body", 676.0),
        ]);
        assert_eq!(blocks[0].plain_text(), "A Long Title");
    }

    #[test]
    fn test_list_merge() {
        let blocks = assemble(vec![
            bullet("Apple", 72.0, 700.0, 0),
            bullet("Banana", 72.0, 686.0, 0),
            bullet("Seedless", 90.0, 672.0, 1),
            bullet("Cherry", 72.0, 658.0, 0),
        ]);
        assert_eq!(blocks.len(), 1);
        match &blocks[0] {
            Block::List(list) => {
                assert!(!list.ordered());
                assert_eq!(list.items.len(), 4);
                assert_eq!(list.items[2].depth, 1);
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn test_kind_change_starts_new_list() {
        let numbered = classified(
            "Step",
            72.0,
            672.0,
            12.0,
            Role::ListItem {
                marker: ListMarker::ordered(MarkerKind::Numeric, "1", '.'),
                depth: 0,
            },
        );
        let blocks = assemble(vec![
            bullet("Apple", 72.0, 700.0, 0),
            bullet("Pear", 72.0, 686.0, 0),
            numbered,
        ]);
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.is_list()));
    }

    #[test]
    fn test_list_item_continuation() {
        let blocks = assemble(vec![
            bullet("A long item that", 72.0, 700.0, 0),
            classified("wraps onto a second line", 84.0, 686.0, 12.0, Role::Paragraph),
            bullet("Next", 72.0, 672.0, 0),
        ]);
        assert_eq!(blocks.len(), 1);
        match &blocks[0] {
            Block::List(list) => {
                assert_eq!(list.items.len(), 2);
                assert_eq!(
                    runs_text(&list.items[0].content),
                    "A long item that wraps onto a second line"
                );
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn test_hyphenated_words_are_joined() {
        let blocks = assemble(vec![para("An inter-", 700.0), para("national effort", 686.0)]);
        assert_eq!(blocks[0].plain_text(), "An international effort");

        let blocks = assemble(vec![para("Pages 10-", 700.0), para("20 follow", 686.0)]);
        assert_eq!(blocks[0].plain_text(), "Pages 10- 20 follow");
    }

    #[test]
    fn test_alignment_change_breaks_paragraph() {
        let mut centered = para("Centered", 686.0);
        centered.alignment = Alignment::Center;
        let blocks = assemble(vec![para("Left", 700.0), centered]);
        assert_eq!(blocks.len(), 2);
        assert!(matches!(
            blocks[1],
            Block::Paragraph {
                alignment: Alignment::Center,
                ..
            }
        ));
    }

    #[test]
    fn test_table_inserted_at_first_line() {
        let options = AnalysisOptions::default();
        let mut lines = vec![para("Intro", 720.0)];
        lines.push(classified("Name", 72.0, 700.0, 12.0, Role::TableCell { row: 0, col: 0 }));
        lines.push(classified("Age", 250.0, 700.0, 12.0, Role::TableCell { row: 0, col: 1 }));
        lines.push(classified("Ann", 72.0, 686.0, 12.0, Role::TableCell { row: 1, col: 0 }));
        lines.push(classified("31", 250.0, 686.0, 12.0, Role::TableCell { row: 1, col: 1 }));
        lines.push(para("Outro", 650.0));

        let table = DetectedTable {
            table: Table::from_strings(vec![vec!["Name", "Age"], vec!["Ann", "31"]], true, 0),
            cells: (1..5)
                .map(|line| CellRef {
                    line,
                    row: (line - 1) / 2,
                    col: (line - 1) % 2,
                })
                .collect(),
            columns: vec![72.0, 250.0],
        };

        let blocks = Assembler::new(&options, 12.0).assemble_page(PageAnalysis {
            index: 0,
            lines,
            tables: vec![table],
        });
        assert_eq!(blocks.len(), 3);
        assert!(blocks[0].is_paragraph());
        assert!(blocks[1].is_table());
        assert_eq!(blocks[2].plain_text(), "Outro");
    }
}
