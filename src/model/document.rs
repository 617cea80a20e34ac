//! Document-level types.

use super::paragraph::{join_runs, runs_text};
use super::{Alignment, ListMarker, MarkerKind, Table, TextRun};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reconstructed document: metadata plus blocks in reading order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata
    pub metadata: Metadata,

    /// Top-level blocks in reading order
    pub blocks: Vec<Block>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a block to the document.
    pub fn add_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Check if the document has any blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Title used by renderers: the metadata title, else the first heading.
    pub fn title(&self) -> Option<String> {
        if let Some(title) = &self.metadata.title {
            return Some(title.clone());
        }
        self.blocks.iter().find_map(|block| match block {
            Block::Heading { content, .. } => Some(runs_text(content)),
            _ => None,
        })
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|block| block.plain_text())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Collapse every non-table block into one unstyled paragraph.
    ///
    /// Tables are dropped. Used by the `Clean` layout mode.
    pub fn flattened(&self) -> Document {
        let mut runs: Vec<TextRun> = Vec::new();
        let mut page = None;

        for block in &self.blocks {
            let text = match block {
                Block::Table(_) => continue,
                other => other.plain_text(),
            };
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if text.is_empty() {
                continue;
            }
            page.get_or_insert(block.page());
            join_runs(&mut runs, &[TextRun::new(text)]);
        }

        let mut document = Document {
            metadata: self.metadata.clone(),
            blocks: Vec::new(),
        };
        if let Some(page) = page {
            document.add_block(Block::Paragraph {
                content: runs,
                alignment: Alignment::Left,
                page,
            });
        }
        document
    }

    /// Count blocks by kind: (headings, paragraphs, lists, tables).
    pub fn block_counts(&self) -> (usize, usize, usize, usize) {
        self.blocks
            .iter()
            .fold((0, 0, 0, 0), |(h, p, l, t), block| match block {
                Block::Heading { .. } => (h + 1, p, l, t),
                Block::Paragraph { .. } => (h, p + 1, l, t),
                Block::List(_) => (h, p, l + 1, t),
                Block::Table(_) => (h, p, l, t + 1),
            })
    }
}

/// Document metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Number of source pages
    pub page_count: u32,

    /// Creation time of the reconstructed document
    pub created: Option<DateTime<Utc>>,
}

/// A top-level content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A heading (level 1-6)
    Heading {
        /// Heading level
        level: u8,
        /// Styled text
        content: Vec<TextRun>,
        /// Horizontal alignment
        alignment: Alignment,
        /// Source page (0-based)
        page: u32,
    },

    /// A paragraph of text
    Paragraph {
        /// Styled text
        content: Vec<TextRun>,
        /// Horizontal alignment
        alignment: Alignment,
        /// Source page (0-based)
        page: u32,
    },

    /// An ordered or unordered list
    List(List),

    /// A table
    Table(Table),
}

impl Block {
    /// Create an unstyled paragraph block.
    pub fn paragraph(text: impl Into<String>, page: u32) -> Self {
        Block::Paragraph {
            content: vec![TextRun::new(text)],
            alignment: Alignment::Left,
            page,
        }
    }

    /// Create an unstyled heading block.
    pub fn heading(level: u8, text: impl Into<String>, page: u32) -> Self {
        Block::Heading {
            level,
            content: vec![TextRun::new(text)],
            alignment: Alignment::Left,
            page,
        }
    }

    /// Source page of the block.
    pub fn page(&self) -> u32 {
        match self {
            Block::Heading { page, .. } | Block::Paragraph { page, .. } => *page,
            Block::List(list) => list.page,
            Block::Table(table) => table.page(),
        }
    }

    /// Get plain text content of the block.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Heading { content, .. } | Block::Paragraph { content, .. } => runs_text(content),
            Block::List(list) => list
                .items
                .iter()
                .map(|item| runs_text(&item.content))
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Table(table) => table.plain_text("\t"),
        }
    }

    /// Check if this block is a heading.
    pub fn is_heading(&self) -> bool {
        matches!(self, Block::Heading { .. })
    }

    /// Check if this block is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Block::Paragraph { .. })
    }

    /// Check if this block is a list.
    pub fn is_list(&self) -> bool {
        matches!(self, Block::List(_))
    }

    /// Check if this block is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, Block::Table(_))
    }
}

/// A list of items sharing one marker kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    /// Marker kind of the list (from its first item)
    pub kind: MarkerKind,

    /// Items in order
    pub items: Vec<ListItem>,

    /// Source page (0-based)
    pub page: u32,
}

impl List {
    /// Create an empty list.
    pub fn new(kind: MarkerKind, page: u32) -> Self {
        Self {
            kind,
            items: Vec::new(),
            page,
        }
    }

    /// Whether this is an ordered list.
    pub fn ordered(&self) -> bool {
        self.kind.is_ordered()
    }

    /// Add an item to the list.
    pub fn add_item(&mut self, item: ListItem) {
        self.items.push(item);
    }
}

/// One list entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    /// Styled text, marker stripped
    pub content: Vec<TextRun>,

    /// Nesting depth (0 = outermost)
    pub depth: u8,

    /// The marker the item carried in the source
    pub marker: ListMarker,
}

impl ListItem {
    /// Create an unstyled list item.
    pub fn new(text: impl Into<String>, depth: u8, marker: ListMarker) -> Self {
        Self {
            content: vec![TextRun::new(text)],
            depth,
            marker,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut doc = Document::new();
        doc.add_block(Block::heading(1, "Title", 0));
        doc.add_block(Block::paragraph("First  paragraph.", 0));
        let mut list = List::new(MarkerKind::Bullet, 1);
        list.add_item(ListItem::new("One", 0, ListMarker::bullet("•")));
        list.add_item(ListItem::new("Two", 0, ListMarker::bullet("•")));
        doc.add_block(Block::List(list));
        doc.add_block(Block::Table(Table::from_strings(vec![vec!["a", "b"]], false, 1)));
        doc
    }

    #[test]
    fn test_title_falls_back_to_heading() {
        let mut doc = sample();
        assert_eq!(doc.title().as_deref(), Some("Title"));
        doc.metadata.title = Some("Report".to_string());
        assert_eq!(doc.title().as_deref(), Some("Report"));
    }

    #[test]
    fn test_flattened_drops_tables() {
        let flat = sample().flattened();
        assert_eq!(flat.blocks.len(), 1);
        assert_eq!(flat.blocks[0].plain_text(), "Title First paragraph. One Two");
        assert_eq!(flat.blocks[0].page(), 0);
    }

    #[test]
    fn test_flattened_empty() {
        assert!(Document::new().flattened().is_empty());
    }

    #[test]
    fn test_block_counts() {
        assert_eq!(sample().block_counts(), (1, 1, 1, 1));
    }

    #[test]
    fn test_block_serializes_with_tag() {
        let json = serde_json::to_string(&Block::heading(2, "Hi", 0)).unwrap();
        assert!(json.contains(r#""type":"heading""#));
        assert!(json.contains(r#""level":2"#));
    }
}
