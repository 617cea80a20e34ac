//! Plain text rendering.

use crate::error::Result;
use crate::model::{runs_text, Block, Document, List, Table};

use super::numbering::{item_levels, synthesize_labels};
use super::{OutputFormat, RenderOptions, Renderer};

/// Convert a document to plain text.
pub fn to_text(doc: &Document, options: &RenderOptions) -> Result<String> {
    Ok(TextRenderer::new(options.clone()).render_string(doc))
}

/// Plain text renderer.
#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    options: RenderOptions,
}

impl TextRenderer {
    /// Create a new plain text renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a document to a string.
    pub fn render_string(&self, doc: &Document) -> String {
        doc.blocks
            .iter()
            .map(|block| self.render_block(block))
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn render_block(&self, block: &Block) -> String {
        match block {
            Block::Heading { content, .. } | Block::Paragraph { content, .. } => {
                runs_text(content)
            }
            Block::List(list) => render_list(list),
            Block::Table(table) => self.render_table(table),
        }
    }

    fn render_table(&self, table: &Table) -> String {
        table.plain_text(&self.options.table_delimiter)
    }
}

fn render_list(list: &List) -> String {
    let labels = synthesize_labels(list);
    let levels = item_levels(&list.items);

    list.items
        .iter()
        .zip(labels.iter().zip(levels))
        .map(|(item, (label, level))| {
            format!("{}{} {}", "  ".repeat(level), label, runs_text(&item.content))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl Renderer for TextRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Text
    }

    fn render(&self, doc: &Document) -> Result<Vec<u8>> {
        Ok(self.render_string(doc).into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ListItem, ListMarker, MarkerKind};

    #[test]
    fn test_to_text() {
        let mut doc = Document::new();
        doc.add_block(Block::heading(1, "Title", 0));
        doc.add_block(Block::paragraph("Hello, world!", 0));

        let result = to_text(&doc, &RenderOptions::default()).unwrap();
        assert_eq!(result, "Title\n\nHello, world!");
    }

    #[test]
    fn test_list_markers_and_indent() {
        let mut list = List::new(MarkerKind::Lettered, 0);
        list.add_item(ListItem::new(
            "first",
            0,
            ListMarker::ordered(MarkerKind::Lettered, "b", ')'),
        ));
        list.add_item(ListItem::new("nested", 1, ListMarker::bullet("•")));
        let mut doc = Document::new();
        doc.add_block(Block::List(list));

        let result = to_text(&doc, &RenderOptions::default()).unwrap();
        assert_eq!(result, "b) first\n  • nested");
    }

    #[test]
    fn test_table_delimiter() {
        let mut doc = Document::new();
        doc.add_block(Block::Table(Table::from_strings(
            vec![vec!["Name", "Qty"], vec!["Apple", "3"]],
            true,
            0,
        )));

        let tabbed = to_text(&doc, &RenderOptions::default()).unwrap();
        assert_eq!(tabbed, "Name\tQty\nApple\t3");

        let options = RenderOptions::default().with_table_delimiter(" | ");
        assert_eq!(to_text(&doc, &options).unwrap(), "Name | Qty\nApple | 3");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(to_text(&Document::new(), &RenderOptions::default()).unwrap(), "");
    }
}
