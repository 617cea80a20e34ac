//! Markdown rendering.
//!
//! Alignment has no Markdown form and is dropped. Lettered and roman items
//! keep their `a.` / `iv.` markers so the marker kind survives a re-parse;
//! CommonMark only recognizes `-` and digit markers, so strict viewers show
//! those items as plain lines.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use crate::model::{Block, Document, List, MarkerKind, Table, TextRun};

use super::numbering::{item_levels, synthesize_labels};
use super::{OutputFormat, RenderOptions, Renderer};

/// An ordered-list marker at the start of a paragraph.
static ORDERED_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)([.)])(\s|$)").expect("valid ordered-start regex"));

/// Convert a document to Markdown.
pub fn to_markdown(doc: &Document, options: &RenderOptions) -> Result<String> {
    Ok(MarkdownRenderer::new(options.clone()).render_string(doc))
}

/// Markdown renderer.
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a document to a Markdown string.
    pub fn render_string(&self, doc: &Document) -> String {
        let mut output = String::new();
        for block in &doc.blocks {
            let rendered = self.render_block(block);
            if rendered.is_empty() {
                continue;
            }
            output.push_str(&rendered);
            output.push_str("\n\n");
        }

        let trimmed = output.trim_end();
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("{trimmed}\n")
        }
    }

    fn render_block(&self, block: &Block) -> String {
        match block {
            Block::Heading { level, content, .. } => {
                let text = self.render_inline(content);
                if text.is_empty() {
                    return text;
                }
                format!("{} {}", "#".repeat((*level).clamp(1, 6) as usize), text)
            }
            Block::Paragraph { content, .. } => {
                let text = self.render_inline(content);
                self.escape_block_start(text)
            }
            Block::List(list) => self.render_list(list),
            Block::Table(table) => self.render_table(table),
        }
    }

    fn render_list(&self, list: &List) -> String {
        let labels = synthesize_labels(list);
        let levels = item_levels(&list.items);
        let mut lines = Vec::with_capacity(list.items.len());

        for ((item, label), level) in list.items.iter().zip(&labels).zip(levels) {
            let marker = match item.marker.kind {
                MarkerKind::Bullet => "-".to_string(),
                _ => format!("{}.", label.trim_end_matches(['.', ')'])),
            };
            let text = self.escape_block_start(self.render_inline(&item.content));
            lines.push(format!("{}{} {}", "    ".repeat(level), marker, text));
        }
        lines.join("\n")
    }

    fn render_table(&self, table: &Table) -> String {
        if table.is_empty() || table.column_count() == 0 {
            return String::new();
        }

        let mut output = String::new();
        for (i, row) in table.rows.iter().enumerate() {
            output.push('|');
            for cell in row {
                let content = cell.replace('\n', " ");
                output.push_str(&format!(" {} |", self.escape_cell(content.trim())));
            }
            output.push('\n');

            // Separator after the first row
            if i == 0 {
                output.push('|');
                for _ in row {
                    output.push_str(" --- |");
                }
                output.push('\n');
            }
        }
        output.trim_end().to_string()
    }

    fn render_inline(&self, runs: &[TextRun]) -> String {
        let mut output = String::new();
        for run in runs {
            let text = if self.options.escape_special_chars {
                escape_markdown(&run.text)
            } else {
                run.text.clone()
            };
            output.push_str(&apply_text_style(&text, run.bold, run.italic));
        }
        output.trim().to_string()
    }

    fn escape_cell(&self, text: &str) -> String {
        if self.options.escape_special_chars {
            escape_markdown(text)
        } else {
            text.replace('|', "\\|")
        }
    }

    /// Escape a leading character that would turn a paragraph into other
    /// Markdown syntax.
    fn escape_block_start(&self, text: String) -> String {
        if !self.options.escape_special_chars {
            return text;
        }
        if text.starts_with('#')
            || text.starts_with('>')
            || text.starts_with("- ")
            || text.starts_with("+ ")
        {
            return format!("\\{text}");
        }
        if let Some(caps) = ORDERED_START.captures(&text) {
            let digits = caps[1].len();
            return format!("{}\\{}", &text[..digits], &text[digits..]);
        }
        text
    }
}

impl Renderer for MarkdownRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }

    fn render(&self, doc: &Document) -> Result<Vec<u8>> {
        Ok(self.render_string(doc).into_bytes())
    }
}

/// Wrap text in emphasis markers, keeping edge whitespace outside them.
fn apply_text_style(text: &str, bold: bool, italic: bool) -> String {
    let marker = match (bold, italic) {
        (true, true) => "***",
        (true, false) => "**",
        (false, true) => "*",
        (false, false) => return text.to_string(),
    };

    let inner = text.trim();
    if inner.is_empty() {
        return text.to_string();
    }
    let start = text.len() - text.trim_start().len();
    let end = text.trim_end().len();
    format!("{}{marker}{inner}{marker}{}", &text[..start], &text[end..])
}

/// Escape special Markdown characters.
/// Only escape characters that could be misinterpreted as Markdown syntax.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            // Core formatting that must be escaped
            '\\' | '`' | '*' | '_' |
            // Brackets for links/images, pipe for tables
            '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}
