//! HTML rendering.

use html_escape::encode_text;

use crate::error::Result;
use crate::model::{Alignment, Block, Document, List, MarkerKind, Table, TextRun};

use super::numbering::item_levels;
use super::{OutputFormat, RenderOptions, Renderer};

const STYLESHEET: &str = "table { border-collapse: collapse; width: 100%; margin: 20px 0; } \
th, td { border: 1px solid #ddd; padding: 8px; text-align: left; } \
th { background-color: #f2f2f2; }";

const DEFAULT_TITLE: &str = "PDF Content";

/// HTML renderer producing a standalone page.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    options: RenderOptions,
}

impl HtmlRenderer {
    /// Create a new HTML renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a document to an HTML string.
    pub fn render_string(&self, doc: &Document) -> String {
        let title = self
            .options
            .html_title
            .clone()
            .or_else(|| doc.title())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        let mut lines = vec![
            "<!DOCTYPE html>".to_string(),
            "<html>".to_string(),
            "<head>".to_string(),
            "<meta charset=\"UTF-8\">".to_string(),
            format!("<title>{}</title>", encode_text(&title)),
        ];
        if self.options.html_stylesheet {
            lines.push(format!("<style>{STYLESHEET}</style>"));
        }
        lines.push("</head>".to_string());
        lines.push("<body>".to_string());

        for block in &doc.blocks {
            self.render_block(&mut lines, block);
        }

        lines.push("</body>".to_string());
        lines.push("</html>".to_string());

        let mut output = lines.join("\n");
        output.push('\n');
        output
    }

    fn render_block(&self, lines: &mut Vec<String>, block: &Block) {
        match block {
            Block::Heading {
                level,
                content,
                alignment,
                ..
            } => {
                let level = (*level).clamp(1, 6);
                lines.push(format!(
                    "<h{level}{}>{}</h{level}>",
                    align_style(*alignment),
                    render_inline(content)
                ));
            }
            Block::Paragraph {
                content, alignment, ..
            } => {
                lines.push(format!(
                    "<p{}>{}</p>",
                    align_style(*alignment),
                    render_inline(content)
                ));
            }
            Block::List(list) => render_list(lines, list),
            Block::Table(table) => render_table(lines, table),
        }
    }
}

impl Renderer for HtmlRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Html
    }

    fn render(&self, doc: &Document) -> Result<Vec<u8>> {
        Ok(self.render_string(doc).into_bytes())
    }
}

fn align_style(alignment: Alignment) -> String {
    match alignment {
        Alignment::Left => String::new(),
        other => format!(" style=\"text-align: {};\"", other.as_str()),
    }
}

fn render_inline(runs: &[TextRun]) -> String {
    let mut output = String::new();
    for run in runs {
        let mut text = encode_text(&run.text).into_owned();
        if run.italic {
            text = format!("<em>{text}</em>");
        }
        if run.bold {
            text = format!("<strong>{text}</strong>");
        }
        output.push_str(&text);
    }
    output
}

/// Opening tag for a list of the given marker style.
fn list_open_tag(kind: MarkerKind, uppercase: bool, start: u32) -> String {
    let type_attr = match (kind, uppercase) {
        (MarkerKind::Bullet, _) => return "<ul>".to_string(),
        (MarkerKind::Numeric, _) => "",
        (MarkerKind::Lettered, false) => " type=\"a\"",
        (MarkerKind::Lettered, true) => " type=\"A\"",
        (MarkerKind::Roman, false) => " type=\"i\"",
        (MarkerKind::Roman, true) => " type=\"I\"",
    };
    if start == 1 {
        format!("<ol{type_attr}>")
    } else {
        format!("<ol{type_attr} start=\"{start}\">")
    }
}

fn list_close_tag(kind: MarkerKind) -> &'static str {
    if kind == MarkerKind::Bullet {
        "</ul>"
    } else {
        "</ol>"
    }
}

/// Nested `<ul>`/`<ol>` elements, one per depth level.
fn render_list(lines: &mut Vec<String>, list: &List) {
    let levels = item_levels(&list.items);
    // kinds of the currently open lists; each has an open <li>
    let mut open: Vec<MarkerKind> = Vec::new();

    for (item, level) in list.items.iter().zip(levels) {
        let kind = item.marker.kind;

        while open.len() > level + 1 {
            if let Some(closed) = open.pop() {
                lines.push("</li>".to_string());
                lines.push(list_close_tag(closed).to_string());
            }
        }
        if open.len() == level + 1 {
            lines.push("</li>".to_string());
            if open[level] != kind {
                if let Some(closed) = open.pop() {
                    lines.push(list_close_tag(closed).to_string());
                }
            }
        }
        if open.len() == level {
            let start = item.marker.ordinal().unwrap_or(1);
            lines.push(list_open_tag(kind, item.marker.is_uppercase(), start));
            open.push(kind);
        }

        lines.push(format!("<li>{}", render_inline(&item.content)));
    }

    while let Some(closed) = open.pop() {
        lines.push("</li>".to_string());
        lines.push(list_close_tag(closed).to_string());
    }
}

fn render_table(lines: &mut Vec<String>, table: &Table) {
    if table.is_empty() {
        return;
    }
    lines.push("<table>".to_string());

    if let Some(header) = table.header() {
        lines.push("<thead>".to_string());
        lines.push(render_row(header, "th"));
        lines.push("</thead>".to_string());
    }

    let body = table.body();
    if !body.is_empty() {
        lines.push("<tbody>".to_string());
        for row in body {
            lines.push(render_row(row, "td"));
        }
        lines.push("</tbody>".to_string());
    }

    lines.push("</table>".to_string());
}

fn render_row(cells: &[String], tag: &str) -> String {
    let mut row = String::from("<tr>");
    for cell in cells {
        row.push_str(&format!("<{tag}>{}</{tag}>", encode_text(cell)));
    }
    row.push_str("</tr>");
    row
}
