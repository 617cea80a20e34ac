//! DOCX (Office Open XML) rendering.
//!
//! Every XML part is built before the zip is written; a character that
//! XML 1.0 cannot carry fails the render with no partial package.

use std::collections::BTreeMap;
use std::io::{Cursor, Write};

use chrono::SecondsFormat;
use html_escape::{encode_double_quoted_attribute, encode_text};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};
use crate::model::{Alignment, Block, Document, List, ListMarker, MarkerKind, Table, TextRun};

use super::numbering::item_levels;
use super::{OutputFormat, Renderer};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Deepest `w:ilvl` Word supports.
const MAX_LIST_LEVEL: usize = 8;
/// Text width of a Letter page with 1" margins, in twentieths of a point.
const TEXT_WIDTH_TWIPS: usize = 9360;

/// DOCX renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxRenderer;

impl DocxRenderer {
    /// Create a new DOCX renderer.
    pub fn new() -> Self {
        Self
    }

    fn build_package(&self, doc: &Document) -> Result<Vec<(&'static str, String)>> {
        let mut numbering = Numbering::default();
        let document_xml = document_part(doc, &mut numbering)?;

        Ok(vec![
            ("[Content_Types].xml", content_types_part()),
            ("_rels/.rels", package_rels_part()),
            ("word/document.xml", document_xml),
            ("word/styles.xml", styles_part()),
            ("word/numbering.xml", numbering.to_xml()?),
            ("word/_rels/document.xml.rels", document_rels_part()),
            ("docProps/core.xml", core_part(doc)?),
        ])
    }
}

impl Renderer for DocxRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Docx
    }

    fn render(&self, doc: &Document) -> Result<Vec<u8>> {
        let parts = self.build_package(doc)?;

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, content) in &parts {
            zip.start_file(*name, options)?;
            zip.write_all(content.as_bytes())?;
        }
        let cursor = zip.finish()?;

        log::debug!("Wrote DOCX package with {} blocks", doc.blocks.len());
        Ok(cursor.into_inner())
    }
}

/// Reject characters XML 1.0 cannot carry.
fn check_xml_chars(text: &str) -> Result<()> {
    match text.chars().find(|&c| !is_xml_char(c)) {
        Some(c) => Err(Error::render(
            OutputFormat::Docx,
            format!("character U+{:04X} cannot be written to XML", c as u32),
        )),
        None => Ok(()),
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

fn xml_text(text: &str) -> Result<String> {
    check_xml_chars(text)?;
    Ok(encode_text(text).into_owned())
}

fn xml_attr(text: &str) -> Result<String> {
    check_xml_chars(text)?;
    Ok(encode_double_quoted_attribute(text).into_owned())
}

fn document_part(doc: &Document, numbering: &mut Numbering) -> Result<String> {
    let mut body = String::new();
    for block in &doc.blocks {
        match block {
            Block::Heading {
                level,
                content,
                alignment,
                ..
            } => {
                let style = format!("Heading{}", (*level).clamp(1, 6));
                body.push_str(&paragraph(Some(&style), None, *alignment, content, false)?);
            }
            Block::Paragraph {
                content, alignment, ..
            } => {
                body.push_str(&paragraph(None, None, *alignment, content, false)?);
            }
            Block::List(list) => {
                let num_id = numbering.add_list(list);
                let levels = item_levels(&list.items);
                for (item, level) in list.items.iter().zip(levels) {
                    let num_pr = (level.min(MAX_LIST_LEVEL), num_id);
                    body.push_str(&paragraph(
                        Some("ListParagraph"),
                        Some(num_pr),
                        Alignment::Left,
                        &item.content,
                        false,
                    )?);
                }
            }
            Block::Table(table) => body.push_str(&table_xml(table)?),
        }
    }
    // a table cannot be the last element of the body
    if matches!(doc.blocks.last(), Some(Block::Table(_))) {
        body.push_str("<w:p/>");
    }

    Ok(format!(
        "{XML_DECLARATION}\n<w:document xmlns:w=\"{W_NS}\" xmlns:r=\"{REL_NS}\"><w:body>{body}\
         <w:sectPr><w:pgSz w:w=\"12240\" w:h=\"15840\"/>\
         <w:pgMar w:top=\"1440\" w:right=\"1440\" w:bottom=\"1440\" w:left=\"1440\" \
         w:header=\"720\" w:footer=\"720\" w:gutter=\"0\"/></w:sectPr></w:body></w:document>"
    ))
}

fn paragraph(
    style: Option<&str>,
    num_pr: Option<(usize, u32)>,
    alignment: Alignment,
    runs: &[TextRun],
    force_bold: bool,
) -> Result<String> {
    let mut ppr = String::new();
    if let Some(style) = style {
        ppr.push_str(&format!("<w:pStyle w:val=\"{style}\"/>"));
    }
    if let Some((level, num_id)) = num_pr {
        ppr.push_str(&format!(
            "<w:numPr><w:ilvl w:val=\"{level}\"/><w:numId w:val=\"{num_id}\"/></w:numPr>"
        ));
    }
    if alignment != Alignment::Left {
        ppr.push_str(&format!("<w:jc w:val=\"{}\"/>", alignment.as_str()));
    }

    let mut xml = String::from("<w:p>");
    if !ppr.is_empty() {
        xml.push_str(&format!("<w:pPr>{ppr}</w:pPr>"));
    }
    for run in runs.iter().filter(|r| !r.is_empty()) {
        xml.push_str(&run_xml(run, force_bold)?);
    }
    xml.push_str("</w:p>");
    Ok(xml)
}

fn run_xml(run: &TextRun, force_bold: bool) -> Result<String> {
    let mut rpr = String::new();
    if run.bold || force_bold {
        rpr.push_str("<w:b/>");
    }
    if run.italic {
        rpr.push_str("<w:i/>");
    }

    let mut xml = String::from("<w:r>");
    if !rpr.is_empty() {
        xml.push_str(&format!("<w:rPr>{rpr}</w:rPr>"));
    }
    xml.push_str(&format!(
        "<w:t xml:space=\"preserve\">{}</w:t></w:r>",
        xml_text(&run.text)?
    ));
    Ok(xml)
}

fn table_xml(table: &Table) -> Result<String> {
    let columns = table.column_count().max(1);
    let width = TEXT_WIDTH_TWIPS / columns;

    let mut xml = String::from(
        "<w:tbl><w:tblPr><w:tblStyle w:val=\"TableGrid\"/><w:tblW w:w=\"0\" w:type=\"auto\"/></w:tblPr>",
    );
    xml.push_str("<w:tblGrid>");
    for _ in 0..columns {
        xml.push_str(&format!("<w:gridCol w:w=\"{width}\"/>"));
    }
    xml.push_str("</w:tblGrid>");

    for (i, row) in table.rows.iter().enumerate() {
        let header = table.has_header && i == 0;
        xml.push_str("<w:tr>");
        if header {
            xml.push_str("<w:trPr><w:tblHeader/></w:trPr>");
        }
        for cell in row {
            xml.push_str(&format!(
                "<w:tc><w:tcPr><w:tcW w:w=\"{width}\" w:type=\"dxa\"/></w:tcPr>"
            ));
            xml.push_str(&paragraph(
                None,
                None,
                Alignment::Left,
                &[TextRun::new(cell.as_str())],
                header,
            )?);
            xml.push_str("</w:tc>");
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
    Ok(xml)
}

/// Numbering definitions, one abstract definition and instance per list.
#[derive(Default)]
struct Numbering {
    /// Per list: marker of the first item at each level
    lists: Vec<BTreeMap<usize, ListMarker>>,
}

impl Numbering {
    /// Register a list and return its `w:numId`.
    fn add_list(&mut self, list: &List) -> u32 {
        let mut levels = BTreeMap::new();
        for (item, level) in list.items.iter().zip(item_levels(&list.items)) {
            levels
                .entry(level.min(MAX_LIST_LEVEL))
                .or_insert_with(|| item.marker.clone());
        }
        self.lists.push(levels);
        self.lists.len() as u32
    }

    fn to_xml(&self) -> Result<String> {
        let mut abstracts = String::new();
        let mut instances = String::new();

        for (i, levels) in self.lists.iter().enumerate() {
            abstracts.push_str(&format!(
                "<w:abstractNum w:abstractNumId=\"{i}\"><w:multiLevelType w:val=\"hybridMultilevel\"/>"
            ));
            for ilvl in 0..=MAX_LIST_LEVEL {
                let fallback = ListMarker::bullet("•");
                let marker = levels.get(&ilvl).unwrap_or(&fallback);
                abstracts.push_str(&level_xml(ilvl, marker)?);
            }
            abstracts.push_str("</w:abstractNum>");
            instances.push_str(&format!(
                "<w:num w:numId=\"{}\"><w:abstractNumId w:val=\"{i}\"/></w:num>",
                i + 1
            ));
        }

        Ok(format!(
            "{XML_DECLARATION}\n<w:numbering xmlns:w=\"{W_NS}\">{abstracts}{instances}</w:numbering>"
        ))
    }
}

fn level_xml(ilvl: usize, marker: &ListMarker) -> Result<String> {
    let upper = marker.is_uppercase();
    let num_fmt = match marker.kind {
        MarkerKind::Bullet => "bullet",
        MarkerKind::Numeric => "decimal",
        MarkerKind::Lettered if upper => "upperLetter",
        MarkerKind::Lettered => "lowerLetter",
        MarkerKind::Roman if upper => "upperRoman",
        MarkerKind::Roman => "lowerRoman",
    };
    let text = match marker.kind {
        MarkerKind::Bullet => xml_attr(&marker.label)?,
        _ => format!("%{}{}", ilvl + 1, marker.delimiter.unwrap_or('.')),
    };
    let start = marker.ordinal().unwrap_or(1);
    let indent = 720 * (ilvl + 1);

    Ok(format!(
        "<w:lvl w:ilvl=\"{ilvl}\"><w:start w:val=\"{start}\"/><w:numFmt w:val=\"{num_fmt}\"/>\
         <w:lvlText w:val=\"{text}\"/><w:lvlJc w:val=\"left\"/>\
         <w:pPr><w:ind w:left=\"{indent}\" w:hanging=\"360\"/></w:pPr></w:lvl>"
    ))
}

fn content_types_part() -> String {
    format!(
        "{XML_DECLARATION}\n\
         <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
         <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
         <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
         <Override PartName=\"/word/document.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>\
         <Override PartName=\"/word/styles.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml\"/>\
         <Override PartName=\"/word/numbering.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml\"/>\
         <Override PartName=\"/docProps/core.xml\" ContentType=\"application/vnd.openxmlformats-package.core-properties+xml\"/>\
         </Types>"
    )
}

fn package_rels_part() -> String {
    format!(
        "{XML_DECLARATION}\n\
         <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
         <Relationship Id=\"rId1\" Type=\"{REL_NS}/officeDocument\" Target=\"word/document.xml\"/>\
         <Relationship Id=\"rId2\" Type=\"http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties\" Target=\"docProps/core.xml\"/>\
         </Relationships>"
    )
}

fn document_rels_part() -> String {
    format!(
        "{XML_DECLARATION}\n\
         <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
         <Relationship Id=\"rId1\" Type=\"{REL_NS}/styles\" Target=\"styles.xml\"/>\
         <Relationship Id=\"rId2\" Type=\"{REL_NS}/numbering\" Target=\"numbering.xml\"/>\
         </Relationships>"
    )
}

fn core_part(doc: &Document) -> Result<String> {
    let mut props = String::new();
    if let Some(title) = doc.title() {
        props.push_str(&format!("<dc:title>{}</dc:title>", xml_text(&title)?));
    }
    props.push_str("<dc:creator>pdfshape</dc:creator>");
    if let Some(created) = doc.metadata.created {
        props.push_str(&format!(
            "<dcterms:created xsi:type=\"dcterms:W3CDTF\">{}</dcterms:created>",
            created.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
    }

    Ok(format!(
        "{XML_DECLARATION}\n\
         <cp:coreProperties xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" \
         xmlns:dc=\"http://purl.org/dc/elements/1.1/\" xmlns:dcterms=\"http://purl.org/dc/terms/\" \
         xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">{props}</cp:coreProperties>"
    ))
}

fn styles_part() -> String {
    // half-point sizes for Heading1..Heading6
    const HEADING_SIZES: [u32; 6] = [32, 28, 26, 24, 22, 22];

    let mut styles = String::from(
        "<w:docDefaults><w:rPrDefault><w:rPr><w:sz w:val=\"22\"/></w:rPr></w:rPrDefault>\
         <w:pPrDefault><w:pPr><w:spacing w:after=\"160\"/></w:pPr></w:pPrDefault></w:docDefaults>\
         <w:style w:type=\"paragraph\" w:default=\"1\" w:styleId=\"Normal\"><w:name w:val=\"Normal\"/></w:style>",
    );
    for (i, size) in HEADING_SIZES.iter().enumerate() {
        let n = i + 1;
        styles.push_str(&format!(
            "<w:style w:type=\"paragraph\" w:styleId=\"Heading{n}\"><w:name w:val=\"heading {n}\"/>\
             <w:basedOn w:val=\"Normal\"/><w:next w:val=\"Normal\"/><w:qFormat/>\
             <w:pPr><w:keepNext/><w:spacing w:before=\"240\" w:after=\"80\"/><w:outlineLvl w:val=\"{i}\"/></w:pPr>\
             <w:rPr><w:b/><w:sz w:val=\"{size}\"/></w:rPr></w:style>"
        ));
    }
    styles.push_str(
        "<w:style w:type=\"paragraph\" w:styleId=\"ListParagraph\"><w:name w:val=\"List Paragraph\"/>\
         <w:basedOn w:val=\"Normal\"/><w:qFormat/><w:pPr><w:ind w:left=\"720\"/><w:contextualSpacing/></w:pPr></w:style>\
         <w:style w:type=\"table\" w:styleId=\"TableGrid\"><w:name w:val=\"Table Grid\"/>\
         <w:tblPr><w:tblBorders>\
         <w:top w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>\
         <w:left w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>\
         <w:bottom w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>\
         <w:right w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>\
         <w:insideH w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>\
         <w:insideV w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>\
         </w:tblBorders></w:tblPr></w:style>",
    );

    format!("{XML_DECLARATION}\n<w:styles xmlns:w=\"{W_NS}\">{styles}</w:styles>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ListItem;

    fn part(doc: &Document, name: &str) -> String {
        let parts = DocxRenderer::default().build_package(doc).unwrap();
        parts
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, xml)| xml)
            .unwrap()
    }

    #[test]
    fn test_heading_style_and_alignment() {
        let mut doc = Document::new();
        doc.add_block(Block::Heading {
            level: 2,
            content: vec![TextRun::bold("Intro")],
            alignment: Alignment::Center,
            page: 0,
        });

        let xml = part(&doc, "word/document.xml");
        assert!(xml.contains(
            "<w:pPr><w:pStyle w:val=\"Heading2\"/><w:jc w:val=\"center\"/></w:pPr>"
        ));
        assert!(xml.contains("<w:rPr><w:b/></w:rPr><w:t xml:space=\"preserve\">Intro</w:t>"));
    }

    #[test]
    fn test_list_numbering() {
        let mut list = List::new(MarkerKind::Roman, 0);
        list.add_item(ListItem::new("a", 0, ListMarker::ordered(MarkerKind::Roman, "ii", ')')));
        list.add_item(ListItem::new("b", 1, ListMarker::bullet("◦")));
        let mut doc = Document::new();
        doc.add_block(Block::List(list.clone()));
        doc.add_block(Block::List(list));

        let xml = part(&doc, "word/document.xml");
        assert!(xml.contains("<w:numPr><w:ilvl w:val=\"0\"/><w:numId w:val=\"1\"/></w:numPr>"));
        assert!(xml.contains("<w:numPr><w:ilvl w:val=\"1\"/><w:numId w:val=\"2\"/></w:numPr>"));

        let numbering = part(&doc, "word/numbering.xml");
        assert!(numbering.contains("<w:start w:val=\"2\"/><w:numFmt w:val=\"lowerRoman\"/><w:lvlText w:val=\"%1)\"/>"));
        assert!(numbering.contains("<w:numFmt w:val=\"bullet\"/><w:lvlText w:val=\"◦\"/>"));
        assert!(numbering.contains("<w:num w:numId=\"2\"><w:abstractNumId w:val=\"1\"/></w:num>"));
    }

    #[test]
    fn test_table_header_row() {
        let mut doc = Document::new();
        doc.add_block(Block::Table(Table::from_strings(
            vec![vec!["H1", "H2"], vec!["a", "b"]],
            true,
            0,
        )));

        let xml = part(&doc, "word/document.xml");
        assert_eq!(xml.matches("<w:tblHeader/>").count(), 1);
        assert_eq!(xml.matches("<w:tc>").count(), 4);
        assert!(xml.contains("<w:gridCol w:w=\"4680\"/>"));
        assert!(xml.contains("</w:tbl><w:p/><w:sectPr>"));
    }

    #[test]
    fn test_control_character_is_render_error() {
        let mut doc = Document::new();
        doc.add_block(Block::paragraph("bell\u{7}", 0));

        let err = DocxRenderer::default().render(&doc).unwrap_err();
        assert!(matches!(err, Error::Render { format: OutputFormat::Docx, .. }));
    }

    #[test]
    fn test_text_escaped() {
        let mut doc = Document::new();
        doc.add_block(Block::paragraph("R&D <team>", 0));
        let xml = part(&doc, "word/document.xml");
        assert!(xml.contains("R&amp;D &lt;team&gt;"));
    }

    #[test]
    fn test_empty_document_is_valid_package() {
        let bytes = DocxRenderer::default().render(&Document::new()).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
