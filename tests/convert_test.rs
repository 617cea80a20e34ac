//! Integration tests for layout loading and the conversion facade.

use std::io::Cursor;

use pdfshape::{
    convert, layouts_from_json, layouts_from_reader, Block, ConvertOptions, Converter,
    LayoutMode, OutputFormat, Pdfshape, RenderOptions,
};

const LAYOUT: &str = r#"{
  "pages": [
    {
      "index": 0,
      "width": 612,
      "height": 792,
      "spans": [
        {"text": "Quarterly Notes", "font": "Helvetica-Bold", "size": 22,
         "bbox": {"x0": 72, "y0": 720, "x1": 237, "y1": 742}},
        {"text": "Sales rose across", "font": "Helvetica", "size": 11,
         "bbox": {"x0": 72, "y0": 690, "x1": 165.5, "y1": 701}},
        {"text": "every region.", "font": "Helvetica", "size": 11,
         "bbox": {"x0": 72, "y0": 676, "x1": 138, "y1": 687}},
        {"text": "• Hire staff", "font": "Helvetica", "size": 11,
         "bbox": {"x0": 72, "y0": 646, "x1": 138, "y1": 657}},
        {"text": "• Open office", "font": "Helvetica", "size": 11,
         "bbox": {"x0": 72, "y0": 632, "x1": 143.5, "y1": 643}}
      ]
    }
  ]
}"#;

#[test]
fn test_layout_file_shapes() {
    let wrapped = layouts_from_json(LAYOUT).unwrap();
    assert_eq!(wrapped.len(), 1);
    assert_eq!(wrapped[0].spans.len(), 5);
    assert!(wrapped[0].spans[0].bold);
    assert!(!wrapped[0].spans[1].bold);

    let array = layouts_from_json(r#"[{"index": 0, "width": 612, "height": 792, "spans": []}]"#)
        .unwrap();
    assert_eq!(array.len(), 1);
    assert!(array[0].is_empty());

    let from_reader = layouts_from_reader(Cursor::new(LAYOUT.as_bytes())).unwrap();
    assert_eq!(from_reader, wrapped);
}

#[test]
fn test_convert_all_formats() {
    let pages = layouts_from_json(LAYOUT).unwrap();
    let options = ConvertOptions::new()
        .with_formats(OutputFormat::ALL)
        .with_name("notes");
    let result = convert(&pages, &options).unwrap();

    assert!(result.is_complete());
    let names: Vec<&str> = result
        .outputs
        .iter()
        .map(|(_, r)| r.as_ref().unwrap().file_name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["notes.txt", "notes.html", "notes.md", "notes.docx", "notes.json"]
    );

    let markdown = result.get(OutputFormat::Markdown).unwrap().as_str().unwrap();
    assert_eq!(
        markdown,
        "# **Quarterly Notes**\n\nSales rose across every region.\n\n- Hire staff\n- Open office\n"
    );

    let docx = result.get(OutputFormat::Docx).unwrap();
    assert!(docx.bytes.starts_with(b"PK"));
}

#[test]
fn test_convert_clean_mode() {
    let pages = layouts_from_json(LAYOUT).unwrap();
    let options = ConvertOptions::new()
        .with_formats([OutputFormat::Text])
        .with_layout_mode(LayoutMode::Clean);
    let result = Converter::new(options).convert(&pages).unwrap();

    assert_eq!(result.document.blocks.len(), 1);
    let text = result.get(OutputFormat::Text).unwrap().as_str().unwrap();
    assert_eq!(
        text,
        "Quarterly Notes Sales rose across every region. Hire staff Open office"
    );
}

#[test]
fn test_builder_pipeline() {
    let pages = layouts_from_json(LAYOUT).unwrap();
    let result = Pdfshape::new()
        .sequential()
        .with_render_options(RenderOptions::new().with_html_title("Notes"))
        .analyze(&pages)
        .unwrap();

    assert!(result.page_errors.is_empty());
    assert!(matches!(result.document().blocks[0], Block::Heading { level: 1, .. }));
    assert!(result.to_html().unwrap().contains("<title>Notes</title>"));
    assert_eq!(
        result.to_text().unwrap(),
        "Quarterly Notes\n\nSales rose across every region.\n\n• Hire staff\n• Open office"
    );
}
