//! Package Model Tests
//!
//! End-to-end checks of `OpenXmlPackage` over the fixture packages.

use docxsrc_opc::test_utils::PackageBuilder;
use docxsrc_opc::xml::{self, ParseOptions};
use docxsrc_opc::{Content, OpenXmlPackage, PackageKind, RawPackage};

// =============================================================================
// Detection
// =============================================================================

#[test]
fn test_each_preset_detects_its_kind() {
    let cases = [
        (PackageBuilder::word(), PackageKind::Wordprocessing),
        (PackageBuilder::spreadsheet(), PackageKind::Spreadsheet),
        (PackageBuilder::presentation(), PackageKind::Presentation),
    ];
    for (builder, expected) in cases {
        let raw = RawPackage::from_bytes(&builder.build().unwrap()).unwrap();
        assert_eq!(PackageKind::detect(&raw), Some(expected));
    }
}

#[test]
fn test_spreadsheet_opens_parts_in_relationship_order() {
    let bytes = PackageBuilder::spreadsheet().build().unwrap();
    let package = OpenXmlPackage::from_bytes(&bytes).unwrap();

    assert_eq!(package.kind().type_name(), "SpreadsheetDocument");
    let (_, workbook) = package.main_part().unwrap();
    let children: Vec<_> = workbook
        .relationships()
        .iter()
        .map(|r| (r.id.as_str(), package.part(r.part).type_name()))
        .collect();
    assert_eq!(
        children,
        vec![("rId1", "WorksheetPart"), ("rId2", "SharedStringTablePart")]
    );
}

// =============================================================================
// Elements
// =============================================================================

#[test]
fn test_worksheet_rows_expose_reference() {
    let bytes = PackageBuilder::spreadsheet().build().unwrap();
    let package = OpenXmlPackage::from_bytes(&bytes).unwrap();
    let (_, sheet) = package.part_by_uri("/xl/worksheets/sheet1.xml").unwrap();
    let root = sheet.root_element().unwrap();

    let sheet_data = root.child_elements().next().unwrap();
    assert_eq!(sheet_data.type_name(), "SheetData");
    let rows: Vec<_> = sheet_data.child_elements().collect();
    assert_eq!(rows[0].type_name(), "Row");
    assert_eq!(rows[0].attribute("r"), Some("5"));
    assert_eq!(rows[1].attribute("r"), None);
}

#[test]
fn test_preserved_whitespace_survives_parse() {
    let bytes = PackageBuilder::word().build().unwrap();
    let package = OpenXmlPackage::from_bytes(&bytes).unwrap();
    let (_, main) = package.main_part().unwrap();
    let body = main.root_element().unwrap().child_elements().next().unwrap();
    let second = body.child_elements().nth(1).unwrap();
    let run = second.child_elements().next().unwrap();
    let text = run.child_elements().next().unwrap();

    assert_eq!(text.type_name(), "Text");
    assert_eq!(text.children(), &[Content::Text("  spaced  ".to_string())]);
}

#[test]
fn test_outer_xml_declares_inherited_namespaces() {
    let bytes = PackageBuilder::word().build().unwrap();
    let package = OpenXmlPackage::from_bytes(&bytes).unwrap();
    let (_, main) = package.main_part().unwrap();
    let body = main.root_element().unwrap().child_elements().next().unwrap();
    let paragraph = body.child_elements().next().unwrap();

    let outer = paragraph.outer_xml();
    assert!(outer.starts_with("<w:p xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">"));

    let reparsed = xml::parse(outer.as_bytes(), ParseOptions::default()).unwrap();
    assert_eq!(reparsed.type_name(), "Paragraph");
}

#[test]
fn test_open_from_file_reader() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deck.pptx");
    std::fs::write(&path, PackageBuilder::presentation().build().unwrap()).unwrap();

    let raw = RawPackage::from_reader(std::fs::File::open(&path).unwrap()).unwrap();
    assert!(raw.part_exists("/ppt/presentation.xml"));

    let package = OpenXmlPackage::detect_and_open(&raw).unwrap();
    assert_eq!(package.kind(), PackageKind::Presentation);
    let (_, main) = package.main_part().unwrap();
    assert_eq!(main.type_name(), "PresentationPart");
}
