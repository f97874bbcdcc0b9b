//! Session Lifecycle Tests
//!
//! Opening packages from disk and memory, tree shape, rendering and the
//! auto-render/highlight flags, driven through the public `Session` API.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use docxsrc_core::{
    canonicalize, render_markup, FileDialog, NodeKind, Session, SessionError, SessionState, Tree,
};
use docxsrc_opc::test_utils::{PackageBuilder, WORKBOOK_XML};

fn open(builder: PackageBuilder, label: &str) -> Session {
    let mut session = Session::new();
    session
        .open_bytes(label, builder.build().unwrap())
        .unwrap();
    session
}

fn headers(tree: &Tree, path: &str) -> Vec<String> {
    let id = tree.resolve_path(path).unwrap();
    tree.node(id)
        .unwrap()
        .children()
        .iter()
        .map(|c| tree.node(*c).unwrap().header().to_string())
        .collect()
}

fn header(tree: &Tree, path: &str) -> String {
    let id = tree.resolve_path(path).unwrap();
    tree.node(id).unwrap().header().to_string()
}

struct ScriptedDialog {
    answer: Option<PathBuf>,
    hint: RefCell<Option<PathBuf>>,
}

impl ScriptedDialog {
    fn new(answer: Option<PathBuf>) -> Self {
        Self {
            answer,
            hint: RefCell::new(None),
        }
    }
}

impl FileDialog for ScriptedDialog {
    fn pick_file(&self, initial_dir: Option<&Path>) -> Option<PathBuf> {
        *self.hint.borrow_mut() = initial_dir.map(Path::to_path_buf);
        self.answer.clone()
    }
}

// =============================================================================
// Tree shape
// =============================================================================

#[test]
fn test_spreadsheet_tree() {
    let session = open(PackageBuilder::spreadsheet(), "book.xlsx");
    let tree = session.tree();

    assert_eq!(tree.root().children().len(), 1);
    assert!(header(tree, "0").contains("book.xlsx"));
    assert_eq!(
        headers(tree, "0"),
        vec![
            "[rId1] /xl/workbook.xml (WorkbookPart)",
            "[rId2] /docProps/core.xml (CoreFilePropertiesPart)",
        ]
    );
    assert_eq!(
        headers(tree, "0/0"),
        vec![
            "[rId1] /xl/worksheets/sheet1.xml (WorksheetPart)",
            "[rId2] /xl/sharedStrings.xml (SharedStringTablePart)",
            "<0> sheets (Sheets)",
        ]
    );
}

#[test]
fn test_row_and_cell_headers() {
    let session = open(PackageBuilder::spreadsheet(), "book.xlsx");
    let tree = session.tree();

    assert_eq!(
        headers(tree, "0/0/0/0"),
        vec!["<0> row (Row) [5]", "<1> row (Row)"]
    );
    assert_eq!(
        headers(tree, "0/0/0/0/0"),
        vec!["<0> c (Cell) [A5]", "<1> c (Cell) [B5]"]
    );
    assert!(header(tree, "0/0/0/0/0").ends_with("[5]"));
    assert_eq!(headers(tree, "0/0/0/0/1"), vec!["<0> c (Cell)"]);
}

#[test]
fn test_sibling_indices_follow_construction_order() {
    for builder in [
        PackageBuilder::word(),
        PackageBuilder::spreadsheet(),
        PackageBuilder::presentation(),
    ] {
        let session = open(builder, "doc");
        let tree = session.tree();

        let package = tree.resolve_path("0").unwrap();
        let nodes = std::iter::once((package, 0)).chain(tree.descendants(package));
        for (id, _) in nodes {
            let mut parts = 0;
            let mut elements = 0;
            for child in tree.node(id).unwrap().children() {
                let node = tree.node(*child).unwrap();
                let expected = match node.kind() {
                    NodeKind::Element(_) => {
                        elements += 1;
                        elements - 1
                    }
                    _ => {
                        parts += 1;
                        parts - 1
                    }
                };
                assert_eq!(node.index(), expected, "{}", node.header());
            }
        }
    }
}

#[test]
fn test_word_wins_over_spreadsheet() {
    let builder = PackageBuilder::word().part(
        "/xl/workbook.xml",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
        WORKBOOK_XML,
    );
    let session = open(builder, "both.docx");
    let package = session.package().unwrap();
    assert_eq!(package.kind().type_name(), "WordprocessingDocument");
    assert_eq!(
        header(session.tree(), "0/0"),
        "[rId1] /word/document.xml (MainDocumentPart)"
    );
}

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn test_canonical_markup_is_idempotent_for_every_element() {
    let session = open(PackageBuilder::word(), "report.docx");
    let tree = session.tree();

    let mut checked = 0;
    for (id, _) in tree.descendants(tree.resolve_path("0").unwrap()) {
        let markup = render_markup(tree, id).unwrap();
        match tree.node(id).unwrap().kind() {
            NodeKind::Element(_) => {
                assert!(!markup.is_empty());
                assert_eq!(canonicalize(&markup).unwrap(), markup);
                checked += 1;
            }
            _ => assert_eq!(markup, ""),
        }
    }
    assert!(checked > 5);
}

#[test]
fn test_preserved_text_survives_rendering() {
    let mut session = open(PackageBuilder::word(), "report.docx");
    // body -> second paragraph
    let paragraph = session.tree().resolve_path("0/0/1/1").unwrap();
    session.select(Some(paragraph)).unwrap();

    assert!(session
        .markup_view()
        .text()
        .contains("<w:t xml:space=\"preserve\">  spaced  </w:t>"));
    assert!(session.code_view().text().contains("\"  spaced  \""));
}

#[test]
fn test_switching_backend_rerenders_code_only() {
    let mut session = open(PackageBuilder::spreadsheet(), "book.xlsx");
    let row = session.tree().resolve_path("0/0/0/0/0").unwrap();
    session.select(Some(row)).unwrap();
    let markup = session.markup_view().text().to_string();
    let nodes = session.tree().len();

    session.select_backend("Visual Basic.Net").unwrap();
    assert!(session
        .code_view()
        .text()
        .contains("Public Function GenerateRow() As Row"));
    assert_eq!(session.markup_view().text(), markup);
    assert_eq!(session.code_view().syntax().unwrap().name(), "VB");
    assert_eq!(session.tree().len(), nodes);
}

#[test]
fn test_auto_render_disabled_then_reenabled() {
    let mut session = open(PackageBuilder::word(), "report.docx");
    let body = session.tree().resolve_path("0/0/1").unwrap();
    let styles_root = session.tree().resolve_path("0/0/0/0").unwrap();

    session.select(Some(body)).unwrap();
    assert!(session.is_element());

    session.set_auto_render(false).unwrap();
    assert_eq!(session.code_view().text(), "");
    assert_eq!(session.markup_view().text(), "");
    assert!(!session.is_element());

    session.select(Some(styles_root)).unwrap();
    assert_eq!(session.code_view().text(), "");
    assert_eq!(session.markup_view().text(), "");
    assert!(session.markup_view().syntax().is_none());

    session.set_auto_render(true).unwrap();
    session.select(Some(styles_root)).unwrap();
    assert!(session.code_view().text().contains("GenerateStyle"));
    assert!(session.markup_view().text().contains("w:styleId=\"Heading1\""));
}

#[test]
fn test_package_node_code() {
    let mut session = open(PackageBuilder::presentation(), "deck.pptx");
    let package = session.tree().resolve_path("0").unwrap();
    session.select(Some(package)).unwrap();

    let code = session.code_view().text();
    assert!(code.contains("public void CreatePackage(string filePath)"));
    assert!(code.contains("PresentationDocument.Create(filePath, PresentationDocumentType.Presentation)"));
    assert!(!session.is_element());
}

// =============================================================================
// Opening from disk
// =============================================================================

#[tokio::test]
async fn test_open_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.docx");
    std::fs::write(&path, PackageBuilder::word().build().unwrap()).unwrap();

    let mut session = Session::new();
    let id = session.open(&path).await.unwrap();

    assert_eq!(session.state(), SessionState::Open);
    assert_eq!(session.tree().node(id).unwrap().header(), "report.docx");
    assert_eq!(session.last_directory(), Some(dir.path()));
}

#[tokio::test]
async fn test_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(PackageBuilder::word(), "report.docx");

    let result = session.open(dir.path().join("missing.docx")).await;
    assert!(matches!(result, Err(SessionError::Io(_))));
    assert_eq!(session.state(), SessionState::Empty);
    assert!(session.tree().is_empty());
    assert!(!session.holds_resources());
}

#[tokio::test]
async fn test_open_unsupported_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.zip");
    let bytes = PackageBuilder::empty()
        .part("/readme.xml", "application/xml", "<readme/>")
        .build()
        .unwrap();
    std::fs::write(&path, bytes).unwrap();

    let mut session = Session::new();
    let result = session.open(&path).await;
    assert!(matches!(result, Err(SessionError::UnsupportedDocument)));
    assert_eq!(session.state(), SessionState::Empty);
}

#[tokio::test]
async fn test_dialog_uses_last_directory() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("book.xlsx");
    let second = dir.path().join("deck.pptx");
    std::fs::write(&first, PackageBuilder::spreadsheet().build().unwrap()).unwrap();
    std::fs::write(&second, PackageBuilder::presentation().build().unwrap()).unwrap();

    let mut session = Session::new();
    let dialog = ScriptedDialog::new(Some(first.clone()));
    assert!(session.open_with_dialog(&dialog).await.unwrap().is_some());
    assert_eq!(session.file_name(), Some("book.xlsx"));

    let dialog = ScriptedDialog::new(Some(second));
    session.open_with_dialog(&dialog).await.unwrap();
    assert_eq!(dialog.hint.borrow().as_deref(), Some(dir.path()));
    assert_eq!(session.file_name(), Some("deck.pptx"));
}

#[tokio::test]
async fn test_cancelled_dialog_changes_nothing() {
    let mut session = open(PackageBuilder::word(), "report.docx");
    let body = session.tree().resolve_path("0/0/1").unwrap();
    session.select(Some(body)).unwrap();
    let code = session.code_view().text().to_string();

    let dialog = ScriptedDialog::new(None);
    assert_eq!(session.open_with_dialog(&dialog).await.unwrap(), None);
    assert_eq!(session.state(), SessionState::Open);
    assert_eq!(session.selected(), Some(body));
    assert_eq!(session.code_view().text(), code);
}

#[test]
fn test_double_release() {
    let mut session = open(PackageBuilder::spreadsheet(), "book.xlsx");
    session.release();
    session.release();
    assert!(!session.holds_resources());

    session.close();
    session.close();
    assert_eq!(session.state(), SessionState::Empty);
    assert!(session.tree().is_empty());
}
