//! Integration tests for the docxsrc CLI commands
//!
//! Packages are written to a temporary directory and every command writes
//! into an in-memory buffer.

use std::path::PathBuf;

use tempfile::TempDir;

use docxsrc_cli::{render_command, shell_command, tree_command, Settings};
use docxsrc_opc::test_utils::PackageBuilder;

fn write_package(dir: &TempDir, name: &str, builder: PackageBuilder) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, builder.build().unwrap()).unwrap();
    path
}

#[tokio::test]
async fn test_tree_command() {
    let dir = TempDir::new().unwrap();
    let path = write_package(&dir, "book.xlsx", PackageBuilder::spreadsheet());

    let mut out = Vec::new();
    tree_command(&path, false, &Settings::default(), &mut out)
        .await
        .unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "book.xlsx");
    assert_eq!(lines[1], "  [rId1] /xl/workbook.xml (WorkbookPart)");
    assert_eq!(lines[2], "    [rId1] /xl/worksheets/sheet1.xml (WorksheetPart)");
    assert!(lines.contains(&"        <0> row (Row) [5]"));
}

#[tokio::test]
async fn test_tree_command_with_paths() {
    let dir = TempDir::new().unwrap();
    let path = write_package(&dir, "report.docx", PackageBuilder::word());

    let mut out = Vec::new();
    tree_command(&path, true, &Settings::default(), &mut out)
        .await
        .unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.starts_with("0  report.docx\n"));
    assert!(text.contains("\n    0/0/1  <0> body (Body)\n"));
}

#[tokio::test]
async fn test_render_code_and_markup() {
    let dir = TempDir::new().unwrap();
    let path = write_package(&dir, "book.xlsx", PackageBuilder::spreadsheet());
    let settings = Settings::default();

    let mut out = Vec::new();
    render_command(&path, "0/0/0/0/0", None, false, false, &settings, &mut out)
        .await
        .unwrap();
    let code = String::from_utf8(out).unwrap();
    assert!(code.contains("public Row GenerateRow()"));
    assert!(code.contains("row1.SetAttribute(new OpenXmlAttribute(\"\", \"r\", \"\", \"5\"));"));

    let mut out = Vec::new();
    render_command(
        &path,
        "0/0/0/0/0",
        Some("Visual Basic.Net"),
        false,
        false,
        &settings,
        &mut out,
    )
    .await
    .unwrap();
    assert!(String::from_utf8(out)
        .unwrap()
        .contains("Public Function GenerateRow() As Row"));

    let mut out = Vec::new();
    render_command(&path, "0/0/0/0/0/1", None, true, false, &settings, &mut out)
        .await
        .unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "<c xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" r=\"B5\">\n  <v>42</v>\n</c>\n"
    );
}

#[tokio::test]
async fn test_render_respects_config_language() {
    let dir = TempDir::new().unwrap();
    let path = write_package(&dir, "report.docx", PackageBuilder::word());
    let settings =
        Settings::from_toml_str("[view]\nauto_render = false\nlanguage = \"Visual Basic.Net\"\n")
            .unwrap();

    let mut out = Vec::new();
    render_command(&path, "0/0/1", None, false, false, &settings, &mut out)
        .await
        .unwrap();
    assert!(String::from_utf8(out)
        .unwrap()
        .contains("Public Function GenerateBody() As Body"));
}

#[tokio::test]
async fn test_render_errors() {
    let dir = TempDir::new().unwrap();
    let path = write_package(&dir, "report.docx", PackageBuilder::word());
    let settings = Settings::default();
    let mut out = Vec::new();

    // root
    assert!(render_command(&path, "", None, false, false, &settings, &mut out)
        .await
        .is_err());
    assert!(render_command(&path, "0/7", None, false, false, &settings, &mut out)
        .await
        .is_err());
    assert!(render_command(&path, "0", Some("Ada"), false, false, &settings, &mut out)
        .await
        .is_err());
    assert!(render_command(
        &dir.path().join("missing.docx"),
        "0",
        None,
        false,
        false,
        &settings,
        &mut out
    )
    .await
    .is_err());
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_shell_session() {
    let dir = TempDir::new().unwrap();
    let word = write_package(&dir, "report.docx", PackageBuilder::word());
    let sheet = write_package(&dir, "book.xlsx", PackageBuilder::spreadsheet());

    let script = format!(
        "select 0/0/1\nauto off\nselect 0/0/0\nshow code\nopen {}\nls 0\nbogus\nquit\nls\n",
        sheet.display()
    );
    let mut out = Vec::new();
    shell_command(
        Some(&word),
        false,
        &Settings::default(),
        script.as_bytes(),
        &mut out,
    )
    .await
    .unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("selected <0> body (Body)\n"));
    assert!(text.contains("auto-render off\n"));
    // turning auto-render off empties the views
    assert!(!text.contains("GenerateBody"));
    assert!(!text.contains("GenerateStyles"));
    assert!(text.contains("0/0  [rId1] /xl/workbook.xml (WorkbookPart)\n"));
    assert!(text.contains("error: unknown command 'bogus'\n"));
    // nothing after quit runs
    assert!(!text.contains("\n0  book.xlsx\n"));
}
