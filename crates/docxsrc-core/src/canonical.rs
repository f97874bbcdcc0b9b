//! Markup canonicalization
//!
//! Raw element markup is re-parsed (whitespace-only text outside
//! `xml:space="preserve"` scopes is dropped), normalized, and written back
//! with two-space indentation. Elements holding text are written inline so
//! their text survives untouched, and nothing is indented inside a preserve
//! scope. Feeding the output back in yields the same output.

use docxsrc_opc::xml::{self, escape_attribute, escape_text, Content, Element, ParseOptions};

use crate::error::Result;

const INDENT: &str = "  ";

/// Canonicalize raw markup; blank input gives an empty string
pub fn canonicalize(raw: &str) -> Result<String> {
    if raw.trim().is_empty() {
        return Ok(String::new());
    }

    let mut root = xml::parse(raw.as_bytes(), ParseOptions::default())?;
    root.normalize();

    let mut out = String::with_capacity(raw.len() + raw.len() / 4);
    write_element(&mut out, &root, 0, true);
    Ok(out)
}

/// Canonical markup of an element
pub fn canonicalize_element(element: &Element) -> Result<String> {
    canonicalize(&element.outer_xml())
}

fn newline(out: &mut String, depth: usize) {
    if !out.is_empty() {
        out.push('\n');
    }
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn write_element(out: &mut String, element: &Element, depth: usize, indent: bool) {
    if indent {
        newline(out, depth);
    }

    out.push('<');
    out.push_str(&element.name().to_string());
    for attr in element.attributes() {
        out.push(' ');
        out.push_str(&attr.name.to_string());
        out.push_str("=\"");
        out.push_str(&escape_attribute(&attr.value));
        out.push('"');
    }

    if element.children().is_empty() {
        out.push_str(" />");
        return;
    }
    out.push('>');

    let indent_children =
        indent && !element.has_text() && element.xml_space() != Some("preserve");
    for child in element.children() {
        write_content(out, child, depth + 1, indent_children);
    }

    if indent_children {
        newline(out, depth);
    }
    out.push_str("</");
    out.push_str(&element.name().to_string());
    out.push('>');
}

fn write_content(out: &mut String, content: &Content, depth: usize, indent: bool) {
    match content {
        Content::Element(element) => write_element(out, element, depth, indent),
        Content::Text(text) => out.push_str(&escape_text(text)),
        Content::CData(data) => {
            out.push_str("<![CDATA[");
            out.push_str(data);
            out.push_str("]]>");
        }
        Content::Comment(comment) => {
            if indent {
                newline(out, depth);
            }
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

    #[test]
    fn test_indents_element_only_content() {
        let raw = format!(r#"<w:p xmlns:w="{W}"><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>Hi</w:t></w:r></w:p>"#);
        let expected = format!(
            "<w:p xmlns:w=\"{W}\">\n  <w:pPr>\n    <w:pStyle w:val=\"Title\" />\n  </w:pPr>\n  <w:r>\n    <w:t>Hi</w:t>\n  </w:r>\n</w:p>"
        );
        assert_eq!(canonicalize(&raw).unwrap(), expected);
    }

    #[test]
    fn test_blank_input_is_empty() {
        assert_eq!(canonicalize("").unwrap(), "");
        assert_eq!(canonicalize("  \n").unwrap(), "");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            format!(r#"<w:p xmlns:w="{W}"><w:r><w:t xml:space="preserve">  two  spaces </w:t></w:r></w:p>"#),
            "<a>\n\n   <b>x</b>   <c/><!--note--></a>".to_string(),
            "<a>mixed <b>bold</b> text</a>".to_string(),
            r#"<a k="tab&#9;line&#10;quote&quot;"><b><![CDATA[<raw>]]></b></a>"#.to_string(),
        ];
        for raw in inputs {
            let once = canonicalize(&raw).unwrap();
            let twice = canonicalize(&once).unwrap();
            assert_eq!(once, twice, "not idempotent for {raw}");
        }
    }

    #[test]
    fn test_preserve_scope_not_indented() {
        let raw = r#"<a><b xml:space="preserve"><c> x </c><d/></b></a>"#;
        assert_eq!(
            canonicalize(raw).unwrap(),
            "<a>\n  <b xml:space=\"preserve\"><c> x </c><d /></b>\n</a>"
        );
    }

    #[test]
    fn test_mixed_content_inline() {
        let raw = "<a><p>one <b>two</b> three</p></a>";
        assert_eq!(
            canonicalize(raw).unwrap(),
            "<a>\n  <p>one <b>two</b> three</p>\n</a>"
        );
    }

    #[test]
    fn test_whitespace_between_elements_dropped() {
        let raw = "<a>\n    <b />\n\t<c />\n</a>";
        assert_eq!(canonicalize(raw).unwrap(), "<a>\n  <b />\n  <c />\n</a>");
    }

    #[test]
    fn test_malformed_input_fails() {
        assert!(canonicalize("<a><b></a>").is_err());
    }
}
