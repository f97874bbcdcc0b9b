//! Relationship parsing for OPC packages
//!
//! Every part (and the package itself) may carry a `_rels/*.rels` file that
//! maps relationship IDs to targets. Internal targets are other parts of the
//! package; external targets are URLs or file paths outside of it.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::Result;

/// OPC namespace for relationships
pub const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Common relationship type URIs
impl Relationship {
    /// Main document part of a package
    pub const TYPE_OFFICE_DOCUMENT: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    /// Hyperlink relationship type
    pub const TYPE_HYPERLINK: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
    /// Image relationship type
    pub const TYPE_IMAGE: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    /// Styles relationship type
    pub const TYPE_STYLES: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    /// Worksheet relationship type
    pub const TYPE_WORKSHEET: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
}

/// One entry of a `.rels` file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (`rId1`)
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path or URL, as written
    pub target: String,
    /// `true` for `TargetMode="External"`
    pub external: bool,
}

/// Parsed relationships from a `.rels` file, in document order
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    entries: Vec<Relationship>,
}

impl Relationships {
    /// Create an empty relationship list
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse relationships from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut entries = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(ref e) | Event::Start(ref e) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let mut id = None;
                        let mut target = None;
                        let mut rel_type = None;
                        let mut external = false;

                        for attr in e.attributes() {
                            let attr = attr?;
                            let value = attr.unescape_value().map_err(quick_xml::Error::from)?;
                            match attr.key.as_ref() {
                                b"Id" => id = Some(value.into_owned()),
                                b"Target" => target = Some(value.into_owned()),
                                b"Type" => rel_type = Some(value.into_owned()),
                                b"TargetMode" => external = value == "External",
                                _ => {}
                            }
                        }

                        if let (Some(id), Some(target)) = (id, target) {
                            entries.push(Relationship {
                                id,
                                rel_type: rel_type.unwrap_or_default(),
                                target,
                                external,
                            });
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(Self { entries })
    }

    /// Iterate relationships in document order
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    /// Look up a relationship by ID
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.id == id)
    }

    /// Number of relationships
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no relationships
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Location of the relationships file for a part URI
///
/// `/word/document.xml` maps to `/word/_rels/document.xml.rels`; the package
/// root `/` maps to `/_rels/.rels`.
pub fn rels_path_for(part_uri: &str) -> String {
    let trimmed = part_uri.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => "/_rels/.rels".to_string(),
    }
}

/// Resolve an internal relationship target against its source part
///
/// Absolute targets (`/xl/styles.xml`) are taken as-is; relative targets
/// are resolved against the directory of the source part, collapsing `.`
/// and `..` segments. Use `/` as the source for package relationships.
pub fn resolve_target(source_uri: &str, target: &str) -> String {
    let target = target.split('#').next().unwrap_or(target);
    let mut segments: Vec<&str> = Vec::new();

    if !target.starts_with('/') {
        let base = match source_uri.rsplit_once('/') {
            Some((dir, _)) => dir,
            None => "",
        };
        segments.extend(base.split('/').filter(|s| !s.is_empty()));
    }

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELS: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/?a=1&amp;b=2" TargetMode="External"/>
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png"/>
</Relationships>"#;

    #[test]
    fn test_parse_keeps_document_order() {
        let rels = Relationships::parse(RELS).unwrap();
        let ids: Vec<_> = rels.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["rId3", "rId1", "rId2"]);
    }

    #[test]
    fn test_parse_external_and_escaped_target() {
        let rels = Relationships::parse(RELS).unwrap();
        let link = rels.get("rId3").unwrap();
        assert!(link.external);
        assert_eq!(link.target, "https://example.com/?a=1&b=2");
        assert_eq!(link.rel_type, Relationship::TYPE_HYPERLINK);

        assert!(!rels.get("rId1").unwrap().external);
    }

    #[test]
    fn test_parse_empty() {
        let rels = Relationships::parse(
            br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"/>"#,
        )
        .unwrap();
        assert!(rels.is_empty());
        assert_eq!(rels.len(), 0);
    }

    #[test]
    fn test_rels_path_for() {
        assert_eq!(
            rels_path_for("/word/document.xml"),
            "/word/_rels/document.xml.rels"
        );
        assert_eq!(rels_path_for("/"), "/_rels/.rels");
        assert_eq!(
            rels_path_for("/xl/worksheets/sheet1.xml"),
            "/xl/worksheets/_rels/sheet1.xml.rels"
        );
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("/", "word/document.xml"), "/word/document.xml");
        assert_eq!(resolve_target("/word/document.xml", "styles.xml"), "/word/styles.xml");
        assert_eq!(
            resolve_target("/word/document.xml", "../media/image1.png"),
            "/media/image1.png"
        );
        assert_eq!(
            resolve_target("/ppt/slides/slide1.xml", "/ppt/slideLayouts/./slideLayout1.xml"),
            "/ppt/slideLayouts/slideLayout1.xml"
        );
    }
}
