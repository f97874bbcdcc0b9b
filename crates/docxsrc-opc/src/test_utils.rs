//! Package fixtures for tests
//!
//! [`PackageBuilder`] assembles small but valid packages in memory. The
//! presets cover one document of each kind; parts and relationships can be
//! added on top to build the odd cases (shared parts, cycles, dangling
//! targets, binary parts).

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

use crate::archive::CONTENT_TYPES_PATH;
use crate::error::Result;
use crate::relationships::{rels_path_for, Relationship};
use crate::xml::escape_attribute;

/// Content type of the main part of a Word document
pub const WORD_MAIN_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";

/// `word/document.xml` of the Word preset
pub const WORD_DOCUMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p>
      <w:pPr><w:pStyle w:val="Heading1"/></w:pPr>
      <w:r><w:t>Hello</w:t></w:r>
    </w:p>
    <w:p>
      <w:r><w:t xml:space="preserve">  spaced  </w:t></w:r>
    </w:p>
    <w:sectPr/>
  </w:body>
</w:document>"#;

/// `word/styles.xml` of the Word preset
pub const WORD_STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:styleId="Heading1">
    <w:name w:val="heading 1"/>
  </w:style>
</w:styles>"#;

/// `docProps/core.xml` shared by all presets
pub const CORE_PROPERTIES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <dc:title>Sample</dc:title>
</cp:coreProperties>"#;

/// `xl/workbook.xml` of the spreadsheet preset
pub const WORKBOOK_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets>
    <sheet name="Sheet1" sheetId="1" r:id="rId1"/>
  </sheets>
</workbook>"#;

/// `xl/worksheets/sheet1.xml` of the spreadsheet preset
///
/// The first row carries `r="5"` and its cells carry references; the second
/// row carries none.
pub const WORKSHEET_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="5">
      <c r="A5" t="s"><v>0</v></c>
      <c r="B5"><v>42</v></c>
    </row>
    <row>
      <c><v>1</v></c>
    </row>
  </sheetData>
</worksheet>"#;

/// `xl/sharedStrings.xml` of the spreadsheet preset
pub const SHARED_STRINGS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="1" uniqueCount="1">
  <si><t>Hello</t></si>
</sst>"#;

/// `ppt/presentation.xml` of the presentation preset
pub const PRESENTATION_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <p:sldIdLst>
    <p:sldId id="256" r:id="rId1"/>
  </p:sldIdLst>
  <p:sldSz cx="9144000" cy="6858000"/>
</p:presentation>"#;

/// `ppt/slides/slide1.xml` of the presentation preset
pub const SLIDE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">
  <p:cSld>
    <p:spTree>
      <p:sp>
        <p:txBody>
          <a:bodyPr/>
          <a:p><a:r><a:t>Slide title</a:t></a:r></a:p>
        </p:txBody>
      </p:sp>
    </p:spTree>
  </p:cSld>
</p:sld>"#;

const CORE_PROPERTIES_TYPE: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";

#[derive(Debug, Clone)]
struct FixtureRelationship {
    id: String,
    rel_type: String,
    target: String,
    external: bool,
}

/// Builder for in-memory package fixtures
#[derive(Debug, Clone, Default)]
pub struct PackageBuilder {
    defaults: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
    parts: Vec<(String, Vec<u8>)>,
    relationships: Vec<(String, Vec<FixtureRelationship>)>,
    raw_entries: Vec<(String, Vec<u8>)>,
}

impl PackageBuilder {
    /// A package with only the default content types and no parts
    pub fn empty() -> Self {
        Self {
            defaults: vec![
                (
                    "rels".to_string(),
                    "application/vnd.openxmlformats-package.relationships+xml".to_string(),
                ),
                ("xml".to_string(), "application/xml".to_string()),
            ],
            ..Self::default()
        }
    }

    /// A Word document with a styles part and core properties
    pub fn word() -> Self {
        Self::empty()
            .part("/word/document.xml", WORD_MAIN_CONTENT_TYPE, WORD_DOCUMENT_XML)
            .part(
                "/word/styles.xml",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml",
                WORD_STYLES_XML,
            )
            .with_core_properties()
            .relationship(
                "/",
                "rId1",
                Relationship::TYPE_OFFICE_DOCUMENT,
                "word/document.xml",
            )
            .relationship("/", "rId2", CORE_PROPERTIES_TYPE, "docProps/core.xml")
            .relationship(
                "/word/document.xml",
                "rId1",
                Relationship::TYPE_STYLES,
                "styles.xml",
            )
    }

    /// A workbook with one worksheet and a shared string table
    pub fn spreadsheet() -> Self {
        Self::empty()
            .part(
                "/xl/workbook.xml",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
                WORKBOOK_XML,
            )
            .part(
                "/xl/worksheets/sheet1.xml",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml",
                WORKSHEET_XML,
            )
            .part(
                "/xl/sharedStrings.xml",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml",
                SHARED_STRINGS_XML,
            )
            .with_core_properties()
            .relationship(
                "/",
                "rId1",
                Relationship::TYPE_OFFICE_DOCUMENT,
                "xl/workbook.xml",
            )
            .relationship("/", "rId2", CORE_PROPERTIES_TYPE, "docProps/core.xml")
            .relationship(
                "/xl/workbook.xml",
                "rId1",
                Relationship::TYPE_WORKSHEET,
                "worksheets/sheet1.xml",
            )
            .relationship(
                "/xl/workbook.xml",
                "rId2",
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings",
                "sharedStrings.xml",
            )
    }

    /// A presentation with a single slide
    pub fn presentation() -> Self {
        Self::empty()
            .part(
                "/ppt/presentation.xml",
                "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml",
                PRESENTATION_XML,
            )
            .part(
                "/ppt/slides/slide1.xml",
                "application/vnd.openxmlformats-officedocument.presentationml.slide+xml",
                SLIDE_XML,
            )
            .with_core_properties()
            .relationship(
                "/",
                "rId1",
                Relationship::TYPE_OFFICE_DOCUMENT,
                "ppt/presentation.xml",
            )
            .relationship("/", "rId2", CORE_PROPERTIES_TYPE, "docProps/core.xml")
            .relationship(
                "/ppt/presentation.xml",
                "rId1",
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide",
                "slides/slide1.xml",
            )
    }

    fn with_core_properties(self) -> Self {
        self.part(
            "/docProps/core.xml",
            "application/vnd.openxmlformats-package.core-properties+xml",
            CORE_PROPERTIES_XML,
        )
    }

    /// Add (or replace) a markup part with an override content type
    pub fn part(self, uri: &str, content_type: &str, xml: &str) -> Self {
        self.binary_part(uri, content_type, xml.as_bytes())
    }

    /// Add (or replace) a part with arbitrary bytes
    pub fn binary_part(mut self, uri: &str, content_type: &str, data: &[u8]) -> Self {
        let uri = normalize_uri(uri);
        self.overrides.retain(|(name, _)| *name != uri);
        self.overrides.push((uri.clone(), content_type.to_string()));
        match self.parts.iter_mut().find(|(name, _)| *name == uri) {
            Some((_, bytes)) => *bytes = data.to_vec(),
            None => self.parts.push((uri, data.to_vec())),
        }
        self
    }

    /// Add an internal relationship from `source` (`/` for the package)
    pub fn relationship(self, source: &str, id: &str, rel_type: &str, target: &str) -> Self {
        self.push_relationship(source, id, rel_type, target, false)
    }

    /// Add an external relationship from `source`
    pub fn external_relationship(
        self,
        source: &str,
        id: &str,
        rel_type: &str,
        target: &str,
    ) -> Self {
        self.push_relationship(source, id, rel_type, target, true)
    }

    /// Add an archive entry verbatim, outside of the content type table
    pub fn raw_entry(mut self, name: &str, data: &[u8]) -> Self {
        self.raw_entries.push((name.to_string(), data.to_vec()));
        self
    }

    fn push_relationship(
        mut self,
        source: &str,
        id: &str,
        rel_type: &str,
        target: &str,
        external: bool,
    ) -> Self {
        let source = normalize_uri(source);
        let entry = FixtureRelationship {
            id: id.to_string(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            external,
        };
        match self.relationships.iter_mut().find(|(s, _)| *s == source) {
            Some((_, entries)) => {
                entries.retain(|r| r.id != id);
                entries.push(entry);
            }
            None => self.relationships.push((source, vec![entry])),
        }
        self
    }

    /// Write the package as ZIP bytes
    ///
    /// `[Content_Types].xml` comes first, then the package relationships,
    /// then parts and their relationship files in insertion order.
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        zip.start_file(CONTENT_TYPES_PATH, options)?;
        zip.write_all(self.content_types_xml().as_bytes())?;

        for (source, entries) in self.relationships.iter().filter(|(s, _)| s == "/") {
            zip.start_file(entry_name(&rels_path_for(source)), options)?;
            zip.write_all(relationships_xml(entries).as_bytes())?;
        }

        for (uri, data) in &self.parts {
            zip.start_file(entry_name(uri), options)?;
            zip.write_all(data)?;
        }

        for (source, entries) in self.relationships.iter().filter(|(s, _)| s != "/") {
            zip.start_file(entry_name(&rels_path_for(source)), options)?;
            zip.write_all(relationships_xml(entries).as_bytes())?;
        }

        for (name, data) in &self.raw_entries {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)?;
        }

        zip.finish()?;
        Ok(buffer.into_inner())
    }

    fn content_types_xml(&self) -> String {
        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\n",
        );
        for (extension, content_type) in &self.defaults {
            xml.push_str(&format!(
                "  <Default Extension=\"{}\" ContentType=\"{}\"/>\n",
                escape_attribute(extension),
                escape_attribute(content_type)
            ));
        }
        for (part_name, content_type) in &self.overrides {
            xml.push_str(&format!(
                "  <Override PartName=\"{}\" ContentType=\"{}\"/>\n",
                escape_attribute(part_name),
                escape_attribute(content_type)
            ));
        }
        xml.push_str("</Types>");
        xml
    }
}

fn relationships_xml(entries: &[FixtureRelationship]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\n",
    );
    for rel in entries {
        xml.push_str(&format!(
            "  <Relationship Id=\"{}\" Type=\"{}\" Target=\"{}\"{}/>\n",
            escape_attribute(&rel.id),
            escape_attribute(&rel.rel_type),
            escape_attribute(&rel.target),
            if rel.external { " TargetMode=\"External\"" } else { "" }
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn normalize_uri(uri: &str) -> String {
    format!("/{}", uri.trim_start_matches('/'))
}

fn entry_name(uri: &str) -> &str {
    uri.trim_start_matches('/')
}
