//! Typed package model
//!
//! [`OpenXmlPackage`] walks the relationship graph of a [`RawPackage`]
//! starting at the package root and loads every reachable part once. Parts
//! live in an arena addressed by [`PartId`]; relationships refer to parts by
//! id, so a part shared by several sources (or reachable through a cycle)
//! is stored a single time.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tracing::{debug, info};

use crate::archive::RawPackage;
use crate::error::{OpcError, Result};
use crate::relationships::{rels_path_for, resolve_target, Relationships};
use crate::schema;
use crate::xml::{self, Element, ParseOptions};

/// Content type assumed when `[Content_Types].xml` has no entry for a part
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// The three document kinds a package can be opened as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageKind {
    /// Word document (`/word/document.xml`)
    Wordprocessing,
    /// Excel workbook (`/xl/workbook.xml`)
    Spreadsheet,
    /// PowerPoint presentation (`/ppt/presentation.xml`)
    Presentation,
}

impl PackageKind {
    /// Probe order used by [`PackageKind::detect`]
    pub const DETECTION_ORDER: [PackageKind; 3] = [
        PackageKind::Wordprocessing,
        PackageKind::Spreadsheet,
        PackageKind::Presentation,
    ];

    /// Canonical location of the main part
    pub fn main_part_uri(self) -> &'static str {
        match self {
            PackageKind::Wordprocessing => "/word/document.xml",
            PackageKind::Spreadsheet => "/xl/workbook.xml",
            PackageKind::Presentation => "/ppt/presentation.xml",
        }
    }

    /// SDK document class name
    pub fn type_name(self) -> &'static str {
        match self {
            PackageKind::Wordprocessing => "WordprocessingDocument",
            PackageKind::Spreadsheet => "SpreadsheetDocument",
            PackageKind::Presentation => "PresentationDocument",
        }
    }

    /// SDK document-type enum member used when creating a package
    pub fn document_type(self) -> (&'static str, &'static str) {
        match self {
            PackageKind::Wordprocessing => ("WordprocessingDocumentType", "Document"),
            PackageKind::Spreadsheet => ("SpreadsheetDocumentType", "Workbook"),
            PackageKind::Presentation => ("PresentationDocumentType", "Presentation"),
        }
    }

    /// Detect the kind by probing main part locations in
    /// [`PackageKind::DETECTION_ORDER`]; the first hit wins
    pub fn detect(raw: &RawPackage) -> Option<PackageKind> {
        Self::DETECTION_ORDER
            .into_iter()
            .find(|kind| raw.part_exists(kind.main_part_uri()))
    }
}

/// Index of a part in its package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartId(usize);

impl PartId {
    /// Position in the package's part arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// An internal relationship to another part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartRelationship {
    /// Relationship ID
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target part
    pub part: PartId,
}

/// A relationship to something outside the package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalRelationship {
    /// Relationship ID
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target URL or path
    pub target: String,
}

/// A part of the package
#[derive(Debug, Clone)]
pub struct Part {
    uri: String,
    content_type: String,
    type_name: &'static str,
    relationships: Vec<PartRelationship>,
    external: Vec<ExternalRelationship>,
    root: Option<Arc<Element>>,
    data: Vec<u8>,
}

impl Part {
    /// Part URI (`/word/document.xml`)
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Content type
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Part class name (`MainDocumentPart`, `ExtendedPart`)
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Relationships to sub-parts, in relationship order
    pub fn relationships(&self) -> &[PartRelationship] {
        &self.relationships
    }

    /// External relationships, in relationship order
    pub fn external_relationships(&self) -> &[ExternalRelationship] {
        &self.external
    }

    /// Root element of XML parts
    pub fn root_element(&self) -> Option<&Arc<Element>> {
        self.root.as_ref()
    }

    /// Raw bytes of the part
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// File extension of the part name, with leading dot (`.xml`)
    pub fn extension(&self) -> &str {
        let file = self.uri.rsplit('/').next().unwrap_or(&self.uri);
        match file.rfind('.') {
            Some(pos) => &file[pos..],
            None => "",
        }
    }
}

/// A package opened as one of the known document kinds
#[derive(Debug, Clone)]
pub struct OpenXmlPackage {
    kind: PackageKind,
    parts: Vec<Part>,
    relationships: Vec<PartRelationship>,
    external: Vec<ExternalRelationship>,
}

impl OpenXmlPackage {
    /// Detect the kind of a raw package and open it
    pub fn detect_and_open(raw: &RawPackage) -> Result<Self> {
        let kind = PackageKind::detect(raw).ok_or(OpcError::UnsupportedDocument)?;
        Self::open(raw, kind)
    }

    /// Unpack and open an in-memory package
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw = RawPackage::from_bytes(bytes)?;
        Self::detect_and_open(&raw)
    }

    /// Open a raw package as the given kind
    ///
    /// Every part reachable from the package relationships is loaded and,
    /// if it carries XML, parsed. Malformed markup or a relationship to a
    /// missing part fails the whole open.
    pub fn open(raw: &RawPackage, kind: PackageKind) -> Result<Self> {
        let mut loader = Loader {
            raw,
            parts: Vec::new(),
            by_uri: HashMap::new(),
            pending: VecDeque::new(),
        };

        let (relationships, external) = loader.load_relationships("/")?;
        while let Some(id) = loader.pending.pop_front() {
            let uri = loader.parts[id.0].uri.clone();
            let (rels, ext) = loader.load_relationships(&uri)?;
            let part = &mut loader.parts[id.0];
            part.relationships = rels;
            part.external = ext;
        }

        info!(
            kind = kind.type_name(),
            parts = loader.parts.len(),
            "opened package"
        );

        Ok(Self {
            kind,
            parts: loader.parts,
            relationships,
            external,
        })
    }

    /// Document kind
    pub fn kind(&self) -> PackageKind {
        self.kind
    }

    /// Package-level relationships to parts, in relationship order
    pub fn relationships(&self) -> &[PartRelationship] {
        &self.relationships
    }

    /// Package-level external relationships
    pub fn external_relationships(&self) -> &[ExternalRelationship] {
        &self.external
    }

    /// Resolve a part id
    ///
    /// Ids are only ever handed out by this package, so lookups of ids from
    /// the same package always succeed.
    pub fn part(&self, id: PartId) -> &Part {
        &self.parts[id.0]
    }

    /// All loaded parts, in load order
    pub fn parts(&self) -> impl Iterator<Item = (PartId, &Part)> {
        self.parts.iter().enumerate().map(|(i, p)| (PartId(i), p))
    }

    /// Find a part by URI
    pub fn part_by_uri(&self, uri: &str) -> Option<(PartId, &Part)> {
        self.parts()
            .find(|(_, p)| p.uri.eq_ignore_ascii_case(uri))
    }

    /// The main part (`MainDocumentPart`, `WorkbookPart`, `PresentationPart`)
    pub fn main_part(&self) -> Option<(PartId, &Part)> {
        self.part_by_uri(self.kind.main_part_uri())
    }
}

struct Loader<'a> {
    raw: &'a RawPackage,
    parts: Vec<Part>,
    by_uri: HashMap<String, PartId>,
    pending: VecDeque<PartId>,
}

impl Loader<'_> {
    fn load_relationships(
        &mut self,
        source_uri: &str,
    ) -> Result<(Vec<PartRelationship>, Vec<ExternalRelationship>)> {
        let rels_path = rels_path_for(source_uri);
        let Some(bytes) = self.raw.get(&rels_path) else {
            return Ok((Vec::new(), Vec::new()));
        };
        let rels = Relationships::parse(bytes)?;

        let mut internal = Vec::with_capacity(rels.len());
        let mut external = Vec::new();
        for rel in rels.iter() {
            if rel.external {
                external.push(ExternalRelationship {
                    id: rel.id.clone(),
                    rel_type: rel.rel_type.clone(),
                    target: rel.target.clone(),
                });
                continue;
            }

            let target = resolve_target(source_uri, &rel.target);
            let part = self.part_for(&target).ok_or_else(|| OpcError::MissingPart {
                id: rel.id.clone(),
                source_part: source_uri.to_string(),
                target: target.clone(),
            })??;
            internal.push(PartRelationship {
                id: rel.id.clone(),
                rel_type: rel.rel_type.clone(),
                part,
            });
        }

        Ok((internal, external))
    }

    /// Id of the part at `uri`, loading it on first sight; `None` if the
    /// archive has no such entry
    fn part_for(&mut self, uri: &str) -> Option<Result<PartId>> {
        let key = uri.to_ascii_lowercase();
        if let Some(id) = self.by_uri.get(&key) {
            return Some(Ok(*id));
        }

        let data = self.raw.get(uri)?.to_vec();
        let content_type = self
            .raw
            .content_type(uri)
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let root = if schema::is_xml_content_type(&content_type) {
            match xml::parse(&data, ParseOptions::default()) {
                Ok(root) => Some(Arc::new(root)),
                Err(e) => return Some(Err(e)),
            }
        } else {
            None
        };

        let id = PartId(self.parts.len());
        debug!(uri, content_type = %content_type, "loaded part");
        self.parts.push(Part {
            uri: uri.to_string(),
            type_name: schema::part_type_name(&content_type),
            content_type,
            relationships: Vec::new(),
            external: Vec::new(),
            root,
            data,
        });
        self.by_uri.insert(key, id);
        self.pending.push_back(id);
        Some(Ok(id))
    }
}
