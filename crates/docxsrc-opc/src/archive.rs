//! Raw package view over a ZIP container
//!
//! Office Open XML files are ZIP archives whose entries are the package
//! parts. [`RawPackage`] unpacks every entry into memory and answers
//! part-existence and content-type questions by part URI, without knowing
//! anything about the document kind.

use std::collections::HashMap;
use std::io::{Read, Seek};

use tracing::debug;
use zip::read::ZipArchive;

use crate::content_types::ContentTypes;
use crate::error::Result;

/// Archive entry holding the content type declarations
pub const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";

/// An unpacked OPC package
#[derive(Debug)]
pub struct RawPackage {
    /// Entry names in archive order
    order: Vec<String>,
    /// Entry contents, keyed by entry name (no leading slash)
    files: HashMap<String, Vec<u8>>,
    /// Lowercased entry name to entry name, for case-insensitive lookups
    folded: HashMap<String, String>,
    /// Parsed `[Content_Types].xml` (empty when absent)
    content_types: ContentTypes,
}

impl RawPackage {
    /// Unpack a package from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut order = Vec::with_capacity(archive.len());
        let mut files = HashMap::with_capacity(archive.len());
        let mut folded = HashMap::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            // Skip directories
            if name.ends_with('/') {
                continue;
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            folded.insert(name.to_ascii_lowercase(), name.clone());
            order.push(name.clone());
            files.insert(name, contents);
        }

        let content_types = match files.get(CONTENT_TYPES_PATH) {
            Some(bytes) => ContentTypes::parse(bytes)?,
            None => ContentTypes::default(),
        };

        debug!(entries = order.len(), "unpacked raw package");

        Ok(Self {
            order,
            files,
            folded,
            content_types,
        })
    }

    /// Unpack a package from an in-memory buffer
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(std::io::Cursor::new(bytes))
    }

    /// Check whether a part exists, by URI (`/word/document.xml`)
    ///
    /// Part names are compared case-insensitively, as OPC requires.
    pub fn part_exists(&self, uri: &str) -> bool {
        self.entry_name(uri).is_some()
    }

    /// Get a part's bytes by URI
    pub fn get(&self, uri: &str) -> Option<&[u8]> {
        self.entry_name(uri)
            .and_then(|name| self.files.get(name))
            .map(|v| v.as_slice())
    }

    /// Content type of a part, from overrides first and extension defaults second
    pub fn content_type(&self, uri: &str) -> Option<&str> {
        self.content_types.lookup(uri)
    }

    /// Entry names in archive order
    pub fn file_list(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    /// Number of entries (directories excluded)
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the archive has no entries
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn entry_name(&self, uri: &str) -> Option<&str> {
        let name = uri.trim_start_matches('/');
        if let Some((key, _)) = self.files.get_key_value(name) {
            return Some(key.as_str());
        }
        self.folded
            .get(&name.to_ascii_lowercase())
            .map(|s| s.as_str())
    }
}
