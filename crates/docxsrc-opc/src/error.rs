//! Error types for package reading

use thiserror::Error;

/// Errors that can occur while reading an OPC package
#[derive(Error, Debug)]
pub enum OpcError {
    /// Error reading the ZIP container
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading bytes
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed attribute in XML content
    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// A relationship points at a part that is not in the archive
    #[error("Relationship {id} in {source_part} targets missing part {target}")]
    MissingPart {
        /// Relationship id
        id: String,
        /// Part (or package root) holding the relationship
        source_part: String,
        /// Resolved target URI
        target: String,
    },

    /// None of the known main parts were found
    #[error("Not a known/valid Open XML document")]
    UnsupportedDocument,

    /// Invalid package or markup structure
    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
}

/// Result type for package operations
pub type Result<T> = std::result::Result<T, OpcError>;
