//! # docxsrc-opc
//!
//! Open Packaging Conventions reader for docxsrc.
//!
//! This crate provides functionality to:
//! - Unpack DOCX/XLSX/PPTX containers and look up parts by URI
//! - Detect which kind of document a package holds
//! - Walk the relationship graph into a typed part model
//! - Parse part markup into a namespace-aware element tree
//!
//! ## Example: Listing Parts
//!
//! ```no_run
//! use docxsrc_opc::{OpenXmlPackage, RawPackage};
//!
//! let bytes = std::fs::read("report.docx")?;
//! let raw = RawPackage::from_bytes(&bytes)?;
//! let package = OpenXmlPackage::detect_and_open(&raw)?;
//!
//! for (_, part) in package.parts() {
//!     println!("{} ({})", part.uri(), part.type_name());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod archive;
pub mod content_types;
pub mod error;
pub mod package;
pub mod relationships;
pub mod schema;
pub mod test_utils;
pub mod xml;

pub use archive::{RawPackage, CONTENT_TYPES_PATH};
pub use error::{OpcError, Result};
pub use package::{
    ExternalRelationship, OpenXmlPackage, PackageKind, Part, PartId, PartRelationship,
};
pub use relationships::{Relationship, Relationships};
pub use schema::{ElementClass, PartClass, SdkNamespace};
pub use xml::{Attribute, Content, Element, ParseOptions, QName};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
