//! docxsrc-core - inspect Open XML packages as code and markup
//!
//! Builds a navigable tree over an opened package (package, parts,
//! elements) and renders any node two ways: as source code that
//! reconstructs it with the Open XML SDK, and as canonical indented markup.
//!
//! # Example
//!
//! ```
//! use docxsrc_core::Session;
//! use docxsrc_opc::test_utils::PackageBuilder;
//!
//! let bytes = PackageBuilder::word().build()?;
//! let mut session = Session::new();
//! session.open_bytes("report.docx", bytes)?;
//!
//! let body = session.tree().resolve_path("0/0/1")?;
//! session.select(Some(body))?;
//! assert!(session.code_view().text().contains("GenerateBody"));
//! assert!(session.markup_view().text().starts_with("<w:body"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backend;
pub mod canonical;
pub mod codegen;
pub mod config;
pub mod error;
pub mod highlight;
pub mod node;
pub mod render;
pub mod session;
pub mod tree;

// Re-export main types and functions
pub use backend::{BackendRegistry, LanguageBackend};
pub use canonical::{canonicalize, canonicalize_element};
pub use codegen::{AliasOrder, CodeGenerator, CodeProvider, NamespaceAliasOptions};
pub use config::Settings;
pub use error::{Result, SessionError};
pub use highlight::{HighlightDefinition, HighlightRegistry, Token, TokenKind};
pub use node::{Entity, Node, NodeId, NodeKind};
pub use render::{render_code, render_markup};
pub use session::{FileDialog, Session, SessionState, TextView};
pub use tree::Tree;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, "0.1.0");
    }
}
