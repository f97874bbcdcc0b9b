//! Session settings
//!
//! Settings are read from `docxsrc.toml`:
//!
//! ```toml
//! [view]
//! auto_render = true
//! highlight = true
//! language = "C#"
//!
//! [codegen]
//! use_aliases = false
//! alias_order = "none"   # none | ascending | descending
//! ```
//!
//! Every field is optional.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codegen::{AliasOrder, NamespaceAliasOptions};
use crate::error::Result;

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Initial session flags and language
    pub view: ViewSettings,
    /// Code generation options
    pub codegen: CodegenSettings,
}

impl Settings {
    /// Conventional file name looked up in the working directory
    pub const FILE_NAME: &'static str = "docxsrc.toml";

    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Read and parse a settings file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Namespace alias options for the code generators
    pub fn alias_options(&self) -> NamespaceAliasOptions {
        NamespaceAliasOptions {
            use_aliases: self.codegen.use_aliases,
            order: self.codegen.alias_order,
        }
    }
}

/// View flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    /// Re-render when the selection changes
    pub auto_render: bool,
    /// Attach highlighting definitions to rendered views
    pub highlight: bool,
    /// Display name of the initially selected backend
    pub language: String,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            auto_render: true,
            highlight: true,
            language: "C#".to_string(),
        }
    }
}

/// Code generation settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenSettings {
    /// Import schema namespaces under short aliases
    pub use_aliases: bool,
    /// Import directive order
    pub alias_order: AliasOrder,
}
