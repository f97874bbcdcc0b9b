//! Language backends and their registry
//!
//! A [`LanguageBackend`] pairs a [`CodeGenerator`] with its display name,
//! output extension, alias options and highlighting definition. The
//! [`BackendRegistry`] keeps backends in registration order; the first one
//! is the default selection.

use std::fmt;

use tracing::debug;

use crate::codegen::{CSharpProvider, CodeGenerator, NamespaceAliasOptions, VbProvider};
use crate::error::{Result, SessionError};
use crate::highlight::{HighlightDefinition, HighlightRegistry};
use crate::node::Entity;

/// A code-generation target language
pub struct LanguageBackend {
    name: String,
    extension: String,
    options: NamespaceAliasOptions,
    generator: Box<dyn CodeGenerator>,
    highlighting: Option<&'static HighlightDefinition>,
}

impl fmt::Debug for LanguageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageBackend")
            .field("name", &self.name)
            .field("extension", &self.extension)
            .field("options", &self.options)
            .field("highlighting", &self.highlighting.map(|h| h.name()))
            .finish()
    }
}

impl fmt::Display for LanguageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl LanguageBackend {
    /// Create a backend; its highlighting is looked up by extension
    pub fn new(
        name: impl Into<String>,
        extension: impl Into<String>,
        generator: Box<dyn CodeGenerator>,
    ) -> Self {
        let extension = extension.into();
        let highlighting = HighlightRegistry::global().by_extension(&extension);
        Self {
            name: name.into(),
            extension,
            options: NamespaceAliasOptions::default(),
            generator,
            highlighting,
        }
    }

    /// C# backend
    pub fn csharp() -> Self {
        Self::new(
            CSharpProvider::NAME,
            CSharpProvider::EXTENSION,
            Box::new(CSharpProvider),
        )
    }

    /// Visual Basic .NET backend
    pub fn visual_basic() -> Self {
        Self::new(VbProvider::NAME, VbProvider::EXTENSION, Box::new(VbProvider))
    }

    /// Set namespace alias options
    pub fn with_options(mut self, options: NamespaceAliasOptions) -> Self {
        self.options = options;
        self
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Output file extension, without dot
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Namespace alias options
    pub fn options(&self) -> &NamespaceAliasOptions {
        &self.options
    }

    /// Highlighting for generated code, if the registry knows the extension
    pub fn highlighting(&self) -> Option<&'static HighlightDefinition> {
        self.highlighting
    }

    /// Generate source for an entity
    pub fn generate(&self, entity: &Entity<'_>) -> String {
        self.generator.generate(entity, &self.options)
    }
}

/// Ordered, extensible set of backends
#[derive(Debug)]
pub struct BackendRegistry {
    backends: Vec<LanguageBackend>,
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl BackendRegistry {
    /// Registry holding C# then Visual Basic .NET
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(LanguageBackend::csharp());
        registry.register(LanguageBackend::visual_basic());
        registry
    }

    /// Registry with no backends
    pub fn empty() -> Self {
        Self {
            backends: Vec::new(),
        }
    }

    /// Append a backend
    pub fn register(&mut self, backend: LanguageBackend) {
        debug!(name = backend.name(), "registered language backend");
        self.backends.push(backend);
    }

    /// Apply alias options to every registered backend
    pub fn set_options(&mut self, options: NamespaceAliasOptions) {
        for backend in &mut self.backends {
            backend.options = options;
        }
    }

    /// Position of the backend with this display name
    pub fn position(&self, name: &str) -> Result<usize> {
        self.backends
            .iter()
            .position(|b| b.name == name)
            .ok_or_else(|| SessionError::precondition(format!("unknown language '{}'", name)))
    }

    /// Backend by display name
    pub fn get(&self, name: &str) -> Result<&LanguageBackend> {
        self.position(name).map(|i| &self.backends[i])
    }

    /// Backend by output extension (leading dot optional)
    pub fn get_by_extension(&self, extension: &str) -> Option<&LanguageBackend> {
        let extension = extension.trim_start_matches('.');
        self.backends
            .iter()
            .find(|b| b.extension.eq_ignore_ascii_case(extension))
    }

    /// Backend at a registry position
    pub fn at(&self, index: usize) -> Option<&LanguageBackend> {
        self.backends.get(index)
    }

    /// Display names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Number of backends
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Check if no backend is registered
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}
