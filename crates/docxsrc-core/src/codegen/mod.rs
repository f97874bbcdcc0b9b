//! Source code generation
//!
//! A [`CodeGenerator`] turns an [`Entity`] into source text. The built-in
//! generators go through a language-neutral [`CodeUnit`](dom::CodeUnit)
//! built by [`builder::build_unit`] and printed by a [`CodeProvider`]; any
//! type implementing [`CodeProvider`] is a generator.

pub mod builder;
pub mod csharp;
pub mod dom;
pub mod vb;

use serde::{Deserialize, Serialize};

use crate::node::Entity;
use dom::CodeUnit;

pub use csharp::CSharpProvider;
pub use vb::VbProvider;

/// Ordering of import directives in generated code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AliasOrder {
    /// Order of first use
    #[default]
    None,
    /// Sorted by namespace, ascending
    Ascending,
    /// Sorted by namespace, descending
    Descending,
}

/// How generated code imports SDK namespaces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NamespaceAliasOptions {
    /// Import schema namespaces under short aliases (`W`, `X`, `P`, `A`)
    /// and qualify type names with them
    pub use_aliases: bool,
    /// Import directive order
    pub order: AliasOrder,
}

/// Produces source text for an entity
pub trait CodeGenerator: Send + Sync {
    /// Generate source code reconstructing `entity`
    fn generate(&self, entity: &Entity<'_>, options: &NamespaceAliasOptions) -> String;
}

/// Prints a code unit in one language
pub trait CodeProvider: Send + Sync {
    /// Print `unit` as a complete source file
    fn print(&self, unit: &CodeUnit) -> String;
}

impl<T: CodeProvider> CodeGenerator for T {
    fn generate(&self, entity: &Entity<'_>, options: &NamespaceAliasOptions) -> String {
        self.print(&builder::build_unit(entity, options))
    }
}

/// Line-oriented output with indentation
pub(crate) struct SourceWriter {
    out: String,
    level: usize,
    indent: &'static str,
}

impl SourceWriter {
    pub(crate) fn new(indent: &'static str) -> Self {
        Self {
            out: String::new(),
            level: 0,
            indent,
        }
    }

    pub(crate) fn line(&mut self, text: &str) {
        if !text.is_empty() {
            for _ in 0..self.level {
                self.out.push_str(self.indent);
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    pub(crate) fn blank(&mut self) {
        self.out.push('\n');
    }

    pub(crate) fn indent(&mut self) {
        self.level += 1;
    }

    pub(crate) fn dedent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }
}

/// Drop leading and doubled [`Statement::Blank`](dom::Statement::Blank)s
pub(crate) fn tidy_blanks(body: &[dom::Statement]) -> Vec<&dom::Statement> {
    let mut out: Vec<&dom::Statement> = Vec::with_capacity(body.len());
    for statement in body {
        let is_blank = matches!(statement, dom::Statement::Blank);
        let previous_blank = out
            .last()
            .map_or(true, |s| matches!(s, dom::Statement::Blank));
        if is_blank && previous_blank {
            continue;
        }
        out.push(statement);
    }
    while matches!(out.last(), Some(dom::Statement::Blank)) {
        out.pop();
    }
    out
}
