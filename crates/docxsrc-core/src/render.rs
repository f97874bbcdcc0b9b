//! Dual rendering of tree nodes
//!
//! Every non-root node renders to generated source through a backend and
//! to canonical markup. Only element nodes carry markup; package and part
//! nodes render it as an empty string.

use tracing::debug;

use crate::backend::LanguageBackend;
use crate::canonical::canonicalize_element;
use crate::error::{Result, SessionError};
use crate::node::{NodeId, NodeKind};
use crate::tree::Tree;

/// Generated source code for a node
pub fn render_code(tree: &Tree, id: NodeId, backend: &LanguageBackend) -> Result<String> {
    let node = tree.node(id)?;
    let entity = node
        .entity()
        .ok_or_else(|| SessionError::precondition("the root node cannot be rendered"))?;
    let source = backend.generate(&entity);
    debug!(node = id.index(), language = backend.name(), bytes = source.len(), "rendered code");
    Ok(source)
}

/// Canonical markup for a node
pub fn render_markup(tree: &Tree, id: NodeId) -> Result<String> {
    match tree.node(id)?.kind() {
        NodeKind::Root => Err(SessionError::precondition(
            "the root node cannot be rendered",
        )),
        NodeKind::Element(element) => canonicalize_element(element),
        NodeKind::Package(_) | NodeKind::Part { .. } => Ok(String::new()),
    }
}
