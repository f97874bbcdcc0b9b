//! Inspector nodes and header formatting
//!
//! A [`Node`] wraps one of four things: the invisible root, an opened
//! package, a part reached through a relationship, or a markup element.
//! Headers are computed once, when the node is created, from the wrapped
//! entity and its position among its siblings.

use std::sync::Arc;

use docxsrc_opc::{Element, OpenXmlPackage, Part, PartId};

/// Index of a node in its [`Tree`](crate::tree::Tree)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node of every tree
    pub const ROOT: NodeId = NodeId(0);

    /// Position in the tree's node arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node wraps
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Holds the opened packages; renders nothing
    Root,
    /// An opened package
    Package(Arc<OpenXmlPackage>),
    /// A part reached through `relationship_id`
    Part {
        /// Package owning the part
        package: Arc<OpenXmlPackage>,
        /// Relationship the part was reached through
        relationship_id: String,
        /// The part itself
        part: PartId,
    },
    /// A markup element
    Element(Arc<Element>),
}

/// Borrowed view of the entity behind a node, handed to code generators
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    /// A whole package
    Package(&'a OpenXmlPackage),
    /// A part and the relationship it was reached through
    Part {
        /// Package owning the part
        package: &'a OpenXmlPackage,
        /// Relationship ID
        relationship_id: &'a str,
        /// Part id within `package`
        part: PartId,
    },
    /// A markup element
    Element(&'a Element),
}

/// One node of the inspector tree
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) index: usize,
    pub(crate) position: usize,
    pub(crate) header: String,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    /// Wrapped entity
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Parent node; `None` only for the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Zero-based position among siblings of the same kind (parts or elements)
    pub fn index(&self) -> usize {
        self.index
    }

    /// Zero-based position in the parent's child list
    pub fn position(&self) -> usize {
        self.position
    }

    /// Display header
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Children in document order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Check whether this is the root node
    pub fn is_root(&self) -> bool {
        matches!(self.kind, NodeKind::Root)
    }

    /// Borrowed entity for code generation; `None` for the root
    pub fn entity(&self) -> Option<Entity<'_>> {
        match &self.kind {
            NodeKind::Root => None,
            NodeKind::Package(package) => Some(Entity::Package(package)),
            NodeKind::Part {
                package,
                relationship_id,
                part,
            } => Some(Entity::Part {
                package,
                relationship_id,
                part: *part,
            }),
            NodeKind::Element(element) => Some(Entity::Element(element)),
        }
    }

    /// The wrapped element, for element nodes
    pub fn element(&self) -> Option<&Arc<Element>> {
        match &self.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }
}

/// Header of a part node: `[rId1] /word/document.xml (MainDocumentPart)`
pub fn part_header(relationship_id: &str, part: &Part) -> String {
    format!("[{}] {} ({})", relationship_id, part.uri(), part.type_name())
}

/// Header of an element node: `<0> p (Paragraph)`, plus the suffix of the
/// first matching [`SUFFIX_RULES`] entry
pub fn element_header(element: &Element, index: usize) -> String {
    let mut header = format!(
        "<{}> {} ({})",
        index,
        element.local_name(),
        element.type_name()
    );
    if let Some(suffix) = header_suffix(element) {
        header.push_str(&suffix);
    }
    header
}

/// Adds a type-specific suffix to element headers
#[derive(Debug, Clone, Copy)]
pub struct SuffixRule {
    /// Element type the rule applies to
    pub type_name: &'static str,
    /// Namespace the type lives in
    pub namespace: &'static str,
    /// Produces the bracketed value, if the element has one
    pub value: fn(&Element) -> Option<&str>,
}

/// Suffix rules, checked in order
pub static SUFFIX_RULES: &[SuffixRule] = &[
    SuffixRule {
        type_name: "Row",
        namespace: docxsrc_opc::schema::NS_SPREADSHEET,
        value: reference_attribute,
    },
    SuffixRule {
        type_name: "Cell",
        namespace: docxsrc_opc::schema::NS_SPREADSHEET,
        value: reference_attribute,
    },
];

fn reference_attribute(element: &Element) -> Option<&str> {
    element.attribute("r")
}

fn header_suffix(element: &Element) -> Option<String> {
    let namespace = element.namespace_uri()?;
    let type_name = element.type_name();
    SUFFIX_RULES
        .iter()
        .find(|rule| rule.type_name == type_name && rule.namespace == namespace)
        .and_then(|rule| (rule.value)(element))
        .map(|value| format!(" [{}]", value))
}
