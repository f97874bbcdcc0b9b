//! Eager construction of the inspector tree
//!
//! Building a node builds its whole subtree. Children keep the order the
//! package exposes: package relationships, then per part its sub-part
//! relationships followed by the direct children of its root element.

use std::sync::Arc;

use tracing::debug;

use docxsrc_opc::{Element, OpenXmlPackage, PartId};

use crate::error::{Result, SessionError};
use crate::node::{element_header, part_header, Node, NodeId, NodeKind};

/// Arena of nodes; [`NodeId::ROOT`] is always present
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// A tree holding only the root
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Root,
                parent: None,
                index: 0,
                position: 0,
                header: "RootNode".to_string(),
                children: Vec::new(),
            }],
        }
    }

    /// Drop every node but the root
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[0].children.clear();
    }

    /// The root node
    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    /// Look up a node
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Look up a node, failing for ids from another tree generation
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.get(id)
            .ok_or_else(|| SessionError::precondition(format!("unknown node id {}", id.0)))
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check whether only the root is present
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Replace the root's children with a single package node
    ///
    /// Previous nodes are discarded; ids handed out before are invalid
    /// afterwards.
    pub fn set_package(&mut self, label: &str, package: Arc<OpenXmlPackage>) -> NodeId {
        self.clear();
        self.add_package(label, package)
    }

    /// Append a package node (and its subtree) under the root
    pub fn add_package(&mut self, label: &str, package: Arc<OpenXmlPackage>) -> NodeId {
        let index = self.nodes[0].children.len();
        let id = self.push(
            NodeKind::Package(package.clone()),
            NodeId::ROOT,
            index,
            index,
            label.to_string(),
        );
        self.nodes[0].children.push(id);

        let mut ancestors = Vec::new();
        for (i, rel) in package.relationships().iter().enumerate() {
            let child = self.build_part(&package, &rel.id, rel.part, id, i, i, &mut ancestors);
            self.nodes[id.0].children.push(child);
        }

        debug!(label, nodes = self.nodes.len(), "built package tree");
        id
    }

    /// Slash-separated child-position path of a node (`0/2/1`)
    pub fn path_of(&self, id: NodeId) -> Option<String> {
        let mut segments = Vec::new();
        let mut current = id;
        loop {
            let node = self.get(current)?;
            let Some(parent) = node.parent else { break };
            segments.push(node.position.to_string());
            current = parent;
        }
        segments.reverse();
        Some(segments.join("/"))
    }

    /// Resolve a slash-separated child-position path from the root
    pub fn resolve_path(&self, path: &str) -> Result<NodeId> {
        let mut current = NodeId::ROOT;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            let index: usize = segment
                .trim()
                .parse()
                .map_err(|_| SessionError::precondition(format!("invalid path segment '{}'", segment)))?;
            current = *self.nodes[current.0]
                .children
                .get(index)
                .ok_or_else(|| SessionError::precondition(format!("no node at path '{}'", path)))?;
        }
        Ok(current)
    }

    /// Depth-first walk below (not including) `id`, with depth
    pub fn descendants(&self, id: NodeId) -> Vec<(NodeId, usize)> {
        let mut out = Vec::new();
        let mut stack: Vec<(NodeId, usize)> = match self.get(id) {
            Some(node) => node.children.iter().rev().map(|c| (*c, 0)).collect(),
            None => return out,
        };
        while let Some((current, depth)) = stack.pop() {
            out.push((current, depth));
            let node = &self.nodes[current.0];
            stack.extend(node.children.iter().rev().map(|c| (*c, depth + 1)));
        }
        out
    }

    fn push(
        &mut self,
        kind: NodeKind,
        parent: NodeId,
        index: usize,
        position: usize,
        header: String,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            index,
            position,
            header,
            children: Vec::new(),
        });
        id
    }

    fn build_part(
        &mut self,
        package: &Arc<OpenXmlPackage>,
        relationship_id: &str,
        part_id: PartId,
        parent: NodeId,
        index: usize,
        position: usize,
        ancestors: &mut Vec<PartId>,
    ) -> NodeId {
        let part = package.part(part_id);
        let header = part_header(relationship_id, part);
        let id = self.push(
            NodeKind::Part {
                package: package.clone(),
                relationship_id: relationship_id.to_string(),
                part: part_id,
            },
            parent,
            index,
            position,
            header,
        );

        let mut children = Vec::new();
        if ancestors.contains(&part_id) {
            debug!(uri = part.uri(), "relationship cycle, sub-parts not expanded");
        } else {
            ancestors.push(part_id);
            for rel in part.relationships() {
                let i = children.len();
                children.push(self.build_part(package, &rel.id, rel.part, id, i, i, ancestors));
            }
            ancestors.pop();
        }

        if let Some(root) = part.root_element() {
            for (i, element) in root.child_elements().enumerate() {
                let position = children.len();
                children.push(self.build_element(element, id, i, position));
            }
        }

        self.nodes[id.0].children = children;
        id
    }

    fn build_element(
        &mut self,
        element: &Arc<Element>,
        parent: NodeId,
        index: usize,
        position: usize,
    ) -> NodeId {
        let header = element_header(element, index);
        let id = self.push(NodeKind::Element(element.clone()), parent, index, position, header);

        let children = element
            .child_elements()
            .enumerate()
            .map(|(i, child)| self.build_element(child, id, i, i))
            .collect();
        self.nodes[id.0].children = children;
        id
    }
}
