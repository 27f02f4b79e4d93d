//! Nested directory view
//!
//! Rebuilds the hierarchy from a flat record set. The view is derived on
//! every call and never written back to storage.

use crate::tree::node::{Node, NodeKind, Properties};
use crate::types::RecordId;
use serde::Serialize;
use std::collections::HashMap;

/// A node with its children replaced by nested child nodes.
///
/// Files carry no `children` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryNode {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub name: String,
    pub path: String,
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DirectoryNode>>,
    pub properties: Option<Properties>,
}

impl DirectoryNode {
    /// Build the nested view rooted at `root` from the flat record set.
    ///
    /// Children are found through a parent-path index built from `nodes`;
    /// only folders are descended into. Records unreachable from `root`
    /// are left out.
    pub fn build(root: Node, nodes: Vec<Node>) -> Self {
        let mut index: HashMap<String, Vec<Node>> = HashMap::new();
        for node in nodes {
            if let Some(parent) = node.parent.clone() {
                index.entry(parent).or_default().push(node);
            }
        }
        Self::attach(root, &mut index)
    }

    fn attach(node: Node, index: &mut HashMap<String, Vec<Node>>) -> Self {
        let children = match node.kind {
            NodeKind::Folder => {
                // Removing the entry means each folder is expanded at most once.
                let direct = index.remove(&node.path).unwrap_or_default();
                Some(
                    direct
                        .into_iter()
                        .map(|child| Self::attach(child, index))
                        .collect(),
                )
            }
            NodeKind::File => None,
        };
        Self {
            id: node.id,
            kind: node.kind,
            name: node.name,
            path: node.path,
            parent: node.parent,
            children,
            properties: node.properties,
        }
    }

    pub fn children(&self) -> &[DirectoryNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Depth-first lookup by path
    pub fn find(&self, path: &str) -> Option<&DirectoryNode> {
        if self.path == path {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(path))
    }

    /// Number of nodes in this subtree, including itself
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(DirectoryNode::count).sum::<usize>()
    }
}
