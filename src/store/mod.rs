//! NodeRecord Store
//!
//! Flat keyed storage for tree nodes. The store knows nothing about the
//! hierarchy: it offers per-document operations keyed by path, plus atomic
//! push/pull on a folder's child list.

pub mod memory;
pub mod persistence;

use crate::error::StorageError;
use crate::tree::node::Node;
use crate::types::RecordId;

pub use crate::tree::node::{FieldUpdate, PropertyKey};
pub use memory::MemoryNodeRecordStore;
pub use persistence::SledNodeRecordStore;

/// Selection for `find_all`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeFilter {
    All,
    /// Records whose `parent` equals the given path
    Parent(String),
    /// Records whose `properties.id` equals the given phrase id
    PhraseId(String),
}

impl NodeFilter {
    pub fn matches(&self, node: &Node) -> bool {
        match self {
            NodeFilter::All => true,
            NodeFilter::Parent(parent) => node.parent.as_deref() == Some(parent.as_str()),
            NodeFilter::PhraseId(id) => node
                .properties
                .as_ref()
                .and_then(|props| props.phrase_id())
                .is_some_and(|candidate| candidate == id),
        }
    }
}

/// NodeRecord Store interface
pub trait NodeRecordStore: Send + Sync {
    fn find_one(&self, path: &str) -> Result<Option<Node>, StorageError>;

    fn find_all(&self, filter: &NodeFilter) -> Result<Vec<Node>, StorageError>;

    /// Insert if no record exists at `node.path`; returns the fresh identity.
    ///
    /// Fails with `StorageError::Duplicate` when the path is taken.
    fn insert(&self, node: &Node) -> Result<RecordId, StorageError>;

    /// Fails with `StorageError::NoMatch` when no record exists at `path`.
    fn update_fields(&self, path: &str, updates: &[FieldUpdate]) -> Result<(), StorageError>;

    /// Atomically append `child` to the folder's children unless present.
    fn push_child(&self, path: &str, child: &str) -> Result<(), StorageError>;

    /// Atomically remove `child` from the folder's children.
    fn pull_child(&self, path: &str, child: &str) -> Result<(), StorageError>;

    /// Returns whether a record was removed.
    fn delete_one(&self, path: &str) -> Result<bool, StorageError>;
}

/// Apply property updates to a record, failing on fields outside its schema.
pub(crate) fn apply_updates(node: &mut Node, updates: &[FieldUpdate]) -> Result<(), StorageError> {
    let path = node.path.clone();
    let properties = node
        .properties
        .as_mut()
        .ok_or_else(|| StorageError::FieldMismatch {
            path: path.clone(),
            field: "properties",
        })?;
    for update in updates {
        if !properties.apply(update) {
            return Err(StorageError::FieldMismatch {
                path,
                field: update.key.as_str(),
            });
        }
    }
    Ok(())
}

/// Folder-only guard for push/pull
pub(crate) fn require_folder(node: &Node) -> Result<(), StorageError> {
    if node.children.is_none() {
        return Err(StorageError::NotAFolder(node.path.clone()));
    }
    Ok(())
}
