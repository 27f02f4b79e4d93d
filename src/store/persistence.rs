//! Sled-backed node record store
//!
//! Records live in a dedicated sled tree keyed by path, encoded as JSON.
//! Insert and child-list edits go through compare-and-swap so concurrent
//! writers never overwrite each other.

use super::{apply_updates, require_folder, FieldUpdate, NodeFilter, NodeRecordStore};
use crate::error::StorageError;
use crate::tree::node::Node;
use crate::types::RecordId;
use std::path::Path;
use tracing::debug;

const NODES_TREE: &str = "nodes";

pub struct SledNodeRecordStore {
    db: sled::Db,
    nodes: sled::Tree,
}

impl SledNodeRecordStore {
    /// Open (or create) a store at the given directory
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(path)?;
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    pub fn from_db(db: sled::Db) -> Result<Self, StorageError> {
        let nodes = db.open_tree(NODES_TREE)?;
        Ok(Self { db, nodes })
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }

    fn decode(path: &str, bytes: &[u8]) -> Result<Node, StorageError> {
        serde_json::from_slice(bytes).map_err(|e| StorageError::Corrupt {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    /// Read-modify-write loop on a single record, retried on concurrent change.
    fn modify<F>(&self, path: &str, f: F) -> Result<(), StorageError>
    where
        F: Fn(&mut Node) -> Result<bool, StorageError>,
    {
        loop {
            let current = self
                .nodes
                .get(path.as_bytes())?
                .ok_or_else(|| StorageError::NoMatch(path.to_string()))?;
            let mut node = Self::decode(path, &current)?;
            if !f(&mut node)? {
                return Ok(());
            }
            let encoded = serde_json::to_vec(&node)?;
            match self
                .nodes
                .compare_and_swap(path.as_bytes(), Some(current), Some(encoded))?
            {
                Ok(()) => return Ok(()),
                Err(_) => debug!(path, "Record changed during update, retrying"),
            }
        }
    }
}

impl NodeRecordStore for SledNodeRecordStore {
    fn find_one(&self, path: &str) -> Result<Option<Node>, StorageError> {
        match self.nodes.get(path.as_bytes())? {
            Some(bytes) => Ok(Some(Self::decode(path, &bytes)?)),
            None => Ok(None),
        }
    }

    fn find_all(&self, filter: &NodeFilter) -> Result<Vec<Node>, StorageError> {
        let mut matched = Vec::new();
        for entry in self.nodes.iter() {
            let (key, value) = entry?;
            let path = String::from_utf8_lossy(&key);
            let node = Self::decode(&path, &value)?;
            if filter.matches(&node) {
                matched.push(node);
            }
        }
        Ok(matched)
    }

    fn insert(&self, node: &Node) -> Result<RecordId, StorageError> {
        let id = self.db.generate_id()?;
        let mut record = node.clone();
        record.id = Some(id);
        let encoded = serde_json::to_vec(&record)?;
        match self
            .nodes
            .compare_and_swap(node.path.as_bytes(), None as Option<&[u8]>, Some(encoded))?
        {
            Ok(()) => {
                debug!(path = %node.path, id, "Inserted record");
                Ok(id)
            }
            Err(_) => Err(StorageError::Duplicate(node.path.clone())),
        }
    }

    fn update_fields(&self, path: &str, updates: &[FieldUpdate]) -> Result<(), StorageError> {
        self.modify(path, |node| {
            apply_updates(node, updates)?;
            Ok(true)
        })
    }

    fn push_child(&self, path: &str, child: &str) -> Result<(), StorageError> {
        self.modify(path, |node| {
            require_folder(node)?;
            Ok(node.add_child(child))
        })
    }

    fn pull_child(&self, path: &str, child: &str) -> Result<(), StorageError> {
        self.modify(path, |node| {
            require_folder(node)?;
            Ok(node.remove_child(child))
        })
    }

    fn delete_one(&self, path: &str) -> Result<bool, StorageError> {
        Ok(self.nodes.remove(path.as_bytes())?.is_some())
    }
}
