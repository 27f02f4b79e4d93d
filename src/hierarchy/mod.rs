//! Hierarchy Manager
//!
//! Tree-level operations over a flat node record store: create with
//! ancestor synthesis, get, phrase lookup, property save, cascading delete,
//! rename, copy, and directory materialization.
//!
//! Every public operation returns a [`ResponseEnvelope`]. Expected
//! conditions (bad path, missing node, conflict) are reported through the
//! envelope; only store defects surface as `Err`.

mod consistency;
mod transfer;

pub use consistency::{ConsistencyReport, Inconsistency};

use crate::concurrency::{PathGuard, PathLockManager};
use crate::envelope::{ResponseEnvelope, Status};
use crate::error::{StorageError, TreeError};
use crate::store::{FieldUpdate, NodeFilter, NodeRecordStore, PropertyKey};
use crate::tree::path;
use crate::tree::{DirectoryNode, Node};
use crate::types::Mode;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A node together with its direct child records
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeListing {
    pub node: Node,
    pub children: Vec<Node>,
}

pub struct HierarchyManager {
    store: Arc<dyn NodeRecordStore>,
    mode: Mode,
    locks: PathLockManager,
}

/// Fold an operation result into an envelope, letting store defects escape.
fn respond<T>(
    status: Status,
    result: Result<T, TreeError>,
) -> Result<ResponseEnvelope<T>, StorageError> {
    match result {
        Ok(data) => Ok(ResponseEnvelope::success(status, data)),
        Err(err) => reject(err),
    }
}

fn reject<T>(err: TreeError) -> Result<ResponseEnvelope<T>, StorageError> {
    match err {
        TreeError::Storage(storage) => Err(storage),
        other => {
            let status = other.status().unwrap_or(Status::BadRequest);
            debug!(status = status.code(), error = %other, "Operation rejected");
            Ok(ResponseEnvelope::failure(status, other.to_string()))
        }
    }
}

/// Text stored for a property value received as JSON
fn field_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

impl HierarchyManager {
    /// Create a manager over `store`, creating the root folder if missing.
    pub fn new(store: Arc<dyn NodeRecordStore>, mode: Mode) -> Result<Self, StorageError> {
        let manager = Self {
            store,
            mode,
            locks: PathLockManager::new(),
        };
        manager.ensure_root()?;
        Ok(manager)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn store(&self) -> &Arc<dyn NodeRecordStore> {
        &self.store
    }

    /// Fetch the root folder, inserting it if the store has none.
    pub fn ensure_root(&self) -> Result<Node, StorageError> {
        if let Some(root) = self.store.find_one(path::ROOT)? {
            return Ok(root);
        }
        match self.store.insert(&Node::root()) {
            Ok(id) => info!(id, "Created root folder"),
            Err(StorageError::Duplicate(_)) => {}
            Err(e) => return Err(e),
        }
        self.store
            .find_one(path::ROOT)?
            .ok_or_else(|| StorageError::NoMatch(path::ROOT.to_string()))
    }

    /// Create a file or folder, synthesizing any missing ancestor folders.
    ///
    /// 201 with the normalized path, 400 on a malformed path, 409 when the
    /// path already exists.
    pub fn create(&self, path: &str) -> Result<ResponseEnvelope<String>, StorageError> {
        respond(Status::Created, self.create_node(path))
    }

    fn create_node(&self, raw: &str) -> Result<String, TreeError> {
        path::validate(raw, self.mode)?;
        let target = path::normalize(raw, self.mode);
        let _guard = self.lock_targets(&[target.as_str()]);

        if self.store.find_one(&target)?.is_some() {
            return Err(TreeError::Conflict(target));
        }
        self.synthesize_ancestors(&target)?;
        let node = if self.mode.is_valid_leaf(&target) {
            Node::file(&target, self.mode)
        } else {
            Node::folder(&target)
        };
        self.insert_linked(&node, false)?;
        info!(path = %target, mode = %self.mode, "Created node");
        Ok(target)
    }

    /// Write-lock `targets` and read-lock every folder above them.
    ///
    /// A folder delete needs the write lock on that folder, so it waits for
    /// any mutation beneath it and blocks new ones until it is done.
    pub(crate) fn lock_targets(&self, targets: &[&str]) -> PathGuard<'_> {
        let ancestors: Vec<String> = targets
            .iter()
            .flat_map(|target| {
                let mut chain = path::ancestor_chain(target, self.mode);
                chain.pop();
                chain
            })
            .collect();
        let shared: Vec<&str> = ancestors.iter().map(String::as_str).collect();
        self.locks.lock_paths(&shared, targets)
    }

    /// Create every missing folder above `target`.
    pub(crate) fn synthesize_ancestors(&self, target: &str) -> Result<(), TreeError> {
        let chain = path::ancestor_chain(target, self.mode);
        let ancestors = chain.split_last().map(|(_, rest)| rest).unwrap_or(&[]);
        for prefix in ancestors {
            if self.store.find_one(prefix)?.is_none() {
                self.insert_linked(&Node::folder(prefix), true)?;
                debug!(path = %prefix, "Synthesized ancestor folder");
            }
        }
        Ok(())
    }

    /// Insert a record and link it into its parent's children.
    ///
    /// With `idempotent`, an existing record at the path counts as success;
    /// otherwise it is a conflict. A record inserted here is removed again
    /// when linking fails.
    pub(crate) fn insert_linked(&self, node: &Node, idempotent: bool) -> Result<(), TreeError> {
        let inserted = match self.store.insert(node) {
            Ok(id) => {
                debug!(path = %node.path, id, "Inserted node");
                true
            }
            Err(StorageError::Duplicate(existing)) if idempotent => {
                debug!(path = %existing, "Node already present");
                false
            }
            Err(StorageError::Duplicate(existing)) => return Err(TreeError::Conflict(existing)),
            Err(e) => return Err(e.into()),
        };
        let Some(parent) = &node.parent else {
            return Ok(());
        };
        match self.store.push_child(parent, &node.path) {
            Ok(()) => Ok(()),
            Err(e) => {
                if inserted {
                    match self.store.delete_one(&node.path) {
                        Ok(_) => debug!(path = %node.path, "Rolled back unlinked insert"),
                        Err(rollback) => {
                            warn!(path = %node.path, error = %rollback, "Rollback of unlinked insert failed")
                        }
                    }
                }
                Err(e.into())
            }
        }
    }

    /// Fetch a node and, for folders, its direct children.
    pub fn get(&self, path: &str) -> Result<ResponseEnvelope<NodeListing>, StorageError> {
        respond(Status::Ok, self.get_node(path))
    }

    fn get_node(&self, raw: &str) -> Result<NodeListing, TreeError> {
        path::validate(raw, self.mode)?;
        let target = path::normalize(raw, self.mode);
        let node = self
            .store
            .find_one(&target)?
            .ok_or_else(|| TreeError::NotFound(target.clone()))?;

        let mut children = Vec::with_capacity(node.children().len());
        for child in node.children() {
            match self.store.find_one(child)? {
                Some(record) => children.push(record),
                None => warn!(folder = %target, child = %child, "Listed child has no record"),
            }
        }
        Ok(NodeListing { node, children })
    }

    /// Every phrase whose `properties.id` equals `id`. Phrase mode only.
    pub fn get_phrase_by_id(&self, id: &str) -> Result<ResponseEnvelope<Vec<Node>>, StorageError> {
        let result = if self.mode != Mode::Phrase {
            Err(TreeError::ModeMismatch(Mode::Phrase))
        } else {
            self.store
                .find_all(&NodeFilter::PhraseId(id.to_string()))
                .map_err(TreeError::from)
                .and_then(|matches| {
                    if matches.is_empty() {
                        Err(TreeError::PhraseNotFound(id.to_string()))
                    } else {
                        Ok(matches)
                    }
                })
        };
        respond(Status::Ok, result)
    }

    /// Apply the recognized property keys of `updates` and return the refreshed node.
    ///
    /// Keys match case-insensitively; unknown keys are ignored. Folders carry
    /// no properties and are returned unchanged.
    pub fn save(
        &self,
        path: &str,
        updates: &Map<String, Value>,
    ) -> Result<ResponseEnvelope<Node>, StorageError> {
        respond(Status::Ok, self.save_node(path, updates))
    }

    fn save_node(&self, raw: &str, updates: &Map<String, Value>) -> Result<Node, TreeError> {
        path::validate(raw, self.mode)?;
        let target = path::normalize(raw, self.mode);
        let _guard = self.lock_targets(&[target.as_str()]);

        let node = self
            .store
            .find_one(&target)?
            .ok_or_else(|| TreeError::NotFound(target.clone()))?;
        if node.is_folder() {
            debug!(path = %target, "Folders carry no properties; nothing to save");
            return Ok(node);
        }

        let fields: Vec<FieldUpdate> = updates
            .iter()
            .filter_map(|(key, value)| {
                PropertyKey::parse(key, self.mode).map(|key| FieldUpdate {
                    key,
                    value: field_value(value),
                })
            })
            .collect();
        if !fields.is_empty() {
            self.store.update_fields(&target, &fields)?;
            info!(path = %target, fields = fields.len(), "Saved properties");
        }

        Ok(self
            .store
            .find_one(&target)?
            .ok_or(StorageError::NoMatch(target))?)
    }

    /// Delete a node; folders take their whole subtree with them.
    ///
    /// 204 on success, 409 for root, 404 when absent.
    pub fn delete(&self, path: &str) -> Result<ResponseEnvelope<()>, StorageError> {
        match self.delete_node(path) {
            Ok(()) => Ok(ResponseEnvelope::empty(Status::NoContent)),
            Err(err) => reject(err),
        }
    }

    fn delete_node(&self, raw: &str) -> Result<(), TreeError> {
        path::validate(raw, self.mode)?;
        let target = path::normalize(raw, self.mode);
        if target == path::ROOT {
            return Err(TreeError::RootDeletion);
        }
        let _guard = self.lock_targets(&[target.as_str()]);

        let node = self
            .store
            .find_one(&target)?
            .ok_or_else(|| TreeError::NotFound(target.clone()))?;
        self.remove_node(&node)?;
        info!(path = %target, "Deleted node");
        Ok(())
    }

    /// Unlink from the parent, cascade into children, then drop the record.
    ///
    /// A failure part-way leaves the remaining subtree unreachable from root;
    /// `check_consistency` reports such records as orphans.
    pub(crate) fn remove_node(&self, node: &Node) -> Result<(), TreeError> {
        if let Some(parent) = &node.parent {
            match self.store.pull_child(parent, &node.path) {
                Ok(()) => {}
                Err(StorageError::NoMatch(_)) => {
                    warn!(path = %node.path, parent = %parent, "Parent record missing during unlink")
                }
                Err(e) => return Err(e.into()),
            }
        }
        if node.is_folder() {
            self.remove_descendants(node)?;
        }
        self.store.delete_one(&node.path)?;
        Ok(())
    }

    fn remove_descendants(&self, folder: &Node) -> Result<(), TreeError> {
        for child in folder.children() {
            match self.store.find_one(child)? {
                Some(record) => {
                    if record.is_folder() {
                        self.remove_descendants(&record)?;
                    }
                    self.store.delete_one(&record.path)?;
                    debug!(path = %record.path, "Deleted descendant");
                }
                None => warn!(folder = %folder.path, child = %child, "Listed child has no record"),
            }
        }
        Ok(())
    }

    /// Materialize the whole tree from the flat record set.
    pub fn get_directory(&self) -> Result<ResponseEnvelope<DirectoryNode>, StorageError> {
        let root = self.ensure_root()?;
        let nodes = self.store.find_all(&NodeFilter::All)?;
        debug!(records = nodes.len(), "Building directory view");
        Ok(ResponseEnvelope::success(
            Status::Ok,
            DirectoryNode::build(root, nodes),
        ))
    }
}
