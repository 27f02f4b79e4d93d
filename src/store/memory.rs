//! In-memory node record store

use super::{apply_updates, require_folder, FieldUpdate, NodeFilter, NodeRecordStore};
use crate::error::StorageError;
use crate::tree::node::Node;
use crate::types::RecordId;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Records kept in a path-ordered map behind a single lock.
pub struct MemoryNodeRecordStore {
    records: RwLock<BTreeMap<String, Node>>,
    next_id: AtomicU64,
}

impl MemoryNodeRecordStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn modify<F>(&self, path: &str, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut Node) -> Result<(), StorageError>,
    {
        let mut records = self.records.write();
        let node = records
            .get_mut(path)
            .ok_or_else(|| StorageError::NoMatch(path.to_string()))?;
        // Work on a copy so a failed update leaves the record untouched.
        let mut updated = node.clone();
        f(&mut updated)?;
        *node = updated;
        Ok(())
    }
}

impl Default for MemoryNodeRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeRecordStore for MemoryNodeRecordStore {
    fn find_one(&self, path: &str) -> Result<Option<Node>, StorageError> {
        Ok(self.records.read().get(path).cloned())
    }

    fn find_all(&self, filter: &NodeFilter) -> Result<Vec<Node>, StorageError> {
        Ok(self
            .records
            .read()
            .values()
            .filter(|node| filter.matches(node))
            .cloned()
            .collect())
    }

    fn insert(&self, node: &Node) -> Result<RecordId, StorageError> {
        let mut records = self.records.write();
        if records.contains_key(&node.path) {
            return Err(StorageError::Duplicate(node.path.clone()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut record = node.clone();
        record.id = Some(id);
        records.insert(record.path.clone(), record);
        Ok(id)
    }

    fn update_fields(&self, path: &str, updates: &[FieldUpdate]) -> Result<(), StorageError> {
        self.modify(path, |node| apply_updates(node, updates))
    }

    fn push_child(&self, path: &str, child: &str) -> Result<(), StorageError> {
        self.modify(path, |node| {
            require_folder(node)?;
            node.add_child(child);
            Ok(())
        })
    }

    fn pull_child(&self, path: &str, child: &str) -> Result<(), StorageError> {
        self.modify(path, |node| {
            require_folder(node)?;
            node.remove_child(child);
            Ok(())
        })
    }

    fn delete_one(&self, path: &str) -> Result<bool, StorageError> {
        Ok(self.records.write().remove(path).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PropertyKey;
    use crate::tree::node::Properties;
    use crate::types::Mode;

    #[test]
    fn test_insert_assigns_fresh_ids_and_rejects_duplicates() {
        let store = MemoryNodeRecordStore::new();
        let first = store.insert(&Node::root()).unwrap();
        let second = store.insert(&Node::folder("/a/")).unwrap();
        assert_ne!(first, second);
        assert!(matches!(
            store.insert(&Node::folder("/a/")),
            Err(StorageError::Duplicate(_))
        ));
        assert_eq!(store.find_one("/a/").unwrap().unwrap().id, Some(second));
    }

    #[test]
    fn test_push_and_pull_child() {
        let store = MemoryNodeRecordStore::new();
        store.insert(&Node::folder("/a/")).unwrap();
        store.push_child("/a/", "/a/b/").unwrap();
        store.push_child("/a/", "/a/b/").unwrap();
        assert_eq!(store.find_one("/a/").unwrap().unwrap().children(), ["/a/b/".to_string()]);
        store.pull_child("/a/", "/a/b/").unwrap();
        assert!(store.find_one("/a/").unwrap().unwrap().children().is_empty());
        assert!(matches!(
            store.push_child("/missing/", "/missing/x/"),
            Err(StorageError::NoMatch(_))
        ));
    }

    #[test]
    fn test_push_child_rejects_files() {
        let store = MemoryNodeRecordStore::new();
        store.insert(&Node::file("/a.test", Mode::Test)).unwrap();
        assert!(matches!(
            store.push_child("/a.test", "/a.test/b.test"),
            Err(StorageError::NotAFolder(_))
        ));
    }

    #[test]
    fn test_update_fields() {
        let store = MemoryNodeRecordStore::new();
        store.insert(&Node::file("/a.test", Mode::Test)).unwrap();
        store
            .update_fields("/a.test", &[FieldUpdate::new(PropertyKey::Url, "http://x")])
            .unwrap();
        let node = store.find_one("/a.test").unwrap().unwrap();
        match node.properties {
            Some(Properties::Test(props)) => assert_eq!(props.url, "http://x"),
            other => panic!("unexpected properties: {:?}", other),
        }
        assert!(matches!(
            store.update_fields("/b.test", &[FieldUpdate::new(PropertyKey::Url, "y")]),
            Err(StorageError::NoMatch(_))
        ));
    }

    #[test]
    fn test_failed_update_leaves_record_untouched() {
        let store = MemoryNodeRecordStore::new();
        store.insert(&Node::file("/a.test", Mode::Test)).unwrap();
        let result = store.update_fields(
            "/a.test",
            &[
                FieldUpdate::new(PropertyKey::Url, "http://x"),
                FieldUpdate::new(PropertyKey::Id, "nope"),
            ],
        );
        assert!(result.is_err());
        let node = store.find_one("/a.test").unwrap().unwrap();
        assert_eq!(node.properties, Some(Properties::defaults_for(Mode::Test)));
    }
}
