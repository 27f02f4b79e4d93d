//! Concurrent mutations across tree levels

use honeytree::envelope::Status;
use honeytree::error::StorageError;
use honeytree::store::{
    FieldUpdate, MemoryNodeRecordStore, NodeFilter, NodeRecordStore, SledNodeRecordStore,
};
use honeytree::tree::Node;
use honeytree::types::RecordId;
use honeytree::{HierarchyManager, Mode};
use parking_lot::Mutex;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

/// Memory store that parks the insert of one path until released.
struct GatedStore {
    inner: MemoryNodeRecordStore,
    gated: &'static str,
    entered: Mutex<Option<Sender<()>>>,
    release: Mutex<Option<Receiver<()>>>,
}

impl NodeRecordStore for GatedStore {
    fn find_one(&self, path: &str) -> Result<Option<Node>, StorageError> {
        self.inner.find_one(path)
    }

    fn find_all(&self, filter: &NodeFilter) -> Result<Vec<Node>, StorageError> {
        self.inner.find_all(filter)
    }

    fn insert(&self, node: &Node) -> Result<RecordId, StorageError> {
        if node.path == self.gated {
            if let Some(entered) = self.entered.lock().take() {
                let _ = entered.send(());
            }
            let release = self.release.lock().take();
            if let Some(release) = release {
                let _ = release.recv();
            }
        }
        self.inner.insert(node)
    }

    fn update_fields(&self, path: &str, updates: &[FieldUpdate]) -> Result<(), StorageError> {
        self.inner.update_fields(path, updates)
    }

    fn push_child(&self, path: &str, child: &str) -> Result<(), StorageError> {
        self.inner.push_child(path, child)
    }

    fn pull_child(&self, path: &str, child: &str) -> Result<(), StorageError> {
        self.inner.pull_child(path, child)
    }

    fn delete_one(&self, path: &str) -> Result<bool, StorageError> {
        self.inner.delete_one(path)
    }
}

#[test]
fn test_folder_delete_during_child_create_leaves_no_orphan() {
    let (entered_tx, entered_rx) = channel();
    let (release_tx, release_rx) = channel();
    let store = Arc::new(GatedStore {
        inner: MemoryNodeRecordStore::new(),
        gated: "/a/x.test",
        entered: Mutex::new(Some(entered_tx)),
        release: Mutex::new(Some(release_rx)),
    });
    let tree = Arc::new(HierarchyManager::new(store.clone(), Mode::Test).unwrap());
    tree.create("/a/").unwrap();

    let creator = {
        let tree = tree.clone();
        thread::spawn(move || tree.create("/a/x.test").unwrap().status)
    };
    entered_rx.recv().unwrap();

    let deleter = {
        let tree = tree.clone();
        thread::spawn(move || tree.delete("/a/").unwrap().status)
    };
    thread::sleep(Duration::from_millis(50));
    // The delete is parked behind the create that is still in flight.
    assert!(store.find_one("/a/").unwrap().is_some());

    release_tx.send(()).unwrap();
    assert_eq!(creator.join().unwrap(), Status::Created);
    assert_eq!(deleter.join().unwrap(), Status::NoContent);

    let remaining: Vec<String> = store
        .find_all(&NodeFilter::All)
        .unwrap()
        .into_iter()
        .map(|node| node.path)
        .collect();
    assert_eq!(remaining, ["/".to_string()]);
    let report = tree.check_consistency().unwrap().into_data().unwrap();
    assert!(report.valid, "issues: {:?}", report.issues);
}

#[test]
fn test_mixed_level_mutations_stay_consistent() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(SledNodeRecordStore::open(temp.path()).unwrap());
    let tree = HierarchyManager::new(store, Mode::Test).unwrap();

    thread::scope(|scope| {
        for worker in 0..4 {
            let tree = &tree;
            scope.spawn(move || {
                for i in 0..25 {
                    let path = format!("/s/t{}/f{}.test", worker, i);
                    assert_eq!(tree.create(&path).unwrap().status, Status::Created);
                }
            });
        }
        for worker in 0..2 {
            let tree = &tree;
            scope.spawn(move || {
                for i in 0..15 {
                    let source = format!("/src/w{}_{}.test", worker, i);
                    assert_eq!(tree.create(&source).unwrap().status, Status::Created);
                    let copied = tree
                        .copy(&source, &format!("/s/copies/w{}_{}.test", worker, i))
                        .unwrap();
                    assert_eq!(copied.status, Status::Created);
                    let moved = tree
                        .rename(&source, &format!("/s/moved/w{}_{}.test", worker, i), None)
                        .unwrap();
                    assert_eq!(moved.status, Status::Created);
                }
            });
        }
        let tree = &tree;
        scope.spawn(move || {
            for _ in 0..30 {
                let status = tree.delete("/s/").unwrap().status;
                assert!(matches!(status, Status::NoContent | Status::NotFound));
                thread::yield_now();
            }
        });
    });

    let report = tree.check_consistency().unwrap().into_data().unwrap();
    assert!(report.valid, "issues: {:?}", report.issues);
    let directory = tree.get_directory().unwrap().into_data().unwrap();
    assert_eq!(directory.count(), report.node_count);
}
