//! Property tests: arbitrary operation sequences keep the hierarchy consistent

use honeytree::envelope::Status;
use honeytree::store::{MemoryNodeRecordStore, NodeFilter, NodeRecordStore};
use honeytree::{HierarchyManager, Mode};
use proptest::prelude::*;
use proptest::sample::select;
use serde_json::json;
use std::sync::Arc;

const FOLDERS: &[&str] = &["/a/", "/a/b/", "/c/", "/a/b/d/"];
const FILES: &[&str] = &[
    "/a/x.test",
    "/a/b/y.api",
    "/a/b/d/q.feature",
    "/c/z.ui",
    "/w.feature",
];

#[derive(Debug, Clone)]
enum Op {
    Create(&'static str),
    Delete(&'static str),
    Rename(&'static str, &'static str),
    Copy(&'static str, &'static str),
    Save(&'static str),
}

fn any_path() -> impl Strategy<Value = &'static str> {
    select([FOLDERS, FILES].concat())
}

fn any_file() -> impl Strategy<Value = &'static str> {
    select(FILES.to_vec())
}

fn any_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any_path().prop_map(Op::Create),
        2 => any_path().prop_map(Op::Delete),
        2 => (any_file(), any_file()).prop_map(|(a, b)| Op::Rename(a, b)),
        2 => (any_file(), any_file()).prop_map(|(a, b)| Op::Copy(a, b)),
        1 => any_file().prop_map(Op::Save),
    ]
}

fn apply(tree: &HierarchyManager, op: &Op) -> Status {
    match op {
        Op::Create(path) => tree.create(path).unwrap().status,
        Op::Delete(path) => tree.delete(path).unwrap().status,
        Op::Rename(from, to) => tree.rename(from, to, None).unwrap().status,
        Op::Copy(from, to) => tree.copy(from, to).unwrap().status,
        Op::Save(path) => {
            let updates = json!({ "content": "updated", "host": null });
            tree.save(path, updates.as_object().unwrap()).unwrap().status
        }
    }
}

proptest! {
    #[test]
    fn operation_sequences_keep_bookkeeping_consistent(
        ops in proptest::collection::vec(any_op(), 1..40)
    ) {
        let store = Arc::new(MemoryNodeRecordStore::new());
        let tree = HierarchyManager::new(store.clone(), Mode::Test).unwrap();

        for op in &ops {
            let status = apply(&tree, op);
            prop_assert!(
                matches!(
                    status,
                    Status::Ok | Status::Created | Status::NoContent | Status::NotFound | Status::Conflict
                ),
                "unexpected status {:?} for {:?}", status, op
            );
        }

        let report = tree.check_consistency().unwrap().into_data().unwrap();
        prop_assert!(report.valid, "issues {:?} after {:?}", report.issues, ops);

        let directory = tree.get_directory().unwrap().into_data().unwrap();
        prop_assert_eq!(directory.count(), store.len());
    }

    #[test]
    fn deleting_a_folder_removes_its_subtree(
        ops in proptest::collection::vec(any_op(), 1..30),
        folder in select(FOLDERS.to_vec())
    ) {
        let tree = HierarchyManager::new(Arc::new(MemoryNodeRecordStore::new()), Mode::Test).unwrap();
        for op in &ops {
            apply(&tree, op);
        }
        tree.create(folder).unwrap();

        prop_assert_eq!(tree.delete(folder).unwrap().status, Status::NoContent);
        let remaining = tree.store().find_all(&NodeFilter::All).unwrap();
        prop_assert!(remaining.iter().all(|node| !node.path.starts_with(folder)));
        let report = tree.check_consistency().unwrap().into_data().unwrap();
        prop_assert!(report.valid, "issues {:?}", report.issues);
    }

    #[test]
    fn rename_preserves_record_count(from in any_file(), to in any_file()) {
        let tree = HierarchyManager::new(Arc::new(MemoryNodeRecordStore::new()), Mode::Test).unwrap();
        tree.create(from).unwrap();
        let before = tree.store().find_all(&NodeFilter::All).unwrap();
        let files_before = before.iter().filter(|n| !n.is_folder()).count();

        let status = tree.rename(from, to, None).unwrap().status;
        let after = tree.store().find_all(&NodeFilter::All).unwrap();
        let files_after = after.iter().filter(|n| !n.is_folder()).count();

        if from == to {
            prop_assert_eq!(status, Status::Conflict);
        } else {
            prop_assert_eq!(status, Status::Created);
            prop_assert!(tree.store().find_one(from).unwrap().is_none());
        }
        prop_assert_eq!(files_before, files_after);
    }
}
