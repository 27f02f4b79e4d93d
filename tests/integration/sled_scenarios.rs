//! Hierarchy scenarios against the sled-backed store

use honeytree::envelope::Status;
use honeytree::store::{NodeRecordStore, SledNodeRecordStore};
use honeytree::tree::Properties;
use honeytree::{HierarchyManager, Mode};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn open(dir: &Path, mode: Mode) -> HierarchyManager {
    let store = Arc::new(SledNodeRecordStore::open(dir).unwrap());
    HierarchyManager::new(store, mode).unwrap()
}

#[test]
fn test_tree_survives_reopen() {
    let temp = TempDir::new().unwrap();
    {
        let tree = open(temp.path(), Mode::Test);
        tree.create("/suite/login.test").unwrap();
        let saved = tree
            .save(
                "/suite/login.test",
                json!({ "url": "https://example.com/login" }).as_object().unwrap(),
            )
            .unwrap();
        assert_eq!(saved.status, Status::Ok);
    }

    let tree = open(temp.path(), Mode::Test);
    let listing = tree.get("/suite/").unwrap().into_data().unwrap();
    assert_eq!(listing.children.len(), 1);
    match &listing.children[0].properties {
        Some(Properties::Test(props)) => {
            assert_eq!(props.url, "https://example.com/login");
            assert_eq!(props.browser, "Chrome");
        }
        other => panic!("unexpected properties: {:?}", other),
    }
    let report = tree.check_consistency().unwrap().into_data().unwrap();
    assert!(report.valid, "issues: {:?}", report.issues);
    assert_eq!(report.node_count, 3);
}

#[test]
fn test_concurrent_creates_share_ancestors() {
    let temp = TempDir::new().unwrap();
    let tree = open(temp.path(), Mode::Test);

    std::thread::scope(|scope| {
        for worker in 0..8 {
            let tree = &tree;
            scope.spawn(move || {
                for i in 0..10 {
                    let path = format!("/shared/deep/w{}_{}.test", worker, i);
                    assert_eq!(tree.create(&path).unwrap().status, Status::Created);
                }
            });
        }
    });

    let deep = tree.store().find_one("/shared/deep/").unwrap().unwrap();
    assert_eq!(deep.children().len(), 80);
    let root = tree.store().find_one("/").unwrap().unwrap();
    assert_eq!(root.children(), ["/shared/".to_string()]);
    let report = tree.check_consistency().unwrap().into_data().unwrap();
    assert!(report.valid, "issues: {:?}", report.issues);
}

#[test]
fn test_concurrent_create_same_path_has_one_winner() {
    let temp = TempDir::new().unwrap();
    let tree = open(temp.path(), Mode::Phrase);

    let statuses: Vec<Status> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..6)
            .map(|_| {
                let tree = &tree;
                scope.spawn(move || tree.create("/greetings/hello.phrase").unwrap().status)
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(statuses.iter().filter(|s| **s == Status::Created).count(), 1);
    assert_eq!(statuses.iter().filter(|s| **s == Status::Conflict).count(), 5);
    let folder = tree.store().find_one("/greetings/").unwrap().unwrap();
    assert_eq!(folder.children(), ["/greetings/hello.phrase".to_string()]);
}

#[test]
fn test_phrase_workflow() {
    let temp = TempDir::new().unwrap();
    let tree = open(temp.path(), Mode::Phrase);

    tree.create("/greetings/hello.phrase").unwrap();
    tree.save(
        "/greetings/hello.phrase",
        json!({ "ID": "p-1", "content": "Hello" }).as_object().unwrap(),
    )
    .unwrap();
    tree.copy("/greetings/hello.phrase", "/archive/hello.phrase")
        .unwrap();

    let found = tree.get_phrase_by_id("p-1").unwrap().into_data().unwrap();
    assert_eq!(found.len(), 2);

    let moved = tree
        .rename("/archive/hello.phrase", "/archive/hi.phrase", Some("p-2"))
        .unwrap();
    assert_eq!(moved.status, Status::Created);
    assert_eq!(
        tree.get_phrase_by_id("p-1").unwrap().into_data().unwrap().len(),
        1
    );
    let renamed = tree.get_phrase_by_id("p-2").unwrap().into_data().unwrap();
    assert_eq!(renamed[0].path, "/archive/hi.phrase");
    assert_eq!(
        tree.get_phrase_by_id("p-3").unwrap().status,
        Status::NotFound
    );
}

#[test]
fn test_cascade_delete_on_disk() {
    let temp = TempDir::new().unwrap();
    let tree = open(temp.path(), Mode::Test);
    tree.create("/a/b/c.test").unwrap();
    tree.create("/a/b/d/e.api").unwrap();
    tree.create("/keep.ui").unwrap();

    assert_eq!(tree.delete("/a/").unwrap().status, Status::NoContent);
    drop(tree);

    let tree = open(temp.path(), Mode::Test);
    let directory = tree.get_directory().unwrap().into_data().unwrap();
    assert_eq!(directory.count(), 2);
    assert!(directory.find("/keep.ui").is_some());
    assert_eq!(tree.get("/a/b/c.test").unwrap().status, Status::NotFound);
}
