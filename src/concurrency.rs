//! Per-path locking for mutating hierarchy operations
//!
//! A mutation write-locks the paths it changes and read-locks every folder
//! above them. Writers on the same path, and a folder delete against any
//! mutation beneath it, are therefore serialized; unrelated subtrees proceed
//! concurrently. Reads take no locks.

use parking_lot::lock_api::{ArcRwLockReadGuard, ArcRwLockWriteGuard};
use parking_lot::{RawRwLock, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Per-path lock manager
pub struct PathLockManager {
    /// Map from normalized path to its lock
    locks: RwLock<HashMap<String, Arc<RwLock<()>>>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Shared,
    Exclusive,
}

enum HeldLock {
    Shared(ArcRwLockReadGuard<RawRwLock, ()>),
    Exclusive(ArcRwLockWriteGuard<RawRwLock, ()>),
}

/// Guards held for the duration of one operation.
///
/// Dropping the guard releases every lock, then evicts map entries that no
/// other operation still references.
pub struct PathGuard<'a> {
    manager: &'a PathLockManager,
    paths: Vec<String>,
    held: Vec<HeldLock>,
}

impl PathLockManager {
    pub fn new() -> Self {
        Self {
            locks: RwLock::new(HashMap::new()),
        }
    }

    /// Get or create the lock for a path
    pub fn get_lock(&self, path: &str) -> Arc<RwLock<()>> {
        {
            let map = self.locks.read();
            if let Some(lock) = map.get(path) {
                return lock.clone();
            }
        }

        let mut map = self.locks.write();
        // Another thread may have inserted it between the two lock acquisitions.
        map.entry(path.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    /// Number of paths currently tracked
    pub fn tracked(&self) -> usize {
        self.locks.read().len()
    }

    /// Read-lock `shared` and write-lock `exclusive`.
    ///
    /// All paths are taken in one sorted order with duplicates merged, and a
    /// path named in both lists is write-locked. Two operations can
    /// therefore never wait on each other in a cycle.
    pub fn lock_paths(&self, shared: &[&str], exclusive: &[&str]) -> PathGuard<'_> {
        let mut wanted: BTreeMap<&str, Access> = BTreeMap::new();
        for path in shared {
            wanted.entry(*path).or_insert(Access::Shared);
        }
        for path in exclusive {
            wanted.insert(*path, Access::Exclusive);
        }

        let mut paths = Vec::with_capacity(wanted.len());
        let mut held = Vec::with_capacity(wanted.len());
        for (path, access) in wanted {
            let lock = self.get_lock(path);
            held.push(match access {
                Access::Shared => HeldLock::Shared(lock.read_arc()),
                Access::Exclusive => HeldLock::Exclusive(lock.write_arc()),
            });
            paths.push(path.to_string());
        }
        PathGuard {
            manager: self,
            paths,
            held,
        }
    }

    fn evict(&self, paths: &[String]) {
        let mut map = self.locks.write();
        for path in paths {
            // Only the map holds it: nobody is waiting on or holding this lock.
            if map.get(path).is_some_and(|lock| Arc::strong_count(lock) == 1) {
                map.remove(path);
            }
        }
    }
}

impl Default for PathLockManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PathGuard<'_> {
    fn drop(&mut self) {
        self.held.clear();
        self.manager.evict(&self.paths);
    }
}
