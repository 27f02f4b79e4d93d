//! Parent/child bookkeeping checks over the full record set

use super::HierarchyManager;
use crate::envelope::{ResponseEnvelope, Status};
use crate::error::StorageError;
use crate::store::NodeFilter;
use crate::tree::path;
use crate::tree::Node;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// A single violated hierarchy invariant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Inconsistency {
    MissingRoot,
    RootHasParent { parent: String },
    /// Non-root record without a parent
    Parentless { path: String },
    /// Stored parent differs from the one derived from the path
    WrongParent {
        path: String,
        parent: String,
        expected: String,
    },
    /// Parent record missing or not a folder
    Orphan { path: String, parent: String },
    /// Parent exists but does not list the record
    Unlisted { path: String, parent: String },
    /// Listed child has no record
    DanglingChild { folder: String, child: String },
    /// Listed child names a different parent
    MisparentedChild {
        folder: String,
        child: String,
        actual_parent: Option<String>,
    },
    DuplicateChild { folder: String, child: String },
    /// Record shape disagrees with its type
    Malformed { path: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsistencyReport {
    pub valid: bool,
    pub node_count: usize,
    pub issues: Vec<Inconsistency>,
}

fn shape_issue(node: &Node) -> Option<&'static str> {
    if node.is_folder() {
        if !node.path.ends_with('/') {
            return Some("folder path must end with '/'");
        }
        if node.children.is_none() {
            return Some("folder without a children list");
        }
        if node.properties.is_some() {
            return Some("folder carries properties");
        }
    } else {
        if node.path.ends_with('/') {
            return Some("file path must not end with '/'");
        }
        if node.children.is_some() {
            return Some("file carries a children list");
        }
    }
    None
}

/// Check every hierarchy invariant over a flat record set.
pub fn inspect(nodes: &[Node]) -> Vec<Inconsistency> {
    let by_path: HashMap<&str, &Node> = nodes.iter().map(|n| (n.path.as_str(), n)).collect();
    let mut issues = Vec::new();

    if !by_path.contains_key(path::ROOT) {
        issues.push(Inconsistency::MissingRoot);
    }

    for node in nodes {
        if let Some(reason) = shape_issue(node) {
            issues.push(Inconsistency::Malformed {
                path: node.path.clone(),
                reason: reason.to_string(),
            });
        }

        if node.is_root() {
            if let Some(parent) = &node.parent {
                issues.push(Inconsistency::RootHasParent {
                    parent: parent.clone(),
                });
            }
        } else {
            match &node.parent {
                None => issues.push(Inconsistency::Parentless {
                    path: node.path.clone(),
                }),
                Some(parent) => {
                    let expected = path::parent_of(&node.path);
                    if *parent != expected {
                        issues.push(Inconsistency::WrongParent {
                            path: node.path.clone(),
                            parent: parent.clone(),
                            expected,
                        });
                    }
                    match by_path.get(parent.as_str()) {
                        Some(folder) if folder.is_folder() => {
                            if !folder.children().contains(&node.path) {
                                issues.push(Inconsistency::Unlisted {
                                    path: node.path.clone(),
                                    parent: parent.clone(),
                                });
                            }
                        }
                        _ => issues.push(Inconsistency::Orphan {
                            path: node.path.clone(),
                            parent: parent.clone(),
                        }),
                    }
                }
            }
        }

        let mut seen = HashSet::new();
        for child in node.children() {
            if !seen.insert(child.as_str()) {
                issues.push(Inconsistency::DuplicateChild {
                    folder: node.path.clone(),
                    child: child.clone(),
                });
                continue;
            }
            match by_path.get(child.as_str()) {
                None => issues.push(Inconsistency::DanglingChild {
                    folder: node.path.clone(),
                    child: child.clone(),
                }),
                Some(record) if record.parent.as_deref() != Some(node.path.as_str()) => {
                    issues.push(Inconsistency::MisparentedChild {
                        folder: node.path.clone(),
                        child: child.clone(),
                        actual_parent: record.parent.clone(),
                    })
                }
                Some(_) => {}
            }
        }
    }

    issues
}

impl HierarchyManager {
    /// Verify parent/child bookkeeping across the whole store. Read-only.
    pub fn check_consistency(&self) -> Result<ResponseEnvelope<ConsistencyReport>, StorageError> {
        let nodes = self.store.find_all(&NodeFilter::All)?;
        let issues = inspect(&nodes);
        if !issues.is_empty() {
            warn!(issues = issues.len(), "Hierarchy inconsistencies found");
        }
        Ok(ResponseEnvelope::success(
            Status::Ok,
            ConsistencyReport {
                valid: issues.is_empty(),
                node_count: nodes.len(),
                issues,
            },
        ))
    }
}
