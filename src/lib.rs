//! Honeytree: path-addressed hierarchy management
//!
//! Maintains a tree of folders and files stored as flat, path-keyed records.
//! Clients address nodes by slash-delimited paths; the manager keeps every
//! parent's child list consistent with the records and answers with a
//! uniform response envelope.

pub mod concurrency;
pub mod config;
pub mod envelope;
pub mod error;
pub mod hierarchy;
pub mod logging;
pub mod store;
pub mod tooling;
pub mod tree;
pub mod types;

pub use envelope::{Outcome, ResponseEnvelope, Status};
pub use error::{ApiError, PathError, StorageError, TreeError};
pub use hierarchy::{ConsistencyReport, HierarchyManager, Inconsistency, NodeListing};
pub use types::Mode;
