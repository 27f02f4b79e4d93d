//! Config composition: defaults plus layered sources.

mod merge_policy;
pub mod service;
