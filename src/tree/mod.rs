//! Tree model: node records, path classification, and the nested view.

pub mod directory;
pub mod node;
pub mod path;

pub use directory::DirectoryNode;
pub use node::{
    FieldUpdate, Node, NodeKind, PhraseProperties, Properties, PropertyKey, TestProperties,
};
