//! Tree node records and their mode-dependent properties

use crate::tree::path;
use crate::types::{Mode, RecordId};
use serde::{Deserialize, Serialize};

/// Node type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Folder,
    File,
}

/// Properties of a file in test mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestProperties {
    pub url: String,
    pub browser: String,
    pub host: Option<String>,
    pub content: String,
    pub set: bool,
}

impl Default for TestProperties {
    fn default() -> Self {
        Self {
            url: String::new(),
            browser: "Chrome".to_string(),
            host: None,
            content: String::new(),
            set: false,
        }
    }
}

/// Properties of a file in phrase mode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseProperties {
    pub id: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Properties {
    Test(TestProperties),
    Phrase(PhraseProperties),
}

impl Properties {
    /// Defaults for a newly created file
    pub fn defaults_for(mode: Mode) -> Self {
        match mode {
            Mode::Test => Properties::Test(TestProperties::default()),
            Mode::Phrase => Properties::Phrase(PhraseProperties::default()),
        }
    }

    pub fn phrase_id(&self) -> Option<&str> {
        match self {
            Properties::Phrase(phrase) => Some(phrase.id.as_str()),
            Properties::Test(_) => None,
        }
    }

    /// Apply a single field update. Returns false when the key does not
    /// exist in this property schema.
    pub fn apply(&mut self, update: &FieldUpdate) -> bool {
        let text = update.value.clone().unwrap_or_default();
        match (self, update.key) {
            (Properties::Test(test), PropertyKey::Url) => test.url = text,
            (Properties::Test(test), PropertyKey::Browser) => test.browser = text,
            (Properties::Test(test), PropertyKey::Host) => test.host = update.value.clone(),
            (Properties::Test(test), PropertyKey::Content) => test.content = text,
            (Properties::Phrase(phrase), PropertyKey::Id) => phrase.id = text,
            (Properties::Phrase(phrase), PropertyKey::Content) => phrase.content = text,
            _ => return false,
        }
        true
    }
}

/// Property keys a client may update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Url,
    Browser,
    Host,
    Content,
    Id,
}

impl PropertyKey {
    /// Keys recognized by `save` in the given mode
    pub fn recognized(mode: Mode) -> &'static [PropertyKey] {
        match mode {
            Mode::Test => &[
                PropertyKey::Browser,
                PropertyKey::Host,
                PropertyKey::Url,
                PropertyKey::Content,
            ],
            Mode::Phrase => &[PropertyKey::Id, PropertyKey::Content],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PropertyKey::Url => "url",
            PropertyKey::Browser => "browser",
            PropertyKey::Host => "host",
            PropertyKey::Content => "content",
            PropertyKey::Id => "id",
        }
    }

    /// Case-insensitive lookup among the keys recognized in `mode`.
    pub fn parse(key: &str, mode: Mode) -> Option<PropertyKey> {
        Self::recognized(mode)
            .iter()
            .copied()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(key))
    }
}

/// One property assignment. `None` clears a nullable field and empties the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldUpdate {
    pub key: PropertyKey,
    pub value: Option<String>,
}

impl FieldUpdate {
    pub fn new(key: PropertyKey, value: impl Into<String>) -> Self {
        Self {
            key,
            value: Some(value.into()),
        }
    }
}

/// Node: a persisted file or folder record, keyed by `path`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub name: String,
    pub path: String,
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<String>>,
    pub properties: Option<Properties>,
}

impl Node {
    pub fn root() -> Self {
        Self {
            id: None,
            kind: NodeKind::Folder,
            name: String::new(),
            path: path::ROOT.to_string(),
            parent: None,
            children: Some(Vec::new()),
            properties: None,
        }
    }

    /// Empty folder at a normalized folder path
    pub fn folder(folder_path: &str) -> Self {
        Self {
            id: None,
            kind: NodeKind::Folder,
            name: path::leaf_name_of(folder_path),
            path: folder_path.to_string(),
            parent: Some(path::parent_of(folder_path)),
            children: Some(Vec::new()),
            properties: None,
        }
    }

    /// File at a normalized file path with the mode's default properties
    pub fn file(file_path: &str, mode: Mode) -> Self {
        Self {
            id: None,
            kind: NodeKind::File,
            name: path::leaf_name_of(file_path),
            path: file_path.to_string(),
            parent: Some(path::parent_of(file_path)),
            children: None,
            properties: Some(Properties::defaults_for(mode)),
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    pub fn is_root(&self) -> bool {
        self.path == path::ROOT
    }

    /// Direct child paths; empty for files
    pub fn children(&self) -> &[String] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Copy of this node's body under `destination`, without storage identity.
    pub fn relocated(&self, destination: &str) -> Node {
        Node {
            id: None,
            name: path::leaf_name_of(destination),
            path: destination.to_string(),
            parent: Some(path::parent_of(destination)),
            ..self.clone()
        }
    }

    /// Append `child` unless already listed. Returns whether the list changed.
    pub(crate) fn add_child(&mut self, child: &str) -> bool {
        match self.children.as_mut() {
            Some(children) if !children.iter().any(|c| c == child) => {
                children.push(child.to_string());
                true
            }
            _ => false,
        }
    }

    /// Remove every occurrence of `child`. Returns whether the list changed.
    pub(crate) fn remove_child(&mut self, child: &str) -> bool {
        match self.children.as_mut() {
            Some(children) => {
                let before = children.len();
                children.retain(|c| c != child);
                children.len() != before
            }
            None => false,
        }
    }
}
