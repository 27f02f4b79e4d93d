//! Core types for the honeytree hierarchy manager.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// RecordId: storage identity assigned by a record store on insert.
///
/// Distinct from the path, which is the primary key. A renamed or copied
/// node always receives a fresh identity.
pub type RecordId = u64;

/// Operating mode of a hierarchy manager.
///
/// Selects the file-extension rule and the property schema. Fixed for the
/// lifetime of a manager instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// `.ui`, `.api`, `.feature` and `.test` files carrying test properties
    #[default]
    Test,
    /// `.phrase` files carrying phrase properties
    Phrase,
}

impl Mode {
    /// File extensions accepted in this mode, without the leading dot.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Mode::Test => &["ui", "api", "feature", "test"],
            Mode::Phrase => &["phrase"],
        }
    }

    /// True iff `path` ends with one of this mode's extensions (ASCII case-insensitive).
    pub fn is_valid_leaf(self, path: &str) -> bool {
        match path.rsplit_once('.') {
            Some((_, ext)) => self
                .extensions()
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(ext)),
            None => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Test => "test",
            Mode::Phrase => "phrase",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "test" => Ok(Mode::Test),
            "phrase" => Ok(Mode::Phrase),
            other => Err(format!(
                "Invalid mode: {} (must be 'test' or 'phrase')",
                other
            )),
        }
    }
}
