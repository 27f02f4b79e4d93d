//! Rename and copy of file nodes

use super::{respond, HierarchyManager};
use crate::envelope::{ResponseEnvelope, Status};
use crate::error::{PathError, Side, StorageError, Transfer, TreeError};
use crate::tree::node::Properties;
use crate::tree::path;
use crate::tree::Node;
use crate::types::Mode;
use tracing::info;

fn check_side(side: Side, raw: &str) -> Result<(), TreeError> {
    let source = if raw.is_empty() {
        PathError::Missing
    } else if !path::is_well_formed(raw) {
        PathError::DoubleSlash(raw.to_string())
    } else {
        return Ok(());
    };
    Err(TreeError::TransferPath { side, source })
}

impl HierarchyManager {
    /// Move a file to `destination`, synthesizing missing ancestors there.
    ///
    /// In phrase mode `phrase_id`, when given, replaces the phrase id.
    /// 201 with the moved node. Folders cannot be renamed.
    pub fn rename(
        &self,
        original: &str,
        destination: &str,
        phrase_id: Option<&str>,
    ) -> Result<ResponseEnvelope<Node>, StorageError> {
        respond(
            Status::Created,
            self.transfer(Transfer::Rename, original, destination, phrase_id),
        )
    }

    /// Duplicate a file at `destination` with a fresh storage identity.
    pub fn copy(
        &self,
        original: &str,
        destination: &str,
    ) -> Result<ResponseEnvelope<Node>, StorageError> {
        respond(
            Status::Created,
            self.transfer(Transfer::Copy, original, destination, None),
        )
    }

    fn transfer(
        &self,
        kind: Transfer,
        original: &str,
        destination: &str,
        phrase_id: Option<&str>,
    ) -> Result<Node, TreeError> {
        check_side(Side::Destination, destination)?;
        check_side(Side::Original, original)?;
        if !path::is_file(original) || !path::is_file(destination) {
            return Err(TreeError::FolderTransfer(kind));
        }

        let from = path::normalize(original, self.mode);
        let to = path::normalize(destination, self.mode);
        let _guard = self.lock_targets(&[from.as_str(), to.as_str()]);

        let source = self
            .store
            .find_one(&from)?
            .ok_or_else(|| TreeError::NotFound(from.clone()))?;
        if self.store.find_one(&to)?.is_some() {
            return Err(TreeError::Conflict(to));
        }
        for (side, candidate) in [(Side::Original, &from), (Side::Destination, &to)] {
            if !self.mode.is_valid_leaf(candidate) {
                return Err(TreeError::TransferPath {
                    side,
                    source: PathError::InvalidExtension {
                        path: candidate.to_string(),
                        mode: self.mode,
                    },
                });
            }
        }

        self.synthesize_ancestors(&to)?;
        let mut moved = source.relocated(&to);
        if let (Transfer::Rename, Mode::Phrase, Some(id)) = (kind, self.mode, phrase_id) {
            if let Some(Properties::Phrase(phrase)) = moved.properties.as_mut() {
                phrase.id = id.to_string();
            }
        }
        // The destination is written before the source is removed, so a
        // failed insert never loses the original.
        self.insert_linked(&moved, false)?;
        if kind == Transfer::Rename {
            self.remove_node(&source)?;
        }
        info!(from = %from, to = %to, operation = %kind, "Transferred file");

        Ok(self
            .store
            .find_one(&to)?
            .ok_or(StorageError::NoMatch(to))?)
    }
}
