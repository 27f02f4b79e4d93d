//! Path classification
//!
//! Pure functions over slash-delimited path strings. A path's file/folder
//! classification is fully determined by its string form.

use crate::error::PathError;
use crate::types::Mode;

/// Path of the root folder
pub const ROOT: &str = "/";

/// True iff the path contains a `.`.
pub fn is_file(path: &str) -> bool {
    path.contains('.')
}

/// Rejects the empty path and any run of two or more `/`.
pub fn is_well_formed(path: &str) -> bool {
    !path.is_empty() && !path.contains("//")
}

/// Validate a path for the given mode.
///
/// Folders always pass the extension check; only file-like paths must carry
/// one of the mode's extensions.
pub fn validate(path: &str, mode: Mode) -> Result<(), PathError> {
    if path.is_empty() {
        return Err(PathError::Missing);
    }
    if !is_well_formed(path) {
        return Err(PathError::DoubleSlash(path.to_string()));
    }
    if is_file(path) && !mode.is_valid_leaf(path) {
        return Err(PathError::InvalidExtension {
            path: path.to_string(),
            mode,
        });
    }
    Ok(())
}

/// Canonical form: always a leading `/`; folders also get a trailing `/`.
pub fn normalize(path: &str, mode: Mode) -> String {
    let mut normalized = String::with_capacity(path.len() + 2);
    if !path.starts_with('/') {
        normalized.push('/');
    }
    normalized.push_str(path);
    if !mode.is_valid_leaf(path) && !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

/// Split point between the parent prefix and the final segment, if any.
///
/// The slash at index 0 never counts: `/a/` and `/a.test` have no parent
/// segment.
fn final_boundary(path: &str) -> Option<(&str, &str)> {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    match trimmed.rfind('/') {
        Some(idx) if idx > 0 && idx + 1 < trimmed.len() => {
            Some((&trimmed[..idx], &trimmed[idx + 1..]))
        }
        _ => None,
    }
}

/// Path of the immediate containing folder, `/` when none exists.
pub fn parent_of(path: &str) -> String {
    match final_boundary(path) {
        Some((parent, _)) => format!("{}/", parent),
        None => ROOT.to_string(),
    }
}

/// Final segment of the path.
pub fn leaf_name_of(path: &str) -> String {
    match final_boundary(path) {
        Some((_, leaf)) => leaf.to_string(),
        None => path.replace('/', ""),
    }
}

/// Increasingly specific prefixes from root's first child down to `path`.
///
/// Every entry is a folder prefix except the final one when it is a valid
/// file for `mode`. Root itself is never part of the chain.
pub fn ancestor_chain(path: &str, mode: Mode) -> Vec<String> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let last = segments.len().saturating_sub(1);
    let mut current = String::from(ROOT);
    let mut chain = Vec::with_capacity(segments.len());
    for (index, segment) in segments.iter().enumerate() {
        current.push_str(segment);
        if index != last || !mode.is_valid_leaf(segment) {
            current.push('/');
        }
        chain.push(current.clone());
    }
    chain
}
