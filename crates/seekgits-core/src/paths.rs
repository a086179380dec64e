//! Repository-relative path normalization.
//!
//! Manifest keys and `.gitattributes` lines always use forward-slash,
//! root-relative paths with no `.` or `..` components. Everything a
//! user or git hands us is funneled through here first.

use std::path::{Component, Path, PathBuf};

use crate::error::{SeekgitsError, SeekgitsResult};

/// Normalize a repository-relative path string.
///
/// Rejects absolute paths and parent-directory components, strips
/// leading `./` and redundant separators.
pub fn normalize(path: &str) -> SeekgitsResult<String> {
    if path.is_empty() {
        return Err(invalid(path, "empty path"));
    }
    let unified = path.replace('\\', "/");
    if unified.starts_with('/') || Path::new(&unified).is_absolute() {
        return Err(invalid(path, "absolute paths are not allowed"));
    }

    let mut parts = Vec::new();
    for part in unified.split('/') {
        match part {
            "" | "." => continue,
            ".." => return Err(invalid(path, "parent-directory components are not allowed")),
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return Err(invalid(path, "path has no components"));
    }
    Ok(parts.join("/"))
}

/// Resolve a user-supplied path (absolute or relative to the current
/// directory) to a normalized repository-relative path.
///
/// Fails if the path points outside `root`.
pub fn repo_relative(root: &Path, given: &Path) -> SeekgitsResult<String> {
    let absolute = if given.is_absolute() {
        given.to_path_buf()
    } else {
        std::env::current_dir()?.join(given)
    };
    let absolute = lexical_clean(&absolute);
    let root = lexical_clean(root);

    let rel = absolute.strip_prefix(&root).map_err(|_| {
        invalid(
            &given.display().to_string(),
            "path is outside the repository",
        )
    })?;
    normalize(&rel.to_string_lossy())
}

/// Collapse `.` and `..` components without touching the filesystem.
fn lexical_clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

fn invalid(path: &str, reason: &str) -> SeekgitsError {
    SeekgitsError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}
