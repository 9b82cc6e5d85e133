//! Lexical path helpers.
//!
//! Module keys are compared as plain paths: `.` and `..` are collapsed
//! without touching the filesystem, so symlinks are never resolved and
//! references to missing directories still produce a key.

use std::path::{Component, Path, PathBuf};

use crate::error::{IacError, IacResult};

/// Collapse `.` and `..` components lexically.
///
/// `..` directly below the root is dropped; leading `..` of a relative path
/// is kept. An empty result becomes `.`.
pub fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

/// Absolute, normalized form of `path`, relative paths being taken from the
/// current working directory.
pub fn absolute(path: &Path) -> IacResult<PathBuf> {
    if path.is_absolute() {
        return Ok(normalize(path));
    }
    let cwd = std::env::current_dir().map_err(|e| IacError::io(path, e))?;
    Ok(normalize(&cwd.join(path)))
}

/// Path of `path` relative to `base`; both must already be absolute and
/// normalized. Returns `.` when they are equal.
pub fn relative_to(path: &Path, base: &Path) -> IacResult<PathBuf> {
    match path.strip_prefix(base) {
        Ok(rel) if rel.as_os_str().is_empty() => Ok(PathBuf::from(".")),
        Ok(rel) => Ok(rel.to_path_buf()),
        Err(_) => Err(IacError::NotUnderBase {
            path: path.to_path_buf(),
            base: base.to_path_buf(),
        }),
    }
}
