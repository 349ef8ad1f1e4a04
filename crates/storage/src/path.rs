//! Path splitting and validation.
//!
//! Output paths are always computed relative to a dataset root, so they are
//! validated here to prevent them escaping it. Source paths are split into a
//! "file root" (parent + stem) and an extension, treating compound imaging
//! extensions such as `.nii.gz` as a single unit.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Extensions that span more than one dot and must be split as a unit.
pub const COMPOUND_EXTENSIONS: &[&str] = &[".nii.gz"];

/// Validates a relative dataset path.
/// Ensures that paths don't escape the dataset root (no `..` traversal).
///
/// > **Note:** This does **not** normalize backslashes, non-UTF8 bytes, or
/// >           platform-specific weirdness. Null bytes are explicitly rejected.
///
/// # Returns
/// Returns the normalized path if valid, or [`InvalidPath`](crate::error::ErrorKind::InvalidPath)
/// if invalid.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use d2b_storage::validate_path;
/// // Valid paths
/// assert!(validate_path("sub-01/anat/sub-01_T1w.nii.gz").is_ok());
/// assert!(validate_path("a/b/c/file.json").is_ok());
/// assert!(validate_path("a/../file.json").is_ok()); // (never leaves dataset root)
/// // Invalid paths
/// assert!(validate_path("../sub-01/anat").is_err());
/// assert!(validate_path("a/../../b").is_err()); // (leaves dataset root)
/// assert!(validate_path("a\0b").is_err());
/// // Paths get resolved
/// assert_eq!(
///     validate_path("wrong/../still-wrong/.././sub-01//./anat/").unwrap(),
///     Path::new("sub-01/anat")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let mut components = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::Normal(s) => {
                // Null bytes pass through Path::components() on Unix but cause
                // truncation in C-based syscalls.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
            },
        }
    }
    match components.is_empty() {
        true => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
        false => Ok(components.into_iter().collect()),
    }
}

/// Splits the extension from a path, treating [`COMPOUND_EXTENSIONS`] as a
/// single extension.
///
/// ```
/// use d2b_storage::splitext;
/// use std::path::PathBuf;
/// assert_eq!(splitext("a/b.json"), (PathBuf::from("a/b"), ".json".to_string()));
/// assert_eq!(splitext("a/b.nii.gz"), (PathBuf::from("a/b"), ".nii.gz".to_string()));
/// assert_eq!(splitext("a/b.tar.gz"), (PathBuf::from("a/b.tar"), ".gz".to_string()));
/// ```
pub fn splitext(path: impl AsRef<Path>) -> (PathBuf, String) {
    splitext_with(path, COMPOUND_EXTENSIONS)
}

/// Like [`splitext`] but with a caller-provided list of compound extensions,
/// checked in order before falling back to the last dot-suffix.
pub fn splitext_with(path: impl AsRef<Path>, compound: &[&str]) -> (PathBuf, String) {
    let path = path.as_ref();
    let Some(name) = path.file_name().and_then(OsStr::to_str) else {
        return (path.to_path_buf(), String::new());
    };
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    for ext in compound {
        if name.len() > ext.len() && name.ends_with(ext) {
            return (parent.join(&name[..name.len() - ext.len()]), (*ext).to_string());
        }
    }
    match name.rfind('.') {
        // A leading dot is a hidden file, not an extension.
        Some(i) if i > 0 => (parent.join(&name[..i]), name[i..].to_string()),
        _ => (path.to_path_buf(), String::new()),
    }
}

/// Lists the files that share a file root (parent directory + stem) with
/// `path`, in sorted order. The file itself is included if it exists.
///
/// `a/t.json` has the siblings `a/t.json`, `a/t.nii.gz` and `a/t.bval`, but
/// not `a/t2.json` or `a/t`.
pub fn siblings(path: impl AsRef<Path>) -> std::io::Result<Vec<PathBuf>> {
    let (root, _) = splitext(path);
    let Some(stem) = root.file_name().and_then(OsStr::to_str) else {
        return Ok(vec![]);
    };
    let prefix = format!("{stem}.");
    let dir = match root.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
        Err(e) => return Err(e),
    };
    let mut found = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if entry.file_name().to_str().is_some_and(|n| n.starts_with(&prefix)) {
            found.push(root.with_file_name(entry.file_name()));
        }
    }
    found.sort();
    Ok(found)
}
