//! Rooted filesystem operations.
//!
//! Everything written into an output dataset goes through [`LocalDir`], which
//! only accepts paths relative to its root and validates them so generated
//! names can never escape the dataset.

use crate::error::{ErrorKind, Result};
use crate::path::validate as validate_path;
use exn::ResultExt;
use std::fs;
use std::path::{Path, PathBuf};

enum WalkEntry {
    File(PathBuf),
    Descend(PathBuf),
    Skip,
}

/// A directory on the local filesystem that relative paths are resolved
/// against.
///
/// # Examples
///
/// ```no_run
/// use d2b_storage::LocalDir;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let bids = LocalDir::new("/data/bids")?;
/// bids.write("sub-01/anat/sub-01_T1w.json", b"{}")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct LocalDir {
    root: PathBuf,
}
impl LocalDir {
    /// Opens (creating if necessary) a directory root.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute, or exists but is not a
    /// directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::InvalidPath(root));
            }
        } else {
            fs::create_dir_all(&root).map_err(|e| ErrorKind::io(e, &root))?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the absolute path for a relative path.
    ///
    /// Validates the path and joins it with the root directory.
    pub fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let validated = validate_path(path.as_ref())?;
        Ok(self.root.join(validated))
    }

    /// Convert an absolute path back to a path relative to the root.
    pub fn relative_path(&self, absolute: impl AsRef<Path>) -> Result<PathBuf> {
        let absolute = absolute.as_ref();
        if !absolute.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(absolute.to_path_buf()));
        }
        let relative =
            absolute.strip_prefix(&self.root).or_raise(|| ErrorKind::InvalidPath(absolute.to_path_buf()))?;
        validate_path(relative)
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> Result<bool> {
        let abs_path = self.absolute_path(path)?;
        Ok(abs_path.try_exists().map_err(ErrorKind::Io)?)
    }

    /// Writes `data`, creating parent directories as needed.
    pub fn write(&self, path: impl AsRef<Path>, data: &[u8]) -> Result<PathBuf> {
        let abs_path = self.absolute_path(&path)?;
        create_parent(&abs_path)?;
        fs::write(&abs_path, data).map_err(|e| ErrorKind::io(e, &abs_path))?;
        Ok(abs_path)
    }

    /// Moves a file from anywhere on disk to `to` (relative to the root).
    pub fn move_in(&self, from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<PathBuf> {
        let to_path = self.absolute_path(to)?;
        move_file(from, &to_path)?;
        Ok(to_path)
    }

    /// Lists every file below the root (or below `prefix`), as sorted paths
    /// relative to the root.
    pub fn list(&self, prefix: Option<&Path>) -> Result<Vec<PathBuf>> {
        let start = match prefix {
            Some(prefix) => self.absolute_path(prefix)?,
            None => self.root.clone(),
        };
        let mut files = Vec::new();
        for file in walk(&start)? {
            files.push(self.relative_path(&file)?);
        }
        Ok(files)
    }
}

/// Recursively lists every regular file below `dir` (absolute paths, sorted).
///
/// A directory that doesn't exist is treated as empty.
pub(crate) fn walk(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut stack = vec![dir.to_path_buf()];
    let mut files = Vec::new();
    while let Some(current) = stack.pop() {
        let entries = match fs::read_dir(&current) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
            Err(err) => exn::bail!(ErrorKind::io(err, &current)),
        };
        for entry in entries {
            let entry = entry.map_err(|e| ErrorKind::io(e, &current))?;
            match process_entry(&entry)? {
                WalkEntry::File(path) => files.push(path),
                WalkEntry::Descend(path) => stack.push(path),
                WalkEntry::Skip => {},
            }
        }
    }
    files.sort();
    Ok(files)
}

fn process_entry(entry: &fs::DirEntry) -> Result<WalkEntry> {
    let path = entry.path();
    // Follows symlinks, so linked input directories are walked too.
    let metadata = match fs::metadata(&path) {
        Ok(m) => m,
        // Note: silently drop what is most likely a broken symlink.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(WalkEntry::Skip),
        Err(e) => exn::bail!(ErrorKind::io(e, &path)),
    };
    if metadata.is_dir() {
        return Ok(WalkEntry::Descend(path));
    }
    if metadata.is_file() {
        return Ok(WalkEntry::File(path));
    }
    Ok(WalkEntry::Skip)
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ErrorKind::io(e, parent))?;
    }
    Ok(())
}

/// Moves a file, creating the destination's parent directories. Falls back
/// to copy-then-delete when a rename isn't possible (e.g. across devices).
pub fn move_file(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<()> {
    let (from, to) = (from.as_ref(), to.as_ref());
    create_parent(to)?;
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to).map_err(|e| ErrorKind::io(e, from))?;
    fs::remove_file(from).map_err(|e| ErrorKind::io(e, from))?;
    Ok(())
}

/// Copies the contents of `src` into `dst`, recursively, leaving files that
/// only exist in `dst` untouched. Returns the number of files copied.
pub fn sync_dir(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<usize> {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    if !src.is_dir() {
        exn::bail!(ErrorKind::NotFound(src.to_path_buf()));
    }
    let files = walk(src)?;
    for file in &files {
        let relative = file.strip_prefix(src).or_raise(|| ErrorKind::InvalidPath(file.clone()))?;
        let target = dst.join(relative);
        create_parent(&target)?;
        fs::copy(file, &target).map_err(|e| ErrorKind::io(e, file))?;
    }
    tracing::debug!(src = %src.display(), dst = %dst.display(), files = files.len(), "Synchronised directory");
    Ok(files.len())
}
