//! Stages input directories in a scratch area, converts them and collects
//! the resulting sidecars as match candidates.

use crate::error::{ErrorKind, Result};
use d2b_convert::Converter;
use d2b_storage::{LocalDir, digest_file, splitext, sync_dir};
use exn::ResultExt;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const SIDECAR_EXTENSION: &str = ".json";

/// Stages each input directory under `scratch/NNN/input`, runs `converter`
/// into `scratch/NNN/converted`, then returns the candidates found in the
/// whole scratch area. See [`candidates`].
#[tracing::instrument(skip_all, fields(inputs = inputs.len()))]
pub fn discover(scratch: &Path, inputs: &[PathBuf], converter: &dyn Converter) -> Result<Vec<PathBuf>> {
    for (i, input) in inputs.iter().enumerate() {
        let work = scratch.join(format!("{i:03}"));
        let staged = work.join("input");
        let copied = sync_dir(input, &staged).or_raise(|| ErrorKind::Discovery)?;
        tracing::info!(input = %input.display(), files = copied, "staged input directory");
        converter.convert(&staged, &work.join("converted")).or_raise(|| ErrorKind::Converter)?;
    }
    candidates(scratch)
}

/// Every `.json` file below `dir`, in sorted order, skipping files whose
/// contents were already seen.
pub fn candidates(dir: &Path) -> Result<Vec<PathBuf>> {
    let root = LocalDir::new(dir).or_raise(|| ErrorKind::Discovery)?;
    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for relative in root.list(None).or_raise(|| ErrorKind::Discovery)? {
        if splitext(&relative).1 != SIDECAR_EXTENSION {
            continue;
        }
        let file = root.root().join(&relative);
        let digest = digest_file(&file).or_raise(|| ErrorKind::Discovery)?;
        if !seen.insert(digest) {
            tracing::debug!(file = %relative.display(), "skipping duplicate sidecar");
            continue;
        }
        files.push(file);
    }
    tracing::debug!(candidates = files.len(), "discovered sidecars");
    Ok(files)
}
