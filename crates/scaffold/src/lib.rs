//! Creates the skeleton of a new BIDS dataset.

mod assets;
mod description;
pub mod error;

pub use crate::assets::Templates;
pub use crate::description::{BIDS_VERSION, DatasetDescription};

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fs;
use std::path::{Path, PathBuf};

const DIRECTORIES: &[&str] = &["code", "derivatives"];

/// Scaffolds a dataset in `dir` (created if needed).
///
/// Writes `dataset_description.json`, `README`, `CHANGES`,
/// `participants.json` and `participants.tsv` and creates the `code/` and
/// `derivatives/` directories. Existing files are left untouched, so
/// scaffolding an existing dataset is safe.
///
/// Returns the files that were created.
#[tracing::instrument(skip_all, fields(dir = %dir.as_ref().display()))]
pub fn scaffold(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let name = dir.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    for sub in DIRECTORIES {
        let path = dir.join(sub);
        fs::create_dir_all(&path).or_raise(|| ErrorKind::Io(path.clone()))?;
    }

    let mut created = Vec::new();
    let path = dir.join("dataset_description.json");
    if !path.exists() {
        let description =
            DatasetDescription { name: name.to_string(), bids_version: BIDS_VERSION.to_string(), ..Default::default() };
        description.to_path(&path)?;
        created.push(path);
    }

    let today = time::OffsetDateTime::now_utc().date().to_string();
    let files = [
        ("README", Templates::render("README", upon::value! { name: name })?),
        ("CHANGES", Templates::render("CHANGES", upon::value! { date: today })?),
        ("participants.json", Templates::load("participants.json")?),
        ("participants.tsv", Templates::load("participants.tsv")?),
    ];
    for (file, contents) in files {
        let path = dir.join(file);
        if path.exists() {
            tracing::debug!(file, "keeping existing file");
            continue;
        }
        fs::write(&path, contents).or_raise(|| ErrorKind::Io(path.clone()))?;
        created.push(path);
    }
    tracing::info!(created = created.len(), "scaffolded dataset");
    Ok(created)
}
