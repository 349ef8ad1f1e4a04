//! Writes one acquisition into the output dataset.

use crate::error::{ErrorKind, Result};
use crate::resolve::PayloadProbe;
use crate::warning::{Warning, Warnings};
use d2b_models::{Acquisition, Data};
use d2b_storage::{LocalDir, siblings, splitext, validate_path};
use exn::ResultExt;
use serde_json::Value;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Sidecar field recording the version of the tool that wrote it.
pub const VERSION_KEY: &str = "D2bVersion";

/// Moves the acquisition's files into `out` and writes its sidecar.
///
/// Every file sharing the source file root (`<root>.*`) apart from the source
/// sidecar is moved to `<dst_root><ext>`: the imaging payload along with any
/// extras such as `.bval`/`.bvec`. The output sidecar is the source sidecar
/// overlaid with the description's `sidecar_changes`, then the acquisition's
/// own `data`, then [`VERSION_KEY`].
///
/// An acquisition without an imaging payload still gets its sidecar; a
/// [`Warning::MissingPayload`] is raised.
///
/// Returns the written paths, sidecar last.
#[tracing::instrument(skip_all, fields(file = %acquisition.src_file.display()))]
pub fn materialize(
    out: &LocalDir,
    acquisition: &Acquisition,
    probe: &dyn PayloadProbe,
    version: &str,
    warnings: &mut Warnings,
) -> Result<Vec<PathBuf>> {
    let src_file = &acquisition.src_file;
    let failed = || ErrorKind::Materialize(src_file.clone());
    let dst_root = validate_path(acquisition.dst_root()).or_raise(failed)?;

    if probe.probe(src_file).is_none() {
        warnings.emit(Warning::MissingPayload { file: src_file.clone() });
    }

    let src_root = acquisition.src_root();
    let mut written = Vec::new();
    for sibling in siblings(src_file).or_raise(failed)? {
        if &sibling == src_file {
            continue;
        }
        let (root, ext) = splitext(&sibling);
        if root != src_root {
            continue;
        }
        let target = out.move_in(&sibling, with_extension(&dst_root, &ext)).or_raise(failed)?;
        tracing::debug!(from = %sibling.display(), to = %target.display(), "moved file");
        written.push(target);
    }

    let mut sidecar = read_sidecar(src_file).or_raise(failed)?;
    merge(&mut sidecar, &acquisition.description.sidecar_changes);
    merge(&mut sidecar, &acquisition.data);
    sidecar.insert(VERSION_KEY.to_string(), Value::from(version));
    let mut contents = serde_json::to_vec_pretty(&sidecar).or_raise(failed)?;
    contents.push(b'\n');
    let target = out.write(with_extension(&dst_root, ".json"), &contents).or_raise(failed)?;
    tracing::info!(sidecar = %target.display(), "wrote acquisition");
    written.push(target);
    Ok(written)
}

fn read_sidecar(path: &Path) -> Result<Data> {
    let bytes = std::fs::read(path).or_raise(|| ErrorKind::Sidecar(path.to_path_buf()))?;
    match serde_json::from_slice(&bytes).or_raise(|| ErrorKind::Sidecar(path.to_path_buf()))? {
        Value::Object(map) => Ok(map),
        _ => exn::bail!(ErrorKind::Sidecar(path.to_path_buf())),
    }
}

/// Shallow overlay: top-level keys of `changes` replace those in `target`.
fn merge(target: &mut Data, changes: &Data) {
    for (key, value) in changes {
        target.insert(key.clone(), value.clone());
    }
}

fn with_extension(root: &Path, ext: &str) -> PathBuf {
    let mut path = OsString::from(root.as_os_str());
    path.push(ext);
    PathBuf::from(path)
}

/// Removes acquisitions of different descriptions that would be written to
/// the same destination, raising one [`Warning::DestinationCollision`] per
/// shared destination. The rest keep their order.
pub fn drop_collisions(acquisitions: Vec<Acquisition>, warnings: &mut Warnings) -> Vec<Acquisition> {
    let mut destinations: BTreeMap<PathBuf, Vec<usize>> = BTreeMap::new();
    for (position, acquisition) in acquisitions.iter().enumerate() {
        destinations.entry(acquisition.dst_root()).or_default().push(position);
    }
    let mut colliding = vec![false; acquisitions.len()];
    for (dst_root, positions) in destinations {
        if positions.len() < 2 {
            continue;
        }
        for &position in &positions {
            colliding[position] = true;
        }
        warnings.emit(Warning::DestinationCollision {
            dst_root,
            files: positions.iter().map(|&p| acquisitions[p].src_file.clone()).collect(),
            indices: positions.iter().map(|&p| acquisitions[p].description.index).collect(),
        });
    }
    acquisitions.into_iter().zip(colliding).filter_map(|(acquisition, skip)| (!skip).then_some(acquisition)).collect()
}
