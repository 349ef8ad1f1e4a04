//! Turns declared `IntendedFor` references into output paths.

use crate::error::{ErrorKind, Result};
use crate::warning::{Warning, Warnings};
use d2b_models::Acquisition;
use d2b_storage::ImageFormat;
use serde_json::Value;
use std::path::Path;

/// Key the resolved paths are stored under in [`Acquisition::data`].
pub const INTENDED_FOR: &str = "IntendedFor";

/// Finds the imaging payload belonging to a source sidecar.
pub trait PayloadProbe {
    /// The payload's extension (e.g. `.nii.gz`), or `None` if there is no
    /// payload.
    fn probe(&self, src_file: &Path) -> Option<String>;
}
impl<T: PayloadProbe + ?Sized> PayloadProbe for &T {
    fn probe(&self, src_file: &Path) -> Option<String> {
        (**self).probe(src_file)
    }
}

/// Looks for a `.nii` or `.nii.gz` file next to the sidecar.
#[derive(Debug, Clone, Copy, Default)]
pub struct NiftiProbe;
impl PayloadProbe for NiftiProbe {
    fn probe(&self, src_file: &Path) -> Option<String> {
        ImageFormat::probe(src_file).map(|format| format.extension().to_string())
    }
}

enum Reference<'a> {
    Index(usize),
    Id(&'a str),
}
impl<'a> Reference<'a> {
    fn parse(value: &'a Value) -> Result<Self> {
        match value {
            Value::Number(n) => match n.as_u64().and_then(|n| usize::try_from(n).ok()) {
                Some(index) => Ok(Reference::Index(index)),
                None => exn::bail!(ErrorKind::UnsupportedReference(value.to_string())),
            },
            Value::String(id) => Ok(Reference::Id(id)),
            other => exn::bail!(ErrorKind::UnsupportedReference(other.to_string())),
        }
    }

    fn targets(&self, acquisition: &Acquisition) -> bool {
        match self {
            Reference::Index(index) => acquisition.description.index == *index,
            Reference::Id(id) => acquisition.description.id() == Some(*id),
        }
    }
}

/// Resolves each acquisition's declared `IntendedFor` references into paths
/// (relative to the subject directory) of the targets' imaging payloads.
///
/// References are description indices or description `id`s, alone or in a
/// list. A reference with no matching acquisition contributes nothing; one
/// whose target has no payload contributes nothing and raises
/// [`Warning::MissingTargetPayload`]. A single declared scalar is stored as a
/// single string, anything else as a list. When nothing resolves the field
/// is left unset.
pub struct IntendedForResolver<P> {
    probe: P,
}
impl Default for IntendedForResolver<NiftiProbe> {
    fn default() -> Self {
        Self::new(NiftiProbe)
    }
}
impl<P: PayloadProbe> IntendedForResolver<P> {
    pub fn new(probe: P) -> Self {
        Self { probe }
    }

    /// # Errors
    /// Raises [`ErrorKind::UnsupportedReference`] (aborting the whole
    /// resolution) if a reference isn't an index or an id.
    #[tracing::instrument(skip_all, fields(acquisitions = acquisitions.len()))]
    pub fn resolve<'a>(
        &self,
        acquisitions: &'a mut [Acquisition],
        warnings: &mut Warnings,
    ) -> Result<&'a mut [Acquisition]> {
        for position in 0..acquisitions.len() {
            let Some(declared) = acquisitions[position].description.intended_for.as_ref() else {
                continue;
            };
            let (references, scalar) = match declared {
                Value::Array(items) => (items.iter().collect::<Vec<_>>(), false),
                other => (vec![other], true),
            };
            let mut paths = Vec::new();
            for value in references.iter().copied() {
                let reference = Reference::parse(value)?;
                let target = acquisitions
                    .iter()
                    .enumerate()
                    .find(|(other, acquisition)| *other != position && reference.targets(acquisition))
                    .map(|(_, acquisition)| acquisition);
                let Some(target) = target else {
                    tracing::debug!(reference = %value, "no acquisition for IntendedFor reference");
                    continue;
                };
                match self.probe.probe(&target.src_file) {
                    Some(ext) => paths.push(format!("{}{ext}", target.dst_root_from_subject().display())),
                    None => warnings.emit(Warning::MissingTargetPayload { file: target.src_file.clone() }),
                }
            }
            let resolved = match (paths.len(), scalar) {
                (0, _) => None,
                (1, true) => paths.pop().map(Value::from),
                _ => Some(Value::from(paths)),
            };
            let data = &mut acquisitions[position].data;
            match resolved {
                Some(value) => data.insert(INTENDED_FOR.to_string(), value),
                None => data.remove(INTENDED_FOR),
            };
        }
        Ok(acquisitions)
    }
}
