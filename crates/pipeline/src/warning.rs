use d2b_models::DataType;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};

/// A recoverable condition. The run skips the affected item and carries on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A file matched more than one description, so it produces no output.
    AmbiguousMatch {
        file: PathBuf,
        /// `(index, data type, modality label)` of every matching description.
        descriptions: Vec<(usize, DataType, String)>,
    },
    /// Acquisitions of different descriptions would be written to the same
    /// destination; none of them produce output.
    DestinationCollision { dst_root: PathBuf, files: Vec<PathBuf>, indices: Vec<usize> },
    /// An `IntendedFor` target exists but has no imaging payload to point at.
    MissingTargetPayload { file: PathBuf },
    /// An acquisition has no imaging payload; only its sidecar is written.
    MissingPayload { file: PathBuf },
    /// Nothing matched; nothing is written.
    NoMatches,
}
impl Display for Warning {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Warning::AmbiguousMatch { file, descriptions } => {
                let indices: Vec<usize> = descriptions.iter().map(|(index, ..)| *index).collect();
                write!(
                    f,
                    "file [{}] matched [{}] descriptions. Skipping. Matching descriptions {indices:?}",
                    name(file),
                    descriptions.len(),
                )?;
                for (index, data_type, modality) in descriptions {
                    write!(f, "\n  description [{index}] dataType [{data_type}] modality [{modality}]")?;
                }
                Ok(())
            },
            Warning::DestinationCollision { dst_root, files, indices } => {
                let files: Vec<&str> = files.iter().map(|file| name(file)).collect();
                write!(
                    f,
                    "descriptions {indices:?} all resolve to [{}] (files {files:?}). Skipping.",
                    dst_root.display(),
                )
            },
            Warning::MissingTargetPayload { file } => {
                write!(f, "No NIfTI file associated with file [{}].", name(file))
            },
            Warning::MissingPayload { file } => {
                write!(f, "No associated nii found for acquisition derived from file [{}]", name(file))
            },
            Warning::NoMatches => f.write_str("NO DESCRIPTIONS MATCHED ANY FILES"),
        }
    }
}

fn name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

/// Collects [`Warning`]s, logging each one as it is raised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Warnings(Vec<Warning>);
impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, warning: Warning) {
        tracing::warn!("{warning}");
        self.0.push(warning);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.0
    }
}
