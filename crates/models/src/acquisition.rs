use crate::{Data, Description, Participant};
use d2b_storage::splitext;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// A source file paired with the description it matched, for one
/// participant.
///
/// Two acquisitions are equal when they target the same participant and
/// description, whichever file produced them.
#[derive(Debug, Clone)]
pub struct Acquisition {
    pub src_file: PathBuf,
    pub participant: Participant,
    pub description: Description,
    /// Metadata accumulated for the output sidecar (e.g. `IntendedFor`).
    pub data: Data,
}
impl Acquisition {
    pub fn new(src_file: impl Into<PathBuf>, participant: Participant, description: Description) -> Self {
        Self { src_file: src_file.into(), participant, description, data: Data::new() }
    }

    /// The source path with its imaging/metadata extension removed.
    pub fn src_root(&self) -> PathBuf {
        splitext(&self.src_file).0
    }

    /// Output path (relative to the dataset root) without an extension:
    /// `sub-1/[ses-1/]<datatype>/<prefix><labels><modality>`.
    pub fn dst_root(&self) -> PathBuf {
        self.dst(&self.description.suffix())
    }

    /// Like [`dst_root`](Self::dst_root), without the modality label.
    pub fn dst_root_no_modality(&self) -> PathBuf {
        self.dst(&self.description.suffix_no_modality())
    }

    /// `dst_root` relative to the participant's subject directory, so that
    /// references made from one session can point into another.
    pub fn dst_root_from_subject(&self) -> PathBuf {
        let dst_root = self.dst_root();
        let subject = self.participant.subject_directory();
        dst_root.strip_prefix(&subject).map(Path::to_path_buf).unwrap_or(dst_root)
    }

    fn dst(&self, suffix: &str) -> PathBuf {
        self.participant
            .directory()
            .join(self.description.data_type.as_str())
            .join(format!("{}{suffix}", self.participant.prefix()))
    }
}
impl PartialEq for Acquisition {
    fn eq(&self, other: &Self) -> bool {
        self.participant == other.participant && self.description == other.description
    }
}
impl Eq for Acquisition {}
impl Hash for Acquisition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.participant.hash(state);
        self.description.hash(state);
    }
}
