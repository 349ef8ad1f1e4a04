//! Imaging payload detection.
//!
//! A converted acquisition is a metadata sidecar (`.json`) next to a NIfTI
//! payload that shares its file root. The payload may or may not be gzipped,
//! so it has to be probed for on disk.

use crate::path::splitext;
use std::ffi::OsStr;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A recognised imaging payload format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// Uncompressed NIfTI (.nii)
    Nifti,
    /// Gzip-compressed NIfTI (.nii.gz)
    NiftiGz,
}
impl ImageFormat {
    /// Returns the file extension for this format, including the leading dot.
    #[inline]
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Nifti => ".nii",
            ImageFormat::NiftiGz => ".nii.gz",
        }
    }

    /// Returns the short name (for displaying to user).
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Nifti => "nifti",
            ImageFormat::NiftiGz => "nifti-gz",
        }
    }

    /// Detect the format from a file extension.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let (_, ext) = splitext(path);
        ext.parse().ok()
    }

    /// Returns the format of the first imaging payload sharing a file root
    /// with `path`, or `None` if there isn't one. See [`first_image`].
    pub fn probe(path: impl AsRef<Path>) -> Option<Self> {
        first_image(path).and_then(Self::from_path)
    }
}
impl FromStr for ImageFormat {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().trim_start_matches('.') {
            "nii" => Ok(ImageFormat::Nifti),
            "nii.gz" => Ok(ImageFormat::NiftiGz),
            _ => Err(()),
        }
    }
}
impl Display for ImageFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Returns the first (sorted) `.nii` or `.nii.gz` file that shares a file
/// root with `path`. When both exist, `.nii` sorts first.
///
/// `path` itself does not need to exist; `t`, `t.json` and `t.nii.gz` all
/// probe for `t.nii` and `t.nii.gz`.
pub fn first_image(path: impl AsRef<Path>) -> Option<PathBuf> {
    let (root, _) = splitext(path);
    let stem = root.file_name().and_then(OsStr::to_str)?;
    let mut candidates: Vec<PathBuf> = [ImageFormat::Nifti, ImageFormat::NiftiGz]
        .iter()
        .map(|format| root.with_file_name(format!("{stem}{}", format.extension())))
        .filter(|candidate| candidate.is_file())
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ImageFormat::Nifti, ".nii")]
    #[case(ImageFormat::NiftiGz, ".nii.gz")]
    fn test_extension(#[case] format: ImageFormat, #[case] expected: &str) {
        assert_eq!(format.extension(), expected);
    }

    #[rstest]
    #[case("a/b.nii", Some(ImageFormat::Nifti))]
    #[case("a/b.nii.gz", Some(ImageFormat::NiftiGz))]
    #[case("a/b.NII.GZ", None)]
    #[case("a/b.json", None)]
    #[case("a/b", None)]
    fn test_from_path(#[case] path: &str, #[case] expected: Option<ImageFormat>) {
        assert_eq!(ImageFormat::from_path(path), expected);
    }

    #[rstest]
    #[case(&["t.nii.gz"], "t.nii.gz", Some(".nii.gz"))]
    #[case(&["t.nii.gz"], "t.json", Some(".nii.gz"))]
    #[case(&["t.nii.gz"], "t", Some(".nii.gz"))]
    #[case(&["t.nii"], "t.nii.gz", Some(".nii"))]
    #[case(&["t.nii"], "t.json", Some(".nii"))]
    #[case(&["t.nii"], "t", Some(".nii"))]
    #[case(&["t.json", "t.nii.gz"], "t.json", Some(".nii.gz"))]
    #[case(&["t.json", "t.nii"], "t.json", Some(".nii"))]
    #[case(&["t.nii", "t.nii.gz"], "t.json", Some(".nii"))]
    #[case(&["a.nii.gz"], "t.nii.gz", None)]
    #[case(&["a.json", "a.nii.gz"], "t.nii", None)]
    #[case(&["a.json", "a.nii.gz"], "t", None)]
    #[case(&["t.json"], "t.json", None)]
    fn test_probe(#[case] files: &[&str], #[case] probe: &str, #[case] expected: Option<&str>) {
        let dir = tempfile::tempdir().unwrap();
        for name in files {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let found = ImageFormat::probe(dir.path().join(probe));
        assert_eq!(found.map(|f| f.extension()), expected);
    }
}
