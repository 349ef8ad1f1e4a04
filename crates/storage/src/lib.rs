//! Filesystem plumbing for d2b.
//!
//! - [`splitext`] and [`validate_path`] for path arithmetic,
//! - [`ImageFormat`] for locating the imaging payload that belongs to a
//!   sidecar,
//! - [`LocalDir`] for rooted, traversal-safe file operations,
//! - [`digest_file`] and [`sync_dir`] for discovery.

pub mod error;
mod fs;
mod hash;
mod image;
mod path;

pub use crate::fs::{LocalDir, move_file, sync_dir};
pub use crate::hash::{digest, digest_file};
pub use crate::image::{ImageFormat, first_image};
pub use crate::path::{COMPOUND_EXTENSIONS, siblings, splitext, splitext_with, validate as validate_path};
