//! Pipeline Error Types
//!
//! Everything in here is fatal for a run. Per-file and per-acquisition
//! conditions that the run can recover from are [`Warning`](crate::Warning)s
//! instead.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A pipeline error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// ### Configuration Errors
/// - [`ErrorKind::Config`]
/// - [`ErrorKind::InvalidPattern`]
/// - [`ErrorKind::InvalidOption`]
/// - [`ErrorKind::UnsupportedReference`]
///
/// ### Dependency Errors
/// - [`ErrorKind::Predicate`]
/// - [`ErrorKind::Sidecar`]
/// - [`ErrorKind::Converter`]
/// - [`ErrorKind::Discovery`]
/// - [`ErrorKind::Materialize`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The description configuration could not be loaded.
    #[display("could not load description configuration")]
    Config,
    /// A match predicate failed while evaluating a file against a description.
    #[display("match predicate failed for description [{index}] and file [{}]", file.display())]
    Predicate {
        /// The candidate sidecar.
        file: PathBuf,
        /// The description's index.
        index: usize,
    },
    /// A criterion pattern isn't a valid expression for its search method.
    #[display("invalid criterion pattern: {_0:?}")]
    InvalidPattern(#[error(not(source))] String),
    /// A match option has an unusable value.
    #[display("invalid match option: {_0}")]
    InvalidOption(#[error(not(source))] String),
    /// A source sidecar is unreadable or isn't a JSON object.
    #[display("invalid sidecar: {}", _0.display())]
    Sidecar(#[error(not(source))] PathBuf),
    /// An `IntendedFor` reference is neither a description index nor an id.
    #[display("unsupported IntendedFor reference: {_0}")]
    UnsupportedReference(#[error(not(source))] String),
    /// The converter could not be run.
    Converter,
    /// Input directories could not be staged or scanned.
    Discovery,
    /// Output for the acquisition derived from this file could not be written.
    #[display("could not materialize acquisition derived from file [{}]", _0.display())]
    Materialize(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Converter | Self::Discovery | Self::Materialize(_))
    }
}
