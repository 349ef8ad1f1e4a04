//! Scaffold Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A scaffold error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for scaffold operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A file or directory could not be read or written.
    #[display("I/O error at: {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
    /// A dataset description isn't valid JSON of the expected shape.
    #[display("invalid dataset description")]
    InvalidDescription,
    /// An embedded template is missing or failed to render.
    #[display("could not render template: {_0}")]
    Template(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
