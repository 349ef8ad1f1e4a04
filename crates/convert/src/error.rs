//! Converter Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A converter error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for converter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The converter program isn't installed (or isn't on `PATH`).
    #[display("converter program not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// The converter program exists but could not be started.
    #[display("could not start converter: {}", _0.display())]
    Spawn(#[error(not(source))] PathBuf),
    /// The output directory could not be prepared.
    #[display("could not create converter output directory: {}", _0.display())]
    Output(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Spawn(_))
    }
}
