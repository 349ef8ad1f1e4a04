//! Configuration Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration loading.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories. Every variant is fatal for a run: the
/// configuration has to be fixed before anything can be organised.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The configuration file could not be read.
    #[display("cannot read configuration file: {}", _0.display())]
    Unreadable(#[error(not(source))] PathBuf),
    /// The configuration file isn't valid JSON.
    #[display("invalid JSON in configuration file: {}", _0.display())]
    Syntax(#[error(not(source))] PathBuf),
    /// The configuration is valid JSON but doesn't have the expected layout.
    #[display("invalid configuration: {_0}")]
    Structure(#[error(not(source))] String),
    /// One of the description entries was rejected.
    #[display("invalid description at index {_0}")]
    Description(#[error(not(source))] usize),
    /// Layered tool settings could not be extracted.
    #[display("invalid settings")]
    Settings,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unreadable(_))
    }
}
