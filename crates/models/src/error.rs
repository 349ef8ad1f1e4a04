//! Model Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. All of these are raised at construction time and mean
//! the input (usually user configuration) needs fixing.

use derive_more::{Display, Error};

/// A model error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for model construction.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// An entity token had no `key-value` separator.
    #[display("malformed entity token: {_0:?}")]
    MalformedEntity(#[error(not(source))] String),
    /// The data type is not one of the recognised modality categories.
    #[display("invalid data type: {_0:?}")]
    InvalidDataType(#[error(not(source))] String),
    /// The participant label is empty or not alphanumeric.
    #[display("invalid participant label: {_0:?}")]
    InvalidParticipant(#[error(not(source))] String),
    /// The session label is not alphanumeric.
    #[display("invalid session label: {_0:?}")]
    InvalidSession(#[error(not(source))] String),
    /// A description field was present but had the wrong shape.
    #[display("invalid description field '{field}', found value: {value}")]
    InvalidField {
        /// The external key name of the field.
        field: &'static str,
        /// The offending value, serialized.
        value: String,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Construction is pure: the input is either valid or it isn't.
        false
    }
}
