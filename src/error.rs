//! Application Error Types

use derive_more::{Display, Error};

/// An application error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for the command line entry points.
pub type Result<T> = std::result::Result<T, Error>;

/// What the command was doing when it failed.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load settings")]
    Settings,
    #[display("invalid participant or session")]
    Participant,
    #[display("could not set up the converter")]
    Converter,
    #[display("run failed")]
    Run,
    #[display("could not scaffold dataset")]
    Scaffold,
}
