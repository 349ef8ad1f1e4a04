//! Value types shared by every stage of the d2b pipeline.
//!
//! - [`FilenameEntities`]: the `key-value_key-value` naming units of a BIDS
//!   filename.
//! - [`Description`]: a user-declared output rule.
//! - [`Participant`]: the subject/session being organised.
//! - [`Acquisition`]: a source file matched to a description, plus the
//!   metadata accumulated for its output sidecar.

mod acquisition;
mod datatype;
mod description;
mod entities;
pub mod error;
mod participant;

pub use self::acquisition::Acquisition;
pub use self::datatype::DataType;
pub use self::description::{Description, keys};
pub use self::entities::{ENTITY_ORDER, FilenameEntities};
pub use self::participant::Participant;

/// Open-ended, ordered, dynamically-typed key/value bag.
pub type Data = serde_json::Map<String, serde_json::Value>;

/// Strips every character that isn't an ASCII letter or digit.
fn sanitize(s: impl AsRef<str>) -> String {
    s.as_ref().chars().filter(char::is_ascii_alphanumeric).collect()
}
