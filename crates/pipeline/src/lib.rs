//! Organises converted scan sessions into a BIDS dataset.
//!
//! The stages, in run order:
//!
//! 1. [`discover`]: stage and convert the inputs, collect candidate sidecars.
//! 2. [`Matcher`]: pair candidates with descriptions via [`MatchPredicate`]s.
//! 3. [`drop_collisions`]: skip acquisitions that would overwrite each other.
//! 4. [`IntendedForResolver`]: turn `IntendedFor` references into paths.
//! 5. [`materialize`]: move payloads and write sidecars into the dataset.
//!
//! [`D2b`] ties them together for one participant/session.

mod criteria;
mod discover;
pub mod error;
mod materialize;
mod matcher;
mod resolve;
mod run;
mod warning;

pub use self::criteria::{CRITERIA_KEY, CriteriaPredicate, SIDECAR_FILENAME, compare};
pub use self::discover::{candidates, discover};
pub use self::materialize::{VERSION_KEY, drop_collisions, materialize};
pub use self::matcher::{FnPredicate, MatchPredicate, Matcher, from_fn};
pub use self::resolve::{INTENDED_FOR, IntendedForResolver, NiftiProbe, PayloadProbe};
pub use self::run::{D2b, Report, VERSION};
pub use self::warning::{Warning, Warnings};
