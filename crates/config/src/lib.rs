//! Configuration for d2b.
//!
//! Two separate concerns live here:
//!
//! - [`Settings`]: how the tool itself behaves (which converter to run, the
//!   default matching options), layered from defaults, config files and the
//!   environment.
//! - [`ConfigLoader`]: loading the per-study description configuration that
//!   says which converted files become which BIDS outputs.

pub mod error;
mod loader;
mod settings;

pub use self::loader::{ConfigLoader, DESCRIPTIONS_KEY, JsonConfigLoader, LoadedConfig};
pub use self::settings::{ConverterSettings, MatchSettings, SearchMethod, Settings};
