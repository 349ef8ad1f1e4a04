//! Command line arguments.

use clap::{ArgAction, Args, Parser, Subcommand};
use d2b_config::SearchMethod;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "d2b", version, about = "Organise converted scan sessions into a BIDS dataset")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert and organise one participant's session into the output dataset
    Run(RunArgs),
    /// Create the skeleton of a new BIDS dataset
    Scaffold(ScaffoldArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Description configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: PathBuf,

    /// Participant label, with or without the `sub-` prefix
    #[arg(short, long, value_name = "LABEL")]
    pub participant: String,

    /// Session label, with or without the `ses-` prefix
    #[arg(short, long, value_name = "LABEL")]
    pub session: Option<String>,

    /// Root of the BIDS dataset to write into
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: PathBuf,

    /// Tool settings file, merged over the user settings
    #[arg(long, value_name = "FILE", env = "D2B_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Treat the input directories as already converted
    #[arg(long)]
    pub no_convert: bool,

    /// How string criteria are compared
    #[arg(long, value_name = "METHOD")]
    pub search_method: Option<SearchMethod>,

    /// Compare glob criteria case-sensitively
    #[arg(long)]
    pub case_sensitive: bool,

    /// Directories holding the raw session files
    #[arg(value_name = "IN_DIR", required = true)]
    pub in_dirs: Vec<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ScaffoldArgs {
    /// Dataset directory, created if missing
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,
}
