mod cli;
mod error;

use crate::cli::{Cli, Command, RunArgs, ScaffoldArgs};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use d2b_config::Settings;
use d2b_convert::Dcm2niix;
use d2b_models::Participant;
use d2b_pipeline::D2b;
use exn::ResultExt;
use serde_json::Value;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let result = match cli.command {
        Command::Run(args) => run(args),
        Command::Scaffold(args) => scaffold(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:?}");
            ExitCode::FAILURE
        },
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(args: RunArgs) -> Result<()> {
    let settings = Settings::load(args.settings.as_deref()).or_raise(|| ErrorKind::Settings)?;
    let participant = match &args.session {
        Some(session) => Participant::with_session(&args.participant, session),
        None => Participant::new(&args.participant),
    }
    .or_raise(|| ErrorKind::Participant)?;

    let mut options = settings.matching.to_options();
    if let Some(method) = args.search_method {
        options.insert("search_method".into(), Value::from(method.as_str()));
    }
    if args.case_sensitive {
        options.insert("case_sensitive".into(), Value::Bool(true));
    }

    let mut d2b = D2b::new(participant, args.config, args.in_dirs, args.out_dir).with_options(options);
    if settings.converter.enabled && !args.no_convert {
        let converter = Dcm2niix::discover(&settings.converter.program, settings.converter.args)
            .or_raise(|| ErrorKind::Converter)?;
        d2b = d2b.with_converter(converter);
    }
    let report = d2b.run().or_raise(|| ErrorKind::Run)?;
    tracing::info!(
        participant = %d2b.participant(),
        acquisitions = report.acquisitions.len(),
        files = report.written.len(),
        warnings = report.warnings.len(),
        "done",
    );
    Ok(())
}

fn scaffold(args: ScaffoldArgs) -> Result<()> {
    let created = d2b_scaffold::scaffold(&args.dir).or_raise(|| ErrorKind::Scaffold)?;
    for path in created {
        println!("{}", path.display());
    }
    Ok(())
}
