//! The end-to-end run for one participant/session.

use crate::criteria::CriteriaPredicate;
use crate::discover::discover;
use crate::error::{ErrorKind, Result};
use crate::materialize::{drop_collisions, materialize};
use crate::matcher::{MatchPredicate, Matcher};
use crate::resolve::{IntendedForResolver, NiftiProbe, PayloadProbe};
use crate::warning::{Warning, Warnings};
use d2b_config::{ConfigLoader, JsonConfigLoader, LoadedConfig};
use d2b_convert::{Converter, NoConverter};
use d2b_models::{Acquisition, Data, Participant};
use d2b_storage::LocalDir;
use exn::ResultExt;
use std::path::PathBuf;

/// Version written into every output sidecar.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const SCRATCH_PREFIX: &str = ".d2b-";

/// What a run produced.
#[derive(Debug, Default)]
pub struct Report {
    /// Acquisitions that were written, after resolution.
    pub acquisitions: Vec<Acquisition>,
    /// Every file written below the output directory.
    pub written: Vec<PathBuf>,
    /// Recoverable conditions, in the order they were raised.
    pub warnings: Vec<Warning>,
}

/// Organises the converted scans of one participant (and session) into a
/// BIDS dataset.
///
/// A run is strictly linear: load the description configuration, stage and
/// convert the inputs in a scratch directory, match, set aside acquisitions
/// sharing a destination, resolve `IntendedFor`, then write every
/// acquisition. The scratch directory lives inside the
/// output directory and is removed when the run ends, successfully or not.
///
/// By default descriptions are read with [`JsonConfigLoader`], inputs are not
/// converted ([`NoConverter`]), files are matched with [`CriteriaPredicate`]
/// and payloads are found with [`NiftiProbe`].
pub struct D2b {
    participant: Participant,
    config_file: PathBuf,
    in_dirs: Vec<PathBuf>,
    out_dir: PathBuf,
    options: Data,
    loader: Box<dyn ConfigLoader>,
    converter: Box<dyn Converter>,
    predicates: Vec<Box<dyn MatchPredicate>>,
    probe: Box<dyn PayloadProbe>,
    version: String,
}
impl D2b {
    pub fn new(
        participant: Participant,
        config_file: impl Into<PathBuf>,
        in_dirs: impl IntoIterator<Item = impl Into<PathBuf>>,
        out_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            participant,
            config_file: config_file.into(),
            in_dirs: in_dirs.into_iter().map(Into::into).collect(),
            out_dir: out_dir.into(),
            options: Data::new(),
            loader: Box::new(JsonConfigLoader),
            converter: Box::new(NoConverter),
            predicates: vec![Box::new(CriteriaPredicate)],
            probe: Box::new(NiftiProbe),
            version: VERSION.to_string(),
        }
    }

    /// Match options forwarded verbatim to every predicate.
    pub fn with_options(mut self, options: Data) -> Self {
        self.options = options;
        self
    }

    pub fn with_loader(mut self, loader: impl ConfigLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn with_converter(mut self, converter: impl Converter + 'static) -> Self {
        self.converter = Box::new(converter);
        self
    }

    /// Replaces the default predicate.
    pub fn with_predicate(mut self, predicate: impl MatchPredicate + 'static) -> Self {
        self.predicates = vec![Box::new(predicate)];
        self
    }

    /// Adds a predicate alongside the existing ones.
    pub fn add_predicate(mut self, predicate: impl MatchPredicate + 'static) -> Self {
        self.predicates.push(Box::new(predicate));
        self
    }

    pub fn with_probe(mut self, probe: impl PayloadProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn participant(&self) -> &Participant {
        &self.participant
    }

    /// Loads the description configuration.
    pub fn load_config(&self) -> Result<LoadedConfig> {
        self.loader.load(&self.config_file).or_raise(|| ErrorKind::Config)
    }

    #[tracing::instrument(skip_all, fields(participant = %self.participant))]
    pub fn run(&self) -> Result<Report> {
        let loaded = self.load_config()?;
        let mut warnings = Warnings::new();

        let out_dir = std::path::absolute(&self.out_dir).or_raise(|| ErrorKind::Discovery)?;
        let out = LocalDir::new(&out_dir).or_raise(|| ErrorKind::Discovery)?;
        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(out.root())
            .or_raise(|| ErrorKind::Discovery)?;

        let files = discover(scratch.path(), &self.in_dirs, &*self.converter)?;
        tracing::info!(candidates = files.len(), "discovery complete");

        let matcher = Matcher::new(&self.predicates, &loaded.config, &self.options);
        let acquisitions = matcher.find_acquisitions(&files, &self.participant, &loaded.descriptions, &mut warnings)?;
        if acquisitions.is_empty() {
            warnings.emit(Warning::NoMatches);
            return Ok(Report { warnings: warnings.into_vec(), ..Report::default() });
        }
        tracing::info!(acquisitions = acquisitions.len(), "matching complete");

        let mut acquisitions = drop_collisions(acquisitions, &mut warnings);

        IntendedForResolver::new(&*self.probe).resolve(&mut acquisitions, &mut warnings)?;

        let mut written = Vec::new();
        for acquisition in &acquisitions {
            written.extend(materialize(&out, acquisition, &*self.probe, &self.version, &mut warnings)?);
        }

        if let Err(err) = scratch.close() {
            tracing::warn!(error = %err, "could not remove scratch directory");
        }
        Ok(Report { acquisitions, written, warnings: warnings.into_vec() })
    }
}
