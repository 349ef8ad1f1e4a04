//! Pairs candidate sidecar files with the descriptions they satisfy.

use crate::error::{ErrorKind, Result};
use crate::warning::{Warning, Warnings};
use d2b_models::{Acquisition, Data, Description, Participant};
use exn::ResultExt;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Decides whether a file satisfies a description.
///
/// `config` is the whole description configuration and `options` the
/// run-wide match options; neither is interpreted by the [`Matcher`].
pub trait MatchPredicate {
    fn matches(&self, file: &Path, description: &Description, config: &Data, options: &Data) -> Result<bool>;
}

/// A [`MatchPredicate`] backed by a closure. See [`from_fn`].
pub struct FnPredicate<F>(F);
impl<F> MatchPredicate for FnPredicate<F>
where
    F: Fn(&Path, &Description, &Data, &Data) -> Result<bool>,
{
    fn matches(&self, file: &Path, description: &Description, config: &Data, options: &Data) -> Result<bool> {
        (self.0)(file, description, config, options)
    }
}

/// Wraps a closure as a [`MatchPredicate`].
pub fn from_fn<F>(f: F) -> FnPredicate<F>
where
    F: Fn(&Path, &Description, &Data, &Data) -> Result<bool>,
{
    FnPredicate(f)
}

/// Matches files against descriptions.
///
/// A file/description pair matches when any predicate answers `true`. With
/// no predicates nothing ever matches.
pub struct Matcher<'a> {
    predicates: &'a [Box<dyn MatchPredicate>],
    config: &'a Data,
    options: &'a Data,
}
impl<'a> Matcher<'a> {
    pub fn new(predicates: &'a [Box<dyn MatchPredicate>], config: &'a Data, options: &'a Data) -> Self {
        Self { predicates, config, options }
    }

    /// Produces one [`Acquisition`] per file that matched exactly one
    /// description, in file order.
    ///
    /// - A file matching several descriptions is skipped
    ///   ([`Warning::AmbiguousMatch`]).
    /// - Several files matching the same description are all kept, each
    ///   labelled `run-1`, `run-2`, ... in file order.
    ///
    /// # Errors
    /// Raises [`ErrorKind::Predicate`] if any predicate fails.
    #[tracing::instrument(skip_all, fields(files = files.len(), descriptions = descriptions.len()))]
    pub fn find_acquisitions(
        &self,
        files: &[PathBuf],
        participant: &Participant,
        descriptions: &[Description],
        warnings: &mut Warnings,
    ) -> Result<Vec<Acquisition>> {
        // (file, description) in file order; each file appears at most once.
        let mut matched: Vec<(&PathBuf, &Description)> = Vec::new();
        for file in files {
            let mut hits = Vec::new();
            for description in descriptions {
                if self.is_match(file, description)? {
                    tracing::debug!(file = %file.display(), index = description.index, "matched description");
                    hits.push(description);
                }
            }
            match hits.as_slice() {
                [] => {},
                [description] => matched.push((file, *description)),
                _ => warnings.emit(Warning::AmbiguousMatch {
                    file: file.clone(),
                    descriptions: hits
                        .iter()
                        .map(|d| (d.index, d.data_type, d.modality_label().to_string()))
                        .collect(),
                }),
            }
        }

        let mut runs: HashMap<usize, usize> = HashMap::new();
        for (_, description) in &matched {
            *runs.entry(description.index).or_default() += 1;
        }
        let mut seen: HashMap<usize, usize> = HashMap::new();
        let acquisitions = matched
            .into_iter()
            .map(|(file, description)| {
                let mut description = description.clone();
                if runs.get(&description.index).is_some_and(|&n| n > 1) {
                    let run = seen.entry(description.index).or_default();
                    *run += 1;
                    description.set_custom_label("run", run.to_string());
                }
                Acquisition::new(file.clone(), participant.clone(), description)
            })
            .collect();
        Ok(acquisitions)
    }

    fn is_match(&self, file: &Path, description: &Description) -> Result<bool> {
        for predicate in self.predicates {
            let matched = predicate
                .matches(file, description, self.config, self.options)
                .or_raise(|| ErrorKind::Predicate { file: file.to_path_buf(), index: description.index })?;
            if matched {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
