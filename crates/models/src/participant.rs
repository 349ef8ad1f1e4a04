use crate::error::{ErrorKind, Result};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;

const SUBJECT_PREFIX: &str = "sub-";
const SESSION_PREFIX: &str = "ses-";

/// The subject (and optional session) whose scans are being organised.
///
/// Both labels are stored bare: surrounding whitespace and any `sub-`/`ses-`
/// prefix are stripped on construction, after which they must be ASCII
/// alphanumeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Participant {
    label: String,
    session: String,
}
impl Participant {
    pub fn new(label: impl AsRef<str>) -> Result<Self> {
        Self::with_session(label, "")
    }

    pub fn with_session(label: impl AsRef<str>, session: impl AsRef<str>) -> Result<Self> {
        let label = normalize(label.as_ref(), SUBJECT_PREFIX);
        if label.is_empty() || !is_alphanumeric(&label) {
            exn::bail!(ErrorKind::InvalidParticipant(label));
        }
        let session = normalize(session.as_ref(), SESSION_PREFIX);
        if !is_alphanumeric(&session) {
            exn::bail!(ErrorKind::InvalidSession(session));
        }
        Ok(Self { label, session })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The bare session label; empty when the participant has no session.
    pub fn session(&self) -> &str {
        &self.session
    }

    /// `sub-<label>`
    pub fn bids_label(&self) -> String {
        format!("{SUBJECT_PREFIX}{}", self.label)
    }

    /// `ses-<session>`, or empty.
    pub fn bids_session(&self) -> String {
        match self.session.is_empty() {
            true => String::new(),
            false => format!("{SESSION_PREFIX}{}", self.session),
        }
    }

    /// Filename prefix shared by every output: `sub-<label>[_ses-<session>]`.
    pub fn prefix(&self) -> String {
        match self.session.is_empty() {
            true => self.bids_label(),
            false => format!("{}_{}", self.bids_label(), self.bids_session()),
        }
    }

    /// Relative output directory: `sub-<label>[/ses-<session>]`.
    pub fn directory(&self) -> PathBuf {
        let mut directory = self.subject_directory();
        if !self.session.is_empty() {
            directory.push(self.bids_session());
        }
        directory
    }

    pub fn subject_directory(&self) -> PathBuf {
        PathBuf::from(self.bids_label())
    }
}
impl Display for Participant {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.prefix())
    }
}

fn normalize(value: &str, prefix: &str) -> String {
    let value = value.trim();
    value.strip_prefix(prefix).unwrap_or(value).to_string()
}

fn is_alphanumeric(value: &str) -> bool {
    value.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::ops::Deref;
    use std::path::Path;

    #[rstest]
    #[case("label01", "")]
    #[case("sub-label01", "")]
    #[case("label01", "session01")]
    #[case("sub-label01", "ses-session01")]
    #[case("  sub-label01 ", " ses-session01\t")]
    fn test_prefix_is_stripped(#[case] label: &str, #[case] session: &str) {
        let participant = Participant::with_session(label, session).unwrap();
        assert_eq!(participant.label(), "label01");
        assert_eq!(participant.session(), if session.is_empty() { "" } else { "session01" });
    }

    #[test]
    fn test_prefixed_and_bare_are_equal() {
        assert_eq!(
            Participant::with_session("sub-x", "ses-y").unwrap(),
            Participant::with_session("x", "y").unwrap()
        );
        assert_ne!(Participant::with_session("x", "y").unwrap(), Participant::new("x").unwrap());
    }

    #[test]
    fn test_derived_with_session() {
        let participant = Participant::with_session("label01", "session01").unwrap();
        assert_eq!(participant.bids_label(), "sub-label01");
        assert_eq!(participant.bids_session(), "ses-session01");
        assert_eq!(participant.prefix(), "sub-label01_ses-session01");
        assert_eq!(participant.directory(), Path::new("sub-label01/ses-session01"));
        assert_eq!(participant.subject_directory(), Path::new("sub-label01"));
        assert_eq!(participant.to_string(), "sub-label01_ses-session01");
    }

    #[test]
    fn test_derived_without_session() {
        let participant = Participant::new("label01").unwrap();
        assert_eq!(participant.bids_session(), "");
        assert_eq!(participant.prefix(), "sub-label01");
        assert_eq!(participant.directory(), Path::new("sub-label01"));
        assert_eq!(participant.subject_directory(), Path::new("sub-label01"));
    }

    #[rstest]
    #[case("")]
    #[case("sub-")]
    #[case("   ")]
    #[case("label_01")]
    #[case("label-01")]
    #[case("läbel")]
    fn test_invalid_label(#[case] label: &str) {
        let err = Participant::new(label).unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::InvalidParticipant(_)));
    }

    #[rstest]
    #[case("session-01")]
    #[case("session_01")]
    #[case("ses-a b")]
    fn test_invalid_session(#[case] session: &str) {
        let err = Participant::with_session("label01", session).unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::InvalidSession(_)));
    }
}
