use crate::error::{Error, ErrorKind};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// The BIDS modality category an output belongs to; also the name of the
/// directory it is written into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataType {
    Anat,
    Beh,
    Dwi,
    Eeg,
    Fmap,
    Func,
    Ieeg,
    Meg,
    Perf,
}
impl DataType {
    pub const ALL: [DataType; 9] = [
        DataType::Anat,
        DataType::Beh,
        DataType::Dwi,
        DataType::Eeg,
        DataType::Fmap,
        DataType::Func,
        DataType::Ieeg,
        DataType::Meg,
        DataType::Perf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Anat => "anat",
            DataType::Beh => "beh",
            DataType::Dwi => "dwi",
            DataType::Eeg => "eeg",
            DataType::Fmap => "fmap",
            DataType::Func => "func",
            DataType::Ieeg => "ieeg",
            DataType::Meg => "meg",
            DataType::Perf => "perf",
        }
    }
}
impl FromStr for DataType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::ALL.iter().find(|dt| dt.as_str() == s) {
            Some(dt) => Ok(*dt),
            None => exn::bail!(ErrorKind::InvalidDataType(s.to_string())),
        }
    }
}
impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
