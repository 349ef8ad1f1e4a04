use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// The BIDS version new datasets are scaffolded for.
pub const BIDS_VERSION: &str = "1.8.0";

/// The contents of a dataset's `dataset_description.json`.
///
/// Missing fields take their defaults: `DatasetType` is `raw`, list fields
/// hold a single empty string and everything else is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetDescription {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "BIDSVersion")]
    pub bids_version: String,
    #[serde(rename = "DatasetType")]
    pub dataset_type: String,
    #[serde(rename = "License")]
    pub license: String,
    #[serde(rename = "Authors")]
    pub authors: Vec<String>,
    #[serde(rename = "Acknowledgements")]
    pub acknowledgements: String,
    #[serde(rename = "HowToAcknowledge")]
    pub how_to_acknowledge: String,
    #[serde(rename = "Funding")]
    pub funding: Vec<String>,
    #[serde(rename = "EthicsApprovals")]
    pub ethics_approvals: Vec<String>,
    #[serde(rename = "ReferencesAndLinks")]
    pub references_and_links: Vec<String>,
    #[serde(rename = "DatasetDOI")]
    pub dataset_doi: String,
    #[serde(rename = "HEDVersion")]
    pub hed_version: String,
}
impl Default for DatasetDescription {
    fn default() -> Self {
        Self {
            name: String::new(),
            bids_version: String::new(),
            dataset_type: "raw".to_string(),
            license: String::new(),
            authors: vec![String::new()],
            acknowledgements: String::new(),
            how_to_acknowledge: String::new(),
            funding: vec![String::new()],
            ethics_approvals: vec![String::new()],
            references_and_links: vec![String::new()],
            dataset_doi: String::new(),
            hed_version: String::new(),
        }
    }
}
impl DatasetDescription {
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        serde_json::from_reader(reader).or_raise(|| ErrorKind::InvalidDescription)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
        Self::from_reader(BufReader::new(file))
    }

    /// Writes pretty-printed JSON followed by a newline.
    pub fn to_writer(&self, mut writer: impl Write) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, self).or_raise(|| ErrorKind::InvalidDescription)?;
        writer.write_all(b"\n").or_raise(|| ErrorKind::InvalidDescription)?;
        writer.flush().or_raise(|| ErrorKind::InvalidDescription)
    }

    pub fn to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
        self.to_writer(BufWriter::new(file)).or_raise(|| ErrorKind::Io(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn full() -> DatasetDescription {
        DatasetDescription {
            name: "a".into(),
            bids_version: "b".into(),
            dataset_type: "derived".into(),
            license: "c".into(),
            authors: vec!["d".into()],
            acknowledgements: "e".into(),
            how_to_acknowledge: "f".into(),
            funding: vec!["g".into()],
            ethics_approvals: vec!["h".into()],
            references_and_links: vec!["i".into()],
            dataset_doi: "k".into(),
            hed_version: "l".into(),
        }
    }

    fn full_json() -> Value {
        json!({
            "Name": "a",
            "BIDSVersion": "b",
            "DatasetType": "derived",
            "License": "c",
            "Authors": ["d"],
            "Acknowledgements": "e",
            "HowToAcknowledge": "f",
            "Funding": ["g"],
            "EthicsApprovals": ["h"],
            "ReferencesAndLinks": ["i"],
            "DatasetDOI": "k",
            "HEDVersion": "l",
        })
    }

    #[test]
    fn test_defaults() {
        let d = DatasetDescription::default();
        assert_eq!(d.name, "");
        assert_eq!(d.bids_version, "");
        assert_eq!(d.dataset_type, "raw");
        assert_eq!(d.authors, [""]);
        assert_eq!(d.funding, [""]);
        assert_eq!(d.ethics_approvals, [""]);
        assert_eq!(d.references_and_links, [""]);
        assert_eq!(d.dataset_doi, "");
        assert_eq!(d.hed_version, "");
    }

    #[test]
    fn test_from_empty_object() {
        let d = DatasetDescription::from_reader("{}".as_bytes()).unwrap();
        assert_eq!(d, DatasetDescription::default());
    }

    #[test]
    fn test_from_reader() {
        let d = DatasetDescription::from_reader(full_json().to_string().as_bytes()).unwrap();
        assert_eq!(d, full());
    }

    #[test]
    fn test_serializes_bids_keys_in_order() {
        let value = serde_json::to_value(full()).unwrap();
        assert_eq!(value, full_json());
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.first().map(|k| k.as_str()), Some("Name"));
        assert_eq!(keys.last().map(|k| k.as_str()), Some("HEDVersion"));
    }

    #[test]
    fn test_path_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset_description.json");
        full().to_path(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("{\n  \"Name\": \"a\","));
        assert!(contents.ends_with("}\n"));
        assert_eq!(DatasetDescription::from_path(&path).unwrap(), full());
    }

    #[test]
    fn test_invalid() {
        assert!(DatasetDescription::from_reader(r#"{"Authors": "d"}"#.as_bytes()).is_err());
        assert!(DatasetDescription::from_reader("[".as_bytes()).is_err());
    }
}
