use crate::error::{ErrorKind, Result};
use d2b_models::{Data, Description};
use exn::ResultExt;
use serde_json::Value;
use std::path::Path;

/// Key of the description array in the configuration object.
pub const DESCRIPTIONS_KEY: &str = "descriptions";

/// A parsed description configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedConfig {
    /// Descriptions in declaration order; each one's `index` is its position.
    pub descriptions: Vec<Description>,
    /// The whole configuration object, handed to match predicates as-is.
    pub config: Data,
}

/// Capability for turning a configuration file into descriptions.
pub trait ConfigLoader {
    fn load(&self, path: &Path) -> Result<LoadedConfig>;
}

/// Loads a JSON object containing a `descriptions` array.
///
/// ```json
/// {
///   "descriptions": [
///     {"dataType": "anat", "modalityLabel": "T1w", "criteria": {"SeriesDescription": "*T1*"}}
///   ]
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonConfigLoader;
impl JsonConfigLoader {
    /// Parses an in-memory configuration value.
    pub fn parse(value: Value) -> Result<LoadedConfig> {
        let Value::Object(config) = value else {
            exn::bail!(ErrorKind::Structure("configuration must be a JSON object".to_string()));
        };
        let entries = match config.get(DESCRIPTIONS_KEY) {
            Some(Value::Array(entries)) => entries,
            Some(_) => exn::bail!(ErrorKind::Structure(format!("'{DESCRIPTIONS_KEY}' must be an array"))),
            None => exn::bail!(ErrorKind::Structure(format!("missing '{DESCRIPTIONS_KEY}'"))),
        };
        let descriptions = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                Description::from_value(index, entry.clone()).or_raise(|| ErrorKind::Description(index))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(LoadedConfig { descriptions, config })
    }
}
impl ConfigLoader for JsonConfigLoader {
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    fn load(&self, path: &Path) -> Result<LoadedConfig> {
        let bytes = std::fs::read(path).or_raise(|| ErrorKind::Unreadable(path.to_path_buf()))?;
        let value: Value = serde_json::from_slice(&bytes).or_raise(|| ErrorKind::Syntax(path.to_path_buf()))?;
        let loaded = Self::parse(value)?;
        tracing::debug!(descriptions = loaded.descriptions.len(), "loaded description configuration");
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use d2b_models::DataType;
    use rstest::rstest;
    use serde_json::json;
    use std::ops::Deref;

    fn write(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d2b-config.json");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load() {
        let (_dir, path) = write(
            r#"{
                "search_method": "fnmatch",
                "descriptions": [
                    {"dataType": "anat", "modalityLabel": "T1w", "criteria": {"SeriesDescription": "*T1*"}},
                    {"id": "rest", "dataType": "func", "modalityLabel": "bold", "customLabels": "task-rest"},
                    {"dataType": "fmap", "modalityLabel": "epi", "IntendedFor": ["rest", 0]}
                ]
            }"#,
        );
        let loaded = JsonConfigLoader.load(&path).unwrap();
        assert_eq!(loaded.descriptions.len(), 3);
        assert_eq!(loaded.descriptions[0].data_type, DataType::Anat);
        assert_eq!(loaded.descriptions[0].data["criteria"], json!({"SeriesDescription": "*T1*"}));
        assert_eq!(loaded.descriptions[1].index, 1);
        assert_eq!(loaded.descriptions[1].id(), Some("rest"));
        assert_eq!(loaded.descriptions[1].suffix(), "_task-rest_bold");
        assert_eq!(loaded.descriptions[2].intended_for, Some(json!(["rest", 0])));
        assert_eq!(loaded.config["search_method"], "fnmatch");
        assert!(loaded.config.contains_key(DESCRIPTIONS_KEY));
    }

    #[test]
    fn test_empty_descriptions() {
        let loaded = JsonConfigLoader::parse(json!({"descriptions": []})).unwrap();
        assert!(loaded.descriptions.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonConfigLoader.load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::Unreadable(_)));
    }

    #[test]
    fn test_invalid_json() {
        let (_dir, path) = write("{\"descriptions\": [");
        let err = JsonConfigLoader.load(&path).unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::Syntax(_)));
    }

    #[rstest]
    #[case(json!([]))]
    #[case(json!({}))]
    #[case(json!({"descriptions": {}}))]
    #[case(json!({"descriptions": "anat"}))]
    fn test_invalid_structure(#[case] value: Value) {
        let err = JsonConfigLoader::parse(value).unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::Structure(_)));
    }

    #[rstest]
    #[case(json!({"descriptions": [{"dataType": "anat"}, {"dataType": "pet"}]}), 1)]
    #[case(json!({"descriptions": [{"dataType": "anat", "customLabels": "acq"}]}), 0)]
    #[case(json!({"descriptions": ["anat"]}), 0)]
    fn test_invalid_description(#[case] value: Value, #[case] expected: usize) {
        let err = JsonConfigLoader::parse(value).unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::Description(index) if *index == expected));
    }
}
