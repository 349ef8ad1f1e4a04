use crate::error::{ErrorKind, Result};
use d2b_models::Data;
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const ENV_PREFIX: &str = "D2B_";
const USER_CONFIG_FILES: &[&str] = &["config.toml", "config.yaml", "config.json"];

/// How string criteria are compared against sidecar values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMethod {
    /// Whole-string shell-style glob.
    #[default]
    Fnmatch,
    /// Unanchored regular expression search.
    Re,
}
impl SearchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMethod::Fnmatch => "fnmatch",
            SearchMethod::Re => "re",
        }
    }
}
impl FromStr for SearchMethod {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "fnmatch" => Ok(SearchMethod::Fnmatch),
            "re" => Ok(SearchMethod::Re),
            other => Err(format!("unknown search method {other:?}, expected \"fnmatch\" or \"re\"")),
        }
    }
}
impl Display for SearchMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// The external converter invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterSettings {
    /// Run the converter at all. When disabled the input directories are
    /// expected to already contain converted files.
    pub enabled: bool,
    /// Program name (looked up on `PATH`) or absolute path.
    pub program: String,
    /// Arguments placed before `-o <out> <in>`.
    pub args: Vec<String>,
}
impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "dcm2niix".to_string(),
            args: ["-b", "y", "-ba", "y", "-z", "y", "-f", "%3s_%f_%p_%t"].map(String::from).to_vec(),
        }
    }
}

/// Default options forwarded to match predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
    pub search_method: SearchMethod,
    pub case_sensitive: bool,
}
impl MatchSettings {
    /// The options mapping handed to predicates verbatim.
    pub fn to_options(&self) -> Data {
        let mut options = Data::new();
        options.insert("search_method".into(), Value::from(self.search_method.as_str()));
        options.insert("case_sensitive".into(), Value::from(self.case_sensitive));
        options
    }
}

/// Tool settings.
///
/// Layered, lowest precedence first:
/// 1. built-in defaults,
/// 2. the user config file (`config.{toml,yaml,json}` in the platform config
///    directory for `d2b`),
/// 3. an explicitly given settings file,
/// 4. `D2B_`-prefixed environment variables, `__` separating nested keys
///    (e.g. `D2B_CONVERTER__ENABLED=false`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub converter: ConverterSettings,
    #[serde(rename = "match")]
    pub matching: MatchSettings,
}
impl Settings {
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let user_dir = ProjectDirs::from("", "", "d2b").map(|dirs| dirs.config_dir().to_path_buf());
        Self::figment(user_dir.as_deref(), explicit)?.extract().or_raise(|| ErrorKind::Settings)
    }

    pub(crate) fn figment(user_dir: Option<&Path>, explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let Some(dir) = user_dir {
            for name in USER_CONFIG_FILES {
                let path = dir.join(name);
                if path.is_file() {
                    tracing::debug!(path = %path.display(), "merging user settings");
                    figment = merge_file(figment, path);
                }
            }
        }
        if let Some(path) = explicit {
            if !path.is_file() {
                exn::bail!(ErrorKind::Unreadable(path.to_path_buf()));
            }
            tracing::debug!(path = %path.display(), "merging settings file");
            figment = merge_file(figment, path.to_path_buf());
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }
}

fn merge_file(figment: Figment, path: PathBuf) -> Figment {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
        Some("json") => figment.merge(Json::file(path)),
        _ => figment.merge(Toml::file(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::ops::Deref;

    fn extract(user_dir: Option<&Path>, explicit: Option<&Path>) -> Settings {
        Settings::figment(user_dir, explicit).unwrap().extract().unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.converter.enabled);
        assert_eq!(settings.converter.program, "dcm2niix");
        assert_eq!(settings.matching.search_method, SearchMethod::Fnmatch);
        assert!(!settings.matching.case_sensitive);
    }

    #[rstest]
    #[case("settings.toml", "[converter]\nenabled = false\n\n[match]\nsearch_method = \"re\"\n")]
    #[case("settings.yaml", "converter:\n  enabled: false\nmatch:\n  search_method: re\n")]
    #[case("settings.json", r#"{"converter": {"enabled": false}, "match": {"search_method": "re"}}"#)]
    fn test_explicit_file(#[case] name: &str, #[case] contents: &str) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        let settings = extract(None, Some(&path));
        assert!(!settings.converter.enabled);
        assert_eq!(settings.converter.program, "dcm2niix");
        assert_eq!(settings.matching.search_method, SearchMethod::Re);
        assert!(!settings.matching.case_sensitive);
    }

    #[test]
    fn test_explicit_file_overrides_user_file() {
        let user = tempfile::tempdir().unwrap();
        std::fs::write(user.path().join("config.toml"), "[converter]\nprogram = \"/opt/dcm2niix\"\nenabled = false\n")
            .unwrap();
        let explicit = user.path().join("override.json");
        std::fs::write(&explicit, r#"{"converter": {"enabled": true}}"#).unwrap();

        let settings = extract(Some(user.path()), None);
        assert_eq!(settings.converter.program, "/opt/dcm2niix");
        assert!(!settings.converter.enabled);

        let settings = extract(Some(user.path()), Some(&explicit));
        assert_eq!(settings.converter.program, "/opt/dcm2niix");
        assert!(settings.converter.enabled);
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::figment(None, Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::Unreadable(_)));
    }

    #[test]
    fn test_invalid_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[match]\nsearch_method = \"glob\"\n").unwrap();
        let result: std::result::Result<Settings, _> = Settings::figment(None, Some(&path)).unwrap().extract();
        assert!(result.is_err());
    }

    #[rstest]
    #[case("fnmatch", SearchMethod::Fnmatch)]
    #[case("re", SearchMethod::Re)]
    fn test_search_method(#[case] name: &str, #[case] expected: SearchMethod) {
        assert_eq!(name.parse::<SearchMethod>().unwrap(), expected);
        assert_eq!(expected.to_string(), name);
    }

    #[test]
    fn test_options() {
        let settings = MatchSettings { search_method: SearchMethod::Re, case_sensitive: true };
        let options = settings.to_options();
        assert_eq!(options["search_method"], "re");
        assert_eq!(options["case_sensitive"], true);
    }
}
