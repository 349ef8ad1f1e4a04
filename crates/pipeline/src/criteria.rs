//! The built-in [`MatchPredicate`]: compares a description's `criteria`
//! against the candidate sidecar.

use crate::error::{ErrorKind, Result};
use crate::matcher::MatchPredicate;
use d2b_config::SearchMethod;
use d2b_models::{Data, Description};
use exn::ResultExt;
use glob::{MatchOptions, Pattern};
use regex::Regex;
use serde_json::Value;
use std::path::Path;

/// Key of the criteria object in [`Description::data`].
pub const CRITERIA_KEY: &str = "criteria";
/// Criterion key that is compared to the sidecar's file name rather than one
/// of its fields.
pub const SIDECAR_FILENAME: &str = "SidecarFilename";

/// Matches when every entry of the description's `criteria` object matches
/// the sidecar. Descriptions without criteria never match.
///
/// Options (from the forwarded options mapping):
/// - `search_method`: `"fnmatch"` (default) or `"re"`.
/// - `case_sensitive`: applies to `fnmatch` only; defaults to `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CriteriaPredicate;
impl MatchPredicate for CriteriaPredicate {
    fn matches(&self, file: &Path, description: &Description, _config: &Data, options: &Data) -> Result<bool> {
        let Some(Value::Object(criteria)) = description.data.get(CRITERIA_KEY) else {
            return Ok(false);
        };
        let comparison = Comparison::from_options(options)?;
        let mut sidecar: Option<Data> = None;
        for (key, pattern) in criteria {
            let field = if key == SIDECAR_FILENAME {
                Value::from(file.file_name().and_then(|n| n.to_str()).unwrap_or_default())
            } else {
                if sidecar.is_none() {
                    sidecar = Some(read_sidecar(file)?);
                }
                match sidecar.as_ref().and_then(|s| s.get(key)) {
                    Some(value) => value.clone(),
                    None => return Ok(false),
                }
            };
            if !comparison.value(&field, pattern)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn read_sidecar(file: &Path) -> Result<Data> {
    let bytes = std::fs::read(file).or_raise(|| ErrorKind::Sidecar(file.to_path_buf()))?;
    match serde_json::from_slice(&bytes).or_raise(|| ErrorKind::Sidecar(file.to_path_buf()))? {
        Value::Object(map) => Ok(map),
        _ => exn::bail!(ErrorKind::Sidecar(file.to_path_buf())),
    }
}

#[derive(Debug, Clone, Copy)]
struct Comparison {
    method: SearchMethod,
    case_sensitive: bool,
}
impl Comparison {
    fn from_options(options: &Data) -> Result<Self> {
        let method = match options.get("search_method") {
            None | Some(Value::Null) => SearchMethod::default(),
            Some(Value::String(s)) => s.parse::<SearchMethod>().map_err(ErrorKind::InvalidOption)?,
            Some(other) => exn::bail!(ErrorKind::InvalidOption(format!("search_method = {other}"))),
        };
        let case_sensitive = match options.get("case_sensitive") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(other) => exn::bail!(ErrorKind::InvalidOption(format!("case_sensitive = {other}"))),
        };
        Ok(Self { method, case_sensitive })
    }

    fn value(&self, field: &Value, pattern: &Value) -> Result<bool> {
        match (field, pattern) {
            (_, Value::String(pattern)) => match text(field) {
                Some(name) => compare(&name, pattern, self.method, self.case_sensitive),
                None => Ok(false),
            },
            (Value::Array(fields), Value::Array(patterns)) => {
                if fields.len() != patterns.len() {
                    return Ok(false);
                }
                for (field, pattern) in fields.iter().zip(patterns) {
                    if !self.value(field, pattern)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            },
            (field, pattern) => Ok(field == pattern),
        }
    }
}

/// Scalars compared against a string pattern are compared as text, with
/// booleans and null spelled `True`, `False` and `None`.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("True".to_string()),
        Value::Bool(false) => Some("False".to_string()),
        Value::Null => Some("None".to_string()),
        _ => None,
    }
}

/// Compares `name` against `pattern`.
///
/// - [`SearchMethod::Fnmatch`]: the whole of `name` must match the shell
///   glob (`*`, `?`, `[seq]`, `[!seq]`); both sides are lowercased unless
///   `case_sensitive`. A `[` that opens no complete set is literal.
/// - [`SearchMethod::Re`]: `pattern` must match somewhere in `name`; always
///   case-sensitive.
///
/// # Errors
/// Raises [`ErrorKind::InvalidPattern`] for an invalid regular expression.
pub fn compare(name: &str, pattern: &str, method: SearchMethod, case_sensitive: bool) -> Result<bool> {
    match method {
        SearchMethod::Fnmatch => {
            let (name, glob) = match case_sensitive {
                true => (name.to_string(), pattern.to_string()),
                false => (name.to_lowercase(), pattern.to_lowercase()),
            };
            let glob = Pattern::new(&shell_glob(&glob)).or_raise(|| ErrorKind::InvalidPattern(pattern.to_string()))?;
            Ok(glob.matches_with(&name, MatchOptions::new()))
        },
        SearchMethod::Re => {
            let regex = Regex::new(pattern).or_raise(|| ErrorKind::InvalidPattern(pattern.to_string()))?;
            Ok(regex.is_match(name))
        },
    }
}

/// Rewrites a shell glob into one [`Pattern`] accepts with the same meaning:
/// runs of `*` collapse to one (there are no recursive wildcards in a file
/// name) and a `[` without a closing set becomes the literal `[[]`.
fn shell_glob(glob: &str) -> String {
    let chars: Vec<char> = glob.chars().collect();
    let mut out = String::with_capacity(glob.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                out.push('*');
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
            },
            '[' => match set_end(&chars, i) {
                Some(end) => {
                    out.extend(&chars[i..=end]);
                    i = end + 1;
                },
                None => {
                    out.push_str("[[]");
                    i += 1;
                },
            },
            c => {
                out.push(c);
                i += 1;
            },
        }
    }
    out
}

/// Index of the `]` closing the set opened at `start`. A `]` directly after
/// `[` or `[!` belongs to the set.
fn set_end(chars: &[char], start: usize) -> Option<usize> {
    let first = match chars.get(start + 1) {
        Some('!') => start + 3,
        Some(_) => start + 2,
        None => return None,
    };
    chars.get(first..)?.iter().position(|c| *c == ']').map(|j| first + j)
}
