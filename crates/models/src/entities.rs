use crate::error::{Error, ErrorKind};
use crate::sanitize;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Recognised BIDS entities, in the order they appear in a filename.
pub const ENTITY_ORDER: &[&str] = &[
    "sub", "ses", "sample", "task", "acq", "ce", "trc", "stain", "rec", "dir", "run", "mod", "echo", "flip", "inv",
    "mt", "part", "proc", "hemi", "space", "split", "recording", "chunk", "atlas", "res", "den", "label", "desc",
];

/// The `key-value` naming units of a BIDS filename (e.g. `acq-2`, `dir-AP`).
///
/// Keys and values are sanitized on the way in: anything that isn't an ASCII
/// letter or digit is stripped, and a pair whose key or value ends up empty is
/// dropped entirely. Setting a key that already exists replaces its value.
///
/// Serialization ([`Display`]) puts recognised entities in [`ENTITY_ORDER`],
/// followed by unrecognised ones in insertion order. Equality ignores order.
///
/// ```
/// use d2b_models::FilenameEntities;
///
/// let entities: FilenameEntities = "_dir-AP_acq-a.b_unknown-x".parse().unwrap();
/// assert_eq!(entities.to_string(), "acq-ab_dir-AP_unknown-x");
/// assert_eq!(entities.get("acq"), Some("ab"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilenameEntities {
    entities: Vec<(String, String)>,
}
impl FilenameEntities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an entity, replacing any existing value for the same key.
    /// Pairs that sanitize to an empty key or value are ignored.
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl AsRef<str>) {
        let (key, value) = (sanitize(key), sanitize(value));
        if key.is_empty() || value.is_empty() {
            return;
        }
        match self.entities.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.entities.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entities.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let position = self.entities.iter().position(|(k, _)| k == key)?;
        Some(self.entities.remove(position).1)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterates entities in serialization order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        let known = ENTITY_ORDER.iter().filter_map(|key| self.get(key).map(|value| (*key, value)));
        let unknown = self
            .entities
            .iter()
            .filter(|(k, _)| !ENTITY_ORDER.contains(&k.as_str()))
            .map(|(k, v)| (k.as_str(), v.as_str()));
        known.chain(unknown)
    }

    /// The serialized entities with a leading `_`, or an empty string if there
    /// are none. This is the form used when appending to a filename prefix.
    pub fn prefixed(&self) -> String {
        match self.is_empty() {
            true => String::new(),
            false => format!("_{self}"),
        }
    }
}

impl FromStr for FilenameEntities {
    type Err = Error;

    /// Parses `key-value` tokens separated by `_`. Leading, trailing and
    /// repeated separators are tolerated; a token without a `-` is not.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut entities = Self::new();
        for token in s.split('_').filter(|t| !t.is_empty()) {
            let Some((key, value)) = token.split_once('-') else {
                exn::bail!(ErrorKind::MalformedEntity(token.to_string()));
            };
            entities.insert(key, value);
        }
        Ok(entities)
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for FilenameEntities {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entities = Self::new();
        for (key, value) in iter {
            entities.insert(key, value);
        }
        entities
    }
}

impl<K: AsRef<str>, V: AsRef<str>, const N: usize> From<[(K, V); N]> for FilenameEntities {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl Display for FilenameEntities {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("_")?;
            }
            write!(f, "{key}-{value}")?;
        }
        Ok(())
    }
}

impl PartialEq for FilenameEntities {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.entities.iter().all(|(k, v)| other.get(k) == Some(v.as_str()))
    }
}
impl Eq for FilenameEntities {}

impl Hash for FilenameEntities {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Order-independent, to agree with `PartialEq`.
        let mut pairs: Vec<_> = self.entities.iter().collect();
        pairs.sort();
        pairs.hash(state);
    }
}
