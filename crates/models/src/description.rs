use crate::error::{ErrorKind, Result};
use crate::{Data, DataType, FilenameEntities};
use exn::ResultExt;
use serde_json::Value;
use std::hash::{Hash, Hasher};

/// External (configuration) key names of the strongly-typed description
/// fields. Anything else in a description entry is kept in
/// [`Description::data`].
pub mod keys {
    pub const DATA_TYPE: &str = "dataType";
    pub const MODALITY_LABEL: &str = "modalityLabel";
    pub const CUSTOM_LABELS: &str = "customLabels";
    pub const SIDECAR_CHANGES: &str = "sidecarChanges";
    pub const INTENDED_FOR: &str = "IntendedFor";
}

/// One user-declared output rule: what a matching source file should become
/// and how its output is named and annotated.
///
/// `index` is the entry's position in the configuration; it identifies the
/// description for cross-references and diagnostics. Matching criteria, an
/// optional symbolic `id`, and any other unrecognised keys live in the open
/// `data` bag.
///
/// Cloning is deep: a clone shares no mutable state with the original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    pub index: usize,
    pub data_type: DataType,
    modality_label: String,
    custom_labels: FilenameEntities,
    /// Overrides applied on top of the matched file's sidecar.
    pub sidecar_changes: Data,
    /// The raw `IntendedFor` declaration: a description index, an `id`
    /// string, or a list of either. Interpreted during resolution.
    pub intended_for: Option<Value>,
    pub data: Data,
}
impl Description {
    pub fn new(index: usize, data_type: DataType, modality_label: impl AsRef<str>) -> Self {
        Self {
            index,
            data_type,
            modality_label: prefix_underscore(modality_label.as_ref()),
            custom_labels: FilenameEntities::new(),
            sidecar_changes: Data::new(),
            intended_for: None,
            data: Data::new(),
        }
    }

    pub fn with_custom_labels(mut self, labels: impl Into<FilenameEntities>) -> Self {
        self.custom_labels = labels.into();
        self
    }

    pub fn with_sidecar_changes(mut self, changes: Data) -> Self {
        self.sidecar_changes = changes;
        self
    }

    pub fn with_intended_for(mut self, intended_for: impl Into<Value>) -> Self {
        self.intended_for = Some(intended_for.into()).filter(|v| !v.is_null());
        self
    }

    pub fn with_data(mut self, data: Data) -> Self {
        self.data = data;
        self
    }

    /// Builds a description from one loosely-typed configuration entry.
    ///
    /// Recognised keys (see [`keys`]) populate the typed fields; every other
    /// key is folded into `data`. `dataType` is required. `customLabels` may
    /// be a token string (`"dir-AP_acq-x"`) or an object (`{"dir": "AP"}`).
    pub fn from_map(index: usize, mut entry: Data) -> Result<Self> {
        let data_type = match entry.remove(keys::DATA_TYPE) {
            Some(Value::String(s)) => s.parse()?,
            Some(other) => exn::bail!(ErrorKind::InvalidDataType(other.to_string())),
            None => exn::bail!(ErrorKind::InvalidDataType(String::new())),
        };
        let modality_label = match entry.remove(keys::MODALITY_LABEL) {
            Some(Value::String(s)) => s,
            None | Some(Value::Null) => String::new(),
            Some(other) => exn::bail!(invalid(keys::MODALITY_LABEL, &other)),
        };
        let custom_labels = match entry.remove(keys::CUSTOM_LABELS) {
            None | Some(Value::Null) => FilenameEntities::new(),
            Some(Value::String(s)) => s.parse::<FilenameEntities>().or_raise(|| invalid(keys::CUSTOM_LABELS, &Value::String(s.clone())))?,
            Some(Value::Object(map)) => custom_labels_from_object(&map)?,
            Some(other) => exn::bail!(invalid(keys::CUSTOM_LABELS, &other)),
        };
        let sidecar_changes = match entry.remove(keys::SIDECAR_CHANGES) {
            None | Some(Value::Null) => Data::new(),
            Some(Value::Object(map)) => map,
            Some(other) => exn::bail!(invalid(keys::SIDECAR_CHANGES, &other)),
        };
        let intended_for = entry.remove(keys::INTENDED_FOR).filter(|v| !v.is_null());
        Ok(Self {
            index,
            data_type,
            modality_label: prefix_underscore(&modality_label),
            custom_labels,
            sidecar_changes,
            intended_for,
            data: entry,
        })
    }

    /// Like [`from_map`](Self::from_map), for an arbitrary JSON value that
    /// must be an object.
    pub fn from_value(index: usize, entry: Value) -> Result<Self> {
        match entry {
            Value::Object(map) => Self::from_map(index, map),
            other => exn::bail!(invalid("description", &other)),
        }
    }

    /// The modality label, `_`-prefixed (e.g. `_bold`), or empty.
    pub fn modality_label(&self) -> &str {
        &self.modality_label
    }

    pub fn custom_labels(&self) -> &FilenameEntities {
        &self.custom_labels
    }

    /// Sets (or replaces) a single custom label entity, e.g. `run-2`.
    pub fn set_custom_label(&mut self, key: impl AsRef<str>, value: impl AsRef<str>) {
        self.custom_labels.insert(key, value);
    }

    /// The filename suffix: custom labels followed by the modality label,
    /// e.g. `_acq-abc_dir-AP_bold`.
    pub fn suffix(&self) -> String {
        format!("{}{}", self.custom_labels.prefixed(), self.modality_label)
    }

    /// The filename suffix without the modality label, e.g. `_acq-abc_dir-AP`.
    pub fn suffix_no_modality(&self) -> String {
        self.custom_labels.prefixed()
    }

    /// The symbolic `id` other descriptions can reference in `IntendedFor`.
    pub fn id(&self) -> Option<&str> {
        self.data.get("id").and_then(Value::as_str)
    }
}

impl Hash for Description {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // JSON values aren't hashable; hashing a subset of the fields that
        // `PartialEq` compares is still consistent with it.
        self.index.hash(state);
        self.data_type.hash(state);
        self.modality_label.hash(state);
        self.custom_labels.hash(state);
    }
}

fn prefix_underscore(value: &str) -> String {
    if value.trim().is_empty() {
        return String::new();
    }
    match value.starts_with('_') {
        true => value.to_string(),
        false => format!("_{value}"),
    }
}

fn invalid(field: &'static str, value: &Value) -> ErrorKind {
    ErrorKind::InvalidField { field, value: value.to_string() }
}

fn custom_labels_from_object(map: &Data) -> Result<FilenameEntities> {
    let mut labels = FilenameEntities::new();
    for (key, value) in map {
        match value {
            Value::String(s) => labels.insert(key, s),
            Value::Number(n) => labels.insert(key, n.to_string()),
            other => exn::bail!(invalid(keys::CUSTOM_LABELS, other)),
        }
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use std::collections::hash_map::DefaultHasher;
    use std::ops::Deref;

    fn object(value: Value) -> Data {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[rstest]
    #[case("", "")]
    #[case("a", "_a")]
    #[case("_a", "_a")]
    #[case("  ", "")]
    fn test_new(#[case] label: &str, #[case] expected: &str) {
        let description = Description::new(0, DataType::Func, label)
            .with_custom_labels("dir-AP".parse::<FilenameEntities>().unwrap())
            .with_sidecar_changes(object(json!({"a": 1})))
            .with_intended_for(0)
            .with_data(object(json!({"b": 2})));
        assert_eq!(description.index, 0);
        assert_eq!(description.data_type, DataType::Func);
        assert_eq!(description.modality_label(), expected);
        assert_eq!(description.custom_labels().prefixed(), "_dir-AP");
        assert_eq!(description.sidecar_changes, object(json!({"a": 1})));
        assert_eq!(description.intended_for, Some(json!(0)));
        assert_eq!(description.data, object(json!({"b": 2})));
    }

    #[test]
    fn test_defaults() {
        let description = Description::new(3, DataType::Anat, "T1w");
        assert!(description.custom_labels().is_empty());
        assert!(description.sidecar_changes.is_empty());
        assert!(description.intended_for.is_none());
        assert!(description.data.is_empty());
        assert!(description.id().is_none());
    }

    #[rstest]
    #[case("", json!(""), "")]
    #[case("asl", json!(""), "_asl")]
    #[case("_asl", json!(""), "_asl")]
    #[case("", json!("dir-AP_acq-abc"), "_acq-abc_dir-AP")]
    #[case("", json!("_dir-AP_acq-abc"), "_acq-abc_dir-AP")]
    #[case("asl", json!("dir-AP_acq-abc"), "_acq-abc_dir-AP_asl")]
    #[case("_asl", json!("_dir-AP_acq-abc"), "_acq-abc_dir-AP_asl")]
    #[case("", json!({"dir": "AP", "acq": "abc"}), "_acq-abc_dir-AP")]
    #[case("asl", json!({"dir": "AP", "acq": "abc"}), "_acq-abc_dir-AP_asl")]
    #[case("_asl", json!({"dir": "AP", "acq": "abc", "run": 2}), "_acq-abc_dir-AP_run-2_asl")]
    fn test_suffix(#[case] modality: &str, #[case] labels: Value, #[case] expected: &str) {
        let entry = json!({"dataType": "func", "modalityLabel": modality, "customLabels": labels});
        let description = Description::from_value(0, entry).unwrap();
        assert_eq!(description.suffix(), expected);
        assert_eq!(description.suffix_no_modality(), description.custom_labels().prefixed());
    }

    #[test]
    fn test_from_map_minimum_keys() {
        let description = Description::from_value(1, json!({"dataType": "func", "modalityLabel": "mlab"})).unwrap();
        assert_eq!(description, Description::new(1, DataType::Func, "mlab"));
    }

    #[test]
    fn test_from_map_all_keys_with_extras() {
        let entry = json!({
            "dataType": "func",
            "modalityLabel": "mlab",
            "customLabels": "run-1",
            "sidecarChanges": {"a": 1},
            "IntendedFor": 0,
            "extra_key": "extra_value",
            "criteria": {"SeriesDescription": "*bold*"},
        });
        let expected = Description::new(4, DataType::Func, "mlab")
            .with_custom_labels(FilenameEntities::from([("run", "1")]))
            .with_sidecar_changes(object(json!({"a": 1})))
            .with_intended_for(0)
            .with_data(object(json!({"extra_key": "extra_value", "criteria": {"SeriesDescription": "*bold*"}})));
        let description = Description::from_value(4, entry).unwrap();
        assert_eq!(description, expected);
        assert_eq!(description.data.len(), 2);
    }

    #[test]
    fn test_from_map_null_intended_for_is_absent() {
        let description = Description::from_value(0, json!({"dataType": "anat", "IntendedFor": null})).unwrap();
        assert!(description.intended_for.is_none());
    }

    #[rstest]
    #[case(json!({}))]
    #[case(json!({"dataType": ""}))]
    #[case(json!({"dataType": "pet"}))]
    #[case(json!({"dataType": 1}))]
    fn test_from_map_invalid_data_type(#[case] entry: Value) {
        let err = Description::from_value(0, entry).unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::InvalidDataType(_)));
    }

    #[rstest]
    #[case(json!({"dataType": "anat", "modalityLabel": 1}))]
    #[case(json!({"dataType": "anat", "customLabels": "acq"}))]
    #[case(json!({"dataType": "anat", "customLabels": ["acq-1"]}))]
    #[case(json!({"dataType": "anat", "customLabels": {"acq": [1]}}))]
    #[case(json!({"dataType": "anat", "sidecarChanges": "x"}))]
    #[case(json!(["not", "an", "object"]))]
    fn test_from_map_invalid_fields(#[case] entry: Value) {
        let err = Description::from_value(0, entry).unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::InvalidField { .. }));
    }

    #[test]
    fn test_clone_is_deep() {
        let original = Description::new(4, DataType::Func, "mlab")
            .with_custom_labels(FilenameEntities::from([("run", "1")]))
            .with_sidecar_changes(object(json!({"a": 1})))
            .with_intended_for(json!([0]))
            .with_data(object(json!({"b": "2"})));
        let mut copy = original.clone();
        assert_eq!(original, copy);

        copy.sidecar_changes.insert("a".into(), json!(11));
        if let Some(Value::Array(items)) = copy.intended_for.as_mut() {
            items.push(json!(1));
        }
        copy.data.insert("b".into(), json!(22));
        copy.set_custom_label("run", "2");

        assert_eq!(original.sidecar_changes["a"], json!(1));
        assert_eq!(original.intended_for, Some(json!([0])));
        assert_eq!(original.data["b"], json!("2"));
        assert_eq!(original.custom_labels().get("run"), Some("1"));
        assert_ne!(original, copy);
    }

    #[test]
    fn test_hash_agrees_with_eq() {
        let hash = |d: &Description| {
            let mut hasher = DefaultHasher::new();
            d.hash(&mut hasher);
            hasher.finish()
        };
        let a = Description::new(0, DataType::Func, "bold").with_custom_labels(FilenameEntities::from([("x", "1"), ("y", "2")]));
        let b = Description::new(0, DataType::Func, "bold").with_custom_labels(FilenameEntities::from([("y", "2"), ("x", "1")]));
        assert_eq!(a, b);
        assert_eq!(hash(&a), hash(&b));
    }

    #[test]
    fn test_id() {
        let description = Description::new(0, DataType::Func, "bold").with_data(object(json!({"id": "rest"})));
        assert_eq!(description.id(), Some("rest"));
    }
}
