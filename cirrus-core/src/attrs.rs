//! Attribute sets: typed, path-addressable resource state.
//!
//! An [`AttributeSet`] holds either desired configuration or observed
//! remote state for one resource. Fields are addressed by dot/bracket
//! paths (`settings.tier`, `disks[0].size_gb`). Sets are built once per
//! reconciliation pass and not mutated afterwards.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ReconcileError, Result};

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Human-readable kind name, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Render a scalar for identifier/URL substitution.
    pub fn render(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::List(_) | Value::Map(_) => None,
        }
    }

    /// Convert a JSON value. Returns `None` for JSON null (absent
    /// field). A null inside a list is rejected: dropping it would
    /// shift later indices, and element order is significant.
    pub fn from_json(json: &serde_json::Value) -> Result<Option<Value>> {
        match json {
            serde_json::Value::Null => Ok(None),
            serde_json::Value::Bool(b) => Ok(Some(Value::Bool(*b))),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Some(Value::Int(i)))
                } else {
                    Ok(n.as_f64().map(Value::Float))
                }
            }
            serde_json::Value::String(s) => Ok(Some(Value::String(s.clone()))),
            serde_json::Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match Value::from_json(item)? {
                        Some(v) => out.push(v),
                        None => {
                            return Err(ReconcileError::Validation(
                                "null element inside a list".to_string(),
                            ))
                        }
                    }
                }
                Ok(Some(Value::List(out)))
            }
            serde_json::Value::Object(map) => {
                let mut out = BTreeMap::new();
                for (k, v) in map {
                    if let Some(v) = Value::from_json(v)? {
                        out.insert(k.clone(), v);
                    }
                }
                Ok(Some(Value::Map(out)))
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Value::from(*f),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// One segment of a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSeg {
    Key(String),
    Index(usize),
}

/// Parse a dot/bracket path into segments. `disks[0].size_gb` becomes
/// `[Key("disks"), Index(0), Key("size_gb")]`.
pub fn parse_path(path: &str) -> Result<Vec<PathSeg>> {
    let mut segs = Vec::new();
    for part in path.split('.') {
        if part.is_empty() {
            return Err(ReconcileError::Validation(format!(
                "empty segment in field path `{path}`"
            )));
        }
        let mut rest = part;
        if let Some(open) = rest.find('[') {
            let key = &rest[..open];
            if !key.is_empty() {
                segs.push(PathSeg::Key(key.to_string()));
            }
            rest = &rest[open..];
            while let Some(stripped) = rest.strip_prefix('[') {
                let close = stripped.find(']').ok_or_else(|| {
                    ReconcileError::Validation(format!("unclosed `[` in field path `{path}`"))
                })?;
                let idx: usize = stripped[..close].parse().map_err(|_| {
                    ReconcileError::Validation(format!(
                        "non-numeric index in field path `{path}`"
                    ))
                })?;
                segs.push(PathSeg::Index(idx));
                rest = &stripped[close + 1..];
            }
            if !rest.is_empty() {
                return Err(ReconcileError::Validation(format!(
                    "malformed field path `{path}`"
                )));
            }
        } else {
            segs.push(PathSeg::Key(rest.to_string()));
        }
    }
    Ok(segs)
}

/// An ordered, path-addressable set of attributes for one resource.
///
/// Top-level entries are sorted by field name; nested lists preserve
/// element order, nested maps sort by key. Iteration is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSet {
    entries: BTreeMap<String, Value>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over top-level fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Insert a value at a (possibly nested) field path, creating
    /// intermediate maps and list slots as needed.
    pub fn insert(&mut self, path: &str, value: Value) -> Result<()> {
        let segs = parse_path(path)?;
        let (first, rest) = match segs.split_first() {
            Some((PathSeg::Key(k), rest)) => (k.clone(), rest),
            _ => {
                return Err(ReconcileError::Validation(format!(
                    "field path `{path}` must start with a field name"
                )))
            }
        };
        if rest.is_empty() {
            self.entries.insert(first, value);
            return Ok(());
        }
        let slot = self
            .entries
            .entry(first)
            .or_insert_with(|| container_for(&rest[0]));
        insert_nested(slot, rest, value, path)
    }

    /// Look up a value by field path. Returns `None` when any segment
    /// along the way is absent.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let segs = parse_path(path).ok()?;
        let (first, rest) = match segs.split_first() {
            Some((PathSeg::Key(k), rest)) => (k, rest),
            _ => return None,
        };
        let mut cur = self.entries.get(first.as_str())?;
        for seg in rest {
            cur = match (seg, cur) {
                (PathSeg::Key(k), Value::Map(m)) => m.get(k)?,
                (PathSeg::Index(i), Value::List(items)) => items.get(*i)?,
                _ => return None,
            };
        }
        Some(cur)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Flatten to leaf paths. Scalars become leaves; empty lists and
    /// maps are leaves themselves so their presence still diffs.
    pub fn flatten(&self) -> BTreeMap<String, Value> {
        let mut out = BTreeMap::new();
        for (name, value) in &self.entries {
            flatten_into(name, value, &mut out);
        }
        out
    }

    /// Build from a JSON object. Null fields are treated as absent.
    pub fn from_json(json: &serde_json::Value) -> Result<AttributeSet> {
        let obj = json.as_object().ok_or_else(|| {
            ReconcileError::Validation(format!(
                "expected a JSON object for attributes, got {json}"
            ))
        })?;
        let mut entries = BTreeMap::new();
        for (k, v) in obj {
            if let Some(v) = Value::from_json(v)? {
                entries.insert(k.clone(), v);
            }
        }
        Ok(AttributeSet { entries })
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    /// Overlay `other` on top of `self`: fields present in `other` win,
    /// fields only in `self` are kept. Used to merge decoded server
    /// state over desired state after an apply.
    pub fn merged_with(&self, other: &AttributeSet) -> AttributeSet {
        let mut entries = self.entries.clone();
        for (k, v) in &other.entries {
            entries.insert(k.clone(), v.clone());
        }
        AttributeSet { entries }
    }
}

impl FromIterator<(String, Value)> for AttributeSet {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        AttributeSet {
            entries: iter.into_iter().collect(),
        }
    }
}

fn container_for(seg: &PathSeg) -> Value {
    match seg {
        PathSeg::Key(_) => Value::Map(BTreeMap::new()),
        PathSeg::Index(_) => Value::List(Vec::new()),
    }
}

fn insert_nested(slot: &mut Value, segs: &[PathSeg], value: Value, full: &str) -> Result<()> {
    let (seg, rest) = segs.split_first().expect("insert_nested called with segments");
    match seg {
        PathSeg::Key(k) => {
            let map = match slot {
                Value::Map(m) => m,
                other => {
                    return Err(ReconcileError::Validation(format!(
                        "cannot descend into {} at `{full}`",
                        other.kind_name()
                    )))
                }
            };
            if rest.is_empty() {
                map.insert(k.clone(), value);
                Ok(())
            } else {
                let next = map.entry(k.clone()).or_insert_with(|| container_for(&rest[0]));
                insert_nested(next, rest, value, full)
            }
        }
        PathSeg::Index(i) => {
            let list = match slot {
                Value::List(items) => items,
                other => {
                    return Err(ReconcileError::Validation(format!(
                        "cannot index into {} at `{full}`",
                        other.kind_name()
                    )))
                }
            };
            while list.len() <= *i {
                list.push(container_for(
                    rest.first().unwrap_or(&PathSeg::Key(String::new())),
                ));
            }
            if rest.is_empty() {
                list[*i] = value;
                Ok(())
            } else {
                insert_nested(&mut list[*i], rest, value, full)
            }
        }
    }
}

fn flatten_into(prefix: &str, value: &Value, out: &mut BTreeMap<String, Value>) {
    match value {
        Value::List(items) if !items.is_empty() => {
            for (i, item) in items.iter().enumerate() {
                flatten_into(&format!("{prefix}[{i}]"), item, out);
            }
        }
        Value::Map(map) if !map.is_empty() => {
            for (k, v) in map {
                flatten_into(&format!("{prefix}.{k}"), v, out);
            }
        }
        other => {
            out.insert(prefix.to_string(), other.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_nested_path() {
        let segs = parse_path("disks[0].size_gb").unwrap();
        assert_eq!(
            segs,
            vec![
                PathSeg::Key("disks".into()),
                PathSeg::Index(0),
                PathSeg::Key("size_gb".into()),
            ]
        );
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(parse_path("a..b").is_err());
        assert!(parse_path("a[x]").is_err());
        assert!(parse_path("a[1").is_err());
    }

    #[test]
    fn insert_and_get_nested() {
        let mut attrs = AttributeSet::new();
        attrs.insert("settings.tier", "db-f1-micro".into()).unwrap();
        attrs.insert("settings.disk_size", Value::Int(10)).unwrap();
        attrs.insert("name", "primary".into()).unwrap();

        assert_eq!(attrs.get("name").unwrap().as_str(), Some("primary"));
        assert_eq!(
            attrs.get("settings.tier").unwrap().as_str(),
            Some("db-f1-micro")
        );
        assert_eq!(attrs.get("settings.disk_size").unwrap().as_int(), Some(10));
        assert!(attrs.get("settings.missing").is_none());
    }

    #[test]
    fn insert_list_elements() {
        let mut attrs = AttributeSet::new();
        attrs.insert("disks[0].size_gb", Value::Int(10)).unwrap();
        attrs.insert("disks[1].size_gb", Value::Int(20)).unwrap();

        assert_eq!(attrs.get("disks[1].size_gb").unwrap().as_int(), Some(20));
        let flat = attrs.flatten();
        assert_eq!(flat.get("disks[0].size_gb"), Some(&Value::Int(10)));
        assert_eq!(flat.get("disks[1].size_gb"), Some(&Value::Int(20)));
    }

    #[test]
    fn flatten_keeps_empty_containers_as_leaves() {
        let mut attrs = AttributeSet::new();
        attrs.insert("labels", Value::Map(BTreeMap::new())).unwrap();
        let flat = attrs.flatten();
        assert_eq!(flat.get("labels"), Some(&Value::Map(BTreeMap::new())));
    }

    #[test]
    fn json_roundtrip() {
        let json = serde_json::json!({
            "name": "r1",
            "throughput_capacity": 4,
            "nested": {"a": true, "b": [1, 2]},
            "ignored": null,
        });
        let attrs = AttributeSet::from_json(&json).unwrap();
        assert!(attrs.get("ignored").is_none());
        assert_eq!(attrs.get("nested.b[1]").unwrap().as_int(), Some(2));

        let back = attrs.to_json();
        assert_eq!(back["nested"]["a"], serde_json::json!(true));
        assert_eq!(back["throughput_capacity"], serde_json::json!(4));
    }

    #[test]
    fn null_list_element_is_rejected() {
        let json = serde_json::json!({"disks": [{"size_gb": 10}, null]});
        let err = AttributeSet::from_json(&json).unwrap_err();
        assert!(matches!(err, ReconcileError::Validation(_)));
    }

    #[test]
    fn merge_overlays_server_fields() {
        let mut desired = AttributeSet::new();
        desired.insert("name", "r1".into()).unwrap();
        desired.insert("tier", "small".into()).unwrap();

        let mut observed = AttributeSet::new();
        observed.insert("id", "projects/p/r1".into()).unwrap();
        observed.insert("tier", "small".into()).unwrap();

        let merged = desired.merged_with(&observed);
        assert_eq!(merged.get("name").unwrap().as_str(), Some("r1"));
        assert_eq!(merged.get("id").unwrap().as_str(), Some("projects/p/r1"));
    }
}
