//! Field projection: attribute sets to request payloads and back.
//!
//! Encoding walks the schema, not the attribute set, so only declared,
//! sendable fields ever reach the wire. Decoding applies the type
//! coercions real backends need (numeric strings for int fields) and
//! tolerates omitted computed fields.

use std::collections::BTreeSet;

use serde_json::json;

use crate::attrs::{AttributeSet, Value};
use crate::error::{ReconcileError, Result};
use crate::schema::{FieldKind, FieldSpec, Mutability, ResourceSchema};

/// Encode desired attributes into a request body.
///
/// When `mask` is given (update requests) only covered top-level fields
/// are projected; a masked field absent from `attrs` encodes as JSON
/// null, which is the wire form of "clear this field".
pub fn encode(
    schema: &ResourceSchema,
    attrs: &AttributeSet,
    mask: Option<&BTreeSet<String>>,
) -> Result<serde_json::Value> {
    let mut obj = serde_json::Map::new();
    for spec in &schema.fields {
        if !spec.is_sendable() {
            continue;
        }
        let covered = mask.map_or(true, |m| mask_covers(m, &spec.name));
        if !covered {
            continue;
        }
        let value = attrs.get(&spec.name).cloned().or_else(|| spec.default.clone());
        match value {
            Some(v) => {
                obj.insert(spec.api_name.clone(), encode_value(&spec.kind, &v, &spec.name)?);
            }
            None => {
                if mask.is_some() {
                    obj.insert(spec.api_name.clone(), serde_json::Value::Null);
                }
                // Create path: absent with no default means "unset" or
                // "server default" - either way nothing is sent.
            }
        }
    }
    Ok(serde_json::Value::Object(obj))
}

/// Decode an API response body into an attribute set.
///
/// Fields the response omits stay unset - some backends drop
/// default-valued and computed fields from reads, and that must not
/// error. Unknown response keys are ignored.
pub fn decode(schema: &ResourceSchema, body: &serde_json::Value) -> Result<AttributeSet> {
    let obj = body.as_object().ok_or_else(|| ReconcileError::TypeMismatch {
        path: String::new(),
        expected: "object".into(),
        got: json_kind(body).into(),
    })?;
    let mut attrs = AttributeSet::new();
    for spec in &schema.fields {
        match obj.get(&spec.api_name) {
            None | Some(serde_json::Value::Null) => {}
            Some(v) => {
                let decoded = decode_value(&spec.kind, v, &spec.name)?;
                attrs.insert(&spec.name, decoded)?;
            }
        }
    }
    Ok(attrs)
}

/// Check desired state against the schema before planning: every field
/// must be declared, type-correct, not computed-only, and required
/// fields must be present or defaulted.
pub fn validate(schema: &ResourceSchema, desired: &AttributeSet) -> Result<()> {
    for (name, value) in desired.iter() {
        let spec = schema.field(name).ok_or_else(|| {
            ReconcileError::Validation(format!(
                "unknown field `{name}` for resource `{}`",
                schema.type_name
            ))
        })?;
        if spec.mutability == Mutability::ComputedOnly {
            return Err(ReconcileError::Validation(format!(
                "field `{name}` is computed by the server and cannot be set"
            )));
        }
        encode_value(&spec.kind, value, name)?;
    }
    for spec in &schema.fields {
        if spec.required && !desired.contains(&spec.name) && spec.default.is_none() {
            return Err(ReconcileError::MissingField {
                path: spec.name.clone(),
                context: "desired state".into(),
            });
        }
    }
    Ok(())
}

/// True if the mask names this top-level field or any path beneath it.
pub fn mask_covers(mask: &BTreeSet<String>, field: &str) -> bool {
    mask.iter().any(|p| {
        p == field
            || p.strip_prefix(field)
                .map_or(false, |rest| rest.starts_with('.') || rest.starts_with('['))
    })
}

fn encode_value(kind: &FieldKind, value: &Value, path: &str) -> Result<serde_json::Value> {
    match (kind, value) {
        (FieldKind::String, Value::String(s)) => Ok(json!(s)),
        (FieldKind::Int, Value::Int(i)) => Ok(json!(i)),
        (FieldKind::Bool, Value::Bool(b)) => Ok(json!(b)),
        (FieldKind::Float { .. }, Value::Float(f)) => Ok(json!(f)),
        (FieldKind::Float { .. }, Value::Int(i)) => Ok(json!(*i as f64)),
        (FieldKind::List(inner), Value::List(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                out.push(encode_value(inner, item, &format!("{path}[{i}]"))?);
            }
            Ok(serde_json::Value::Array(out))
        }
        (FieldKind::Map(inner), Value::Map(map)) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                out.insert(k.clone(), encode_value(inner, v, &format!("{path}.{k}"))?);
            }
            Ok(serde_json::Value::Object(out))
        }
        (FieldKind::Object(fields), Value::Map(map)) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                let spec = fields.iter().find(|f| &f.name == k).ok_or_else(|| {
                    ReconcileError::Validation(format!("unknown field `{path}.{k}`"))
                })?;
                if !spec.is_sendable() {
                    continue;
                }
                out.insert(
                    spec.api_name.clone(),
                    encode_value(&spec.kind, v, &format!("{path}.{k}"))?,
                );
            }
            // Fill declared defaults the caller left out.
            for spec in fields {
                if spec.is_sendable() && !map.contains_key(&spec.name) {
                    if let Some(default) = &spec.default {
                        out.insert(
                            spec.api_name.clone(),
                            encode_value(&spec.kind, default, &format!("{path}.{}", spec.name))?,
                        );
                    }
                }
            }
            Ok(serde_json::Value::Object(out))
        }
        (kind, value) => Err(ReconcileError::TypeMismatch {
            path: path.to_string(),
            expected: kind.name().into(),
            got: value.kind_name().into(),
        }),
    }
}

fn decode_value(kind: &FieldKind, json: &serde_json::Value, path: &str) -> Result<Value> {
    let mismatch = || ReconcileError::TypeMismatch {
        path: path.to_string(),
        expected: kind.name().into(),
        got: json_kind(json).into(),
    };
    match kind {
        FieldKind::String => json
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(mismatch),
        FieldKind::Int => match json {
            serde_json::Value::Number(n) => {
                // Integers must round-trip exactly; a fractional number
                // is a mismatch, never a truncation.
                n.as_i64().map(Value::Int).ok_or_else(mismatch)
            }
            serde_json::Value::String(s) => {
                s.parse::<i64>().map(Value::Int).map_err(|_| mismatch())
            }
            _ => Err(mismatch()),
        },
        FieldKind::Bool => match json {
            serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
            serde_json::Value::String(s) => match s.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(mismatch()),
            },
            _ => Err(mismatch()),
        },
        FieldKind::Float { .. } => match json {
            serde_json::Value::Number(n) => n.as_f64().map(Value::Float).ok_or_else(mismatch),
            serde_json::Value::String(s) => {
                s.parse::<f64>().map(Value::Float).map_err(|_| mismatch())
            }
            _ => Err(mismatch()),
        },
        FieldKind::List(inner) => {
            let items = json.as_array().ok_or_else(mismatch)?;
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                out.push(decode_value(inner, item, &format!("{path}[{i}]"))?);
            }
            Ok(Value::List(out))
        }
        FieldKind::Map(inner) => {
            let obj = json.as_object().ok_or_else(mismatch)?;
            let mut out = std::collections::BTreeMap::new();
            for (k, v) in obj {
                out.insert(k.clone(), decode_value(inner, v, &format!("{path}.{k}"))?);
            }
            Ok(Value::Map(out))
        }
        FieldKind::Object(fields) => {
            let obj = json.as_object().ok_or_else(mismatch)?;
            let mut out = std::collections::BTreeMap::new();
            for spec in fields {
                match obj.get(&spec.api_name) {
                    None | Some(serde_json::Value::Null) => {}
                    Some(v) => {
                        out.insert(
                            spec.name.clone(),
                            decode_value(&spec.kind, v, &format!("{path}.{}", spec.name))?,
                        );
                    }
                }
            }
            Ok(Value::Map(out))
        }
    }
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
