//! Diff & plan engine: classify desired vs. observed state into one
//! operation per reconciliation pass.

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use crate::attrs::{AttributeSet, Value};
use crate::error::Result;
use crate::schema::{FieldKind, Mutability, ResourceSchema};

/// The single operation a reconciliation pass will perform.
///
/// At most one non-`NoOp` classification per pass; `Replace` subsumes
/// every field-level diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update { field_mask: BTreeSet<String> },
    Replace,
    Delete,
    NoOp,
}

impl Operation {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update { .. } => "update",
            Operation::Replace => "replace",
            Operation::Delete => "delete",
            Operation::NoOp => "no-op",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Update { field_mask } => {
                write!(f, "update (mask: ")?;
                for (i, path) in field_mask.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{path}")?;
                }
                write!(f, ")")
            }
            other => write!(f, "{}", other.kind_name()),
        }
    }
}

/// Compare desired against observed state and emit the operation.
///
/// `observed = None` is the "does not exist" sentinel and always plans
/// a create. Drift in computed-only fields is server-owned and ignored.
pub fn plan(
    schema: &ResourceSchema,
    desired: &AttributeSet,
    observed: Option<&AttributeSet>,
) -> Result<Operation> {
    let observed = match observed {
        Some(o) => o,
        None => return Ok(Operation::Create),
    };

    let desired_flat = desired.flatten();
    let observed_flat = observed.flatten();

    let mut changed: BTreeSet<String> = BTreeSet::new();
    let mut forces_replace = false;

    let paths: BTreeSet<&String> = desired_flat.keys().chain(observed_flat.keys()).collect();
    for path in paths {
        let mutability = match schema.mutability_of(path) {
            Some(m) => m,
            // Paths the schema does not describe are server-owned.
            None => continue,
        };
        if mutability == Mutability::ComputedOnly {
            continue;
        }

        let d = desired_flat.get(path.as_str());
        let o = observed_flat.get(path.as_str());
        let default = schema.spec_for_path(path).and_then(|s| s.default.as_ref());

        let differs = match (d, o) {
            (Some(d), Some(o)) => !values_equal(schema, path, d, o),
            // Present in desired, absent from observed: unchanged when
            // the declared default equals the desired value, otherwise
            // the server is missing it. Prevents spurious update loops
            // against backends that omit default-valued fields.
            (Some(d), None) => default != Some(d),
            // Absent from desired, present in observed: unchanged when
            // the observed value is just the server-applied default,
            // otherwise this is a "clear" (or a replace if immutable).
            (None, Some(o)) => default != Some(o),
            (None, None) => false,
        };
        if !differs {
            continue;
        }
        debug!(path = %path, "field drifted");
        if mutability == Mutability::Immutable {
            forces_replace = true;
        } else {
            changed.insert(path.clone());
        }
    }

    if forces_replace {
        // The whole changed set is discarded; replace recreates from
        // desired state.
        return Ok(Operation::Replace);
    }
    if changed.is_empty() {
        return Ok(Operation::NoOp);
    }
    Ok(Operation::Update {
        field_mask: changed,
    })
}

/// Deep equality with the schema's numeric semantics: floats compare
/// within the field's declared epsilon, everything else exactly.
fn values_equal(schema: &ResourceSchema, path: &str, a: &Value, b: &Value) -> bool {
    if let Some(spec) = schema.spec_for_path(path) {
        if let FieldKind::Float { epsilon } = spec.kind {
            if let (Value::Float(x), Value::Float(y)) = (coerced(a), coerced(b)) {
                return (x - y).abs() <= epsilon;
            }
        }
    }
    a == b
}

fn coerced(v: &Value) -> Value {
    match v {
        Value::Int(i) => Value::Float(*i as f64),
        other => other.clone(),
    }
}
