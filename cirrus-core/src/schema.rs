//! Resource schemas: per-field metadata driving projection and diffing.
//!
//! A [`ResourceSchema`] is plain data, not codegen: a closed set of
//! [`FieldSpec`]s plus the REST layout (URL templates and verbs). All
//! type dispatch happens via exhaustive matching on [`FieldKind`].

use crate::attrs::{parse_path, PathSeg, Value};

/// How a field may change after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    /// Changing this field forces delete-then-recreate.
    Immutable,
    /// Changing this field is an in-place update.
    Updatable,
    /// Owned by the server; never sent, drift is not an error.
    ComputedOnly,
}

/// What absence of a field in desired state means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Absence {
    /// The field is simply unset; nothing is sent.
    Unset,
    /// The server applies its own default; reads may omit the field.
    ServerDefault,
}

/// The declared type of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String,
    Int,
    Bool,
    /// Floats compare equal within `epsilon` during diffing.
    Float { epsilon: f64 },
    /// Homogeneous list; element order is significant.
    List(Box<FieldKind>),
    /// String-keyed map with homogeneous values.
    Map(Box<FieldKind>),
    /// Nested object with its own field specs.
    Object(Vec<FieldSpec>),
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Int => "int",
            FieldKind::Bool => "bool",
            FieldKind::Float { .. } => "float",
            FieldKind::List(_) => "list",
            FieldKind::Map(_) => "map",
            FieldKind::Object(_) => "object",
        }
    }
}

/// Metadata for one field of a resource.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Field name in attribute sets (snake_case, path-relative).
    pub name: String,
    /// Wire name in API payloads (camelCase for Google-style APIs).
    pub api_name: String,
    pub kind: FieldKind,
    pub mutability: Mutability,
    /// Substituted when the field is absent from desired state.
    pub default: Option<Value>,
    pub absence: Absence,
    /// Must be present (or defaulted) in desired state.
    pub required: bool,
}

impl FieldSpec {
    pub fn new(name: &str, kind: FieldKind, mutability: Mutability) -> Self {
        FieldSpec {
            name: name.to_string(),
            api_name: camel_case(name),
            kind,
            mutability,
            default: None,
            absence: Absence::Unset,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self.absence = Absence::ServerDefault;
        self
    }

    pub fn with_api_name(mut self, api_name: &str) -> Self {
        self.api_name = api_name.to_string();
        self
    }

    pub fn server_defaulted(mut self) -> Self {
        self.absence = Absence::ServerDefault;
        self
    }

    /// Sendable fields appear in request payloads.
    pub fn is_sendable(&self) -> bool {
        self.mutability != Mutability::ComputedOnly
    }
}

/// HTTP verb used for in-place updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateVerb {
    Patch,
    Put,
}

/// URL templates and verbs for a resource's REST surface.
///
/// Templates use `{{field}}` placeholders resolved against the desired
/// attribute set (see [`crate::template`]). Paths are relative to the
/// provider's base URL.
#[derive(Debug, Clone)]
pub struct RestLayout {
    /// POST target for create.
    pub collection: String,
    /// Canonical resource path; doubles as the identifier template.
    pub resource: String,
    /// Override for update requests (defaults to `resource`).
    pub update: Option<String>,
    /// Override for delete requests (defaults to `resource`).
    pub delete: Option<String>,
    pub update_verb: UpdateVerb,
    /// Query parameter naming the update field mask, if the API wants one.
    pub update_mask_param: Option<String>,
    /// Mutation responses are operation envelopes, not the resource;
    /// re-read after a successful write.
    pub read_after_write: bool,
    /// Mutations return long-running operations that must be polled.
    pub async_operations: bool,
}

impl Default for RestLayout {
    fn default() -> Self {
        RestLayout {
            collection: String::new(),
            resource: String::new(),
            update: None,
            delete: None,
            update_verb: UpdateVerb::Patch,
            update_mask_param: None,
            read_after_write: false,
            async_operations: false,
        }
    }
}

/// Full schema for one resource type.
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    /// Type name, e.g. `sql_user`.
    pub type_name: String,
    pub fields: Vec<FieldSpec>,
    pub rest: RestLayout,
}

impl ResourceSchema {
    /// Look up the spec for a top-level field name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Resolve the spec governing a leaf path, descending through
    /// objects, lists, and maps. `disks[0].size_gb` resolves to the
    /// `size_gb` spec nested under `disks`. Returns `None` for paths
    /// the schema does not describe.
    pub fn spec_for_path(&self, path: &str) -> Option<&FieldSpec> {
        let segs = parse_path(path).ok()?;
        let mut iter = segs.iter();
        let first = match iter.next()? {
            PathSeg::Key(k) => k,
            PathSeg::Index(_) => return None,
        };
        let mut spec = self.field(first)?;
        for seg in iter {
            match (seg, &spec.kind) {
                // List elements are governed by the list's spec until a
                // Key segment resolves into an object element.
                (PathSeg::Index(_), FieldKind::List(_)) => continue,
                (PathSeg::Key(k), FieldKind::List(inner)) => {
                    if let FieldKind::Object(fields) = inner.as_ref() {
                        spec = fields.iter().find(|f| &f.name == k)?;
                    } else {
                        return None;
                    }
                }
                (PathSeg::Key(k), FieldKind::Object(fields)) => {
                    spec = fields.iter().find(|f| &f.name == k)?;
                }
                (PathSeg::Key(_), FieldKind::Map(_)) => {
                    // Map entries are governed by the map's spec.
                    continue;
                }
                _ => return None,
            }
        }
        Some(spec)
    }

    /// Effective mutability of a leaf path: an immutable ancestor makes
    /// every nested field immutable; a computed-only ancestor makes the
    /// subtree computed-only.
    pub fn mutability_of(&self, path: &str) -> Option<Mutability> {
        let segs = parse_path(path).ok()?;
        let mut iter = segs.iter();
        let first = match iter.next()? {
            PathSeg::Key(k) => k,
            PathSeg::Index(_) => return None,
        };
        let mut spec = self.field(first)?;
        let mut effective = spec.mutability;
        for seg in iter {
            match (seg, &spec.kind) {
                (PathSeg::Index(_), FieldKind::List(_)) => continue,
                (PathSeg::Key(k), FieldKind::List(inner)) => match inner.as_ref() {
                    FieldKind::Object(fields) => {
                        spec = fields.iter().find(|f| &f.name == k)?;
                        effective = combine(effective, spec.mutability);
                    }
                    _ => return None,
                },
                (PathSeg::Key(k), FieldKind::Object(fields)) => {
                    spec = fields.iter().find(|f| &f.name == k)?;
                    effective = combine(effective, spec.mutability);
                }
                (PathSeg::Key(_), FieldKind::Map(_)) => continue,
                _ => return None,
            }
        }
        Some(effective)
    }
}

fn combine(ancestor: Mutability, field: Mutability) -> Mutability {
    match (ancestor, field) {
        (Mutability::Immutable, _) | (_, Mutability::Immutable) => Mutability::Immutable,
        (Mutability::ComputedOnly, _) | (_, Mutability::ComputedOnly) => Mutability::ComputedOnly,
        _ => Mutability::Updatable,
    }
}

/// snake_case to camelCase, the default wire-name convention.
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ResourceSchema {
        ResourceSchema {
            type_name: "test".into(),
            fields: vec![
                FieldSpec::new("name", FieldKind::String, Mutability::Immutable).required(),
                FieldSpec::new(
                    "settings",
                    FieldKind::Object(vec![
                        FieldSpec::new("tier", FieldKind::String, Mutability::Updatable),
                        FieldSpec::new("version", FieldKind::String, Mutability::Immutable),
                    ]),
                    Mutability::Updatable,
                ),
                FieldSpec::new(
                    "disks",
                    FieldKind::List(Box::new(FieldKind::Object(vec![FieldSpec::new(
                        "size_gb",
                        FieldKind::Int,
                        Mutability::Updatable,
                    )]))),
                    Mutability::Immutable,
                ),
            ],
            rest: RestLayout::default(),
        }
    }

    #[test]
    fn camel_case_conversion() {
        assert_eq!(camel_case("throughput_capacity"), "throughputCapacity");
        assert_eq!(camel_case("name"), "name");
    }

    #[test]
    fn resolves_nested_specs() {
        let s = schema();
        assert_eq!(s.spec_for_path("settings.tier").unwrap().name, "tier");
        assert_eq!(s.spec_for_path("disks[0].size_gb").unwrap().name, "size_gb");
        assert!(s.spec_for_path("settings.unknown").is_none());
    }

    #[test]
    fn immutable_ancestor_wins() {
        let s = schema();
        assert_eq!(
            s.mutability_of("settings.tier"),
            Some(Mutability::Updatable)
        );
        assert_eq!(
            s.mutability_of("settings.version"),
            Some(Mutability::Immutable)
        );
        // disks is immutable, so nested size_gb is too.
        assert_eq!(
            s.mutability_of("disks[0].size_gb"),
            Some(Mutability::Immutable)
        );
    }
}
