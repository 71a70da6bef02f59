//! SQL database user.
//!
//! Users are identified by (project, instance, name, host); none of
//! those can change in place. The backend keys delete and update
//! requests on query parameters rather than a resource path, and its
//! mutations return long-running operations.

use cirrus_core::{FieldKind, FieldSpec, Mutability, ResourceSchema, RestLayout, UpdateVerb, Value};

pub fn schema() -> ResourceSchema {
    ResourceSchema {
        type_name: "sql_user".into(),
        fields: vec![
            FieldSpec::new("name", FieldKind::String, Mutability::Immutable).required(),
            FieldSpec::new("instance", FieldKind::String, Mutability::Immutable).required(),
            // Empty host means "any host" for postgres-style backends;
            // reads may omit it entirely.
            FieldSpec::new("host", FieldKind::String, Mutability::Immutable)
                .with_default(Value::String(String::new())),
            FieldSpec::new("project", FieldKind::String, Mutability::Immutable)
                .server_defaulted(),
            FieldSpec::new("password", FieldKind::String, Mutability::Updatable),
            FieldSpec::new("user_type", FieldKind::String, Mutability::Updatable)
                .with_api_name("type")
                .with_default(Value::String("BUILT_IN".into())),
            FieldSpec::new("sql_server_user_details", FieldKind::Object(vec![
                FieldSpec::new("disabled", FieldKind::Bool, Mutability::ComputedOnly),
                FieldSpec::new(
                    "server_roles",
                    FieldKind::List(Box::new(FieldKind::String)),
                    Mutability::ComputedOnly,
                ),
            ]), Mutability::ComputedOnly),
        ],
        rest: RestLayout {
            collection: "projects/{{project}}/instances/{{instance}}/users".into(),
            resource: "projects/{{project}}/instances/{{instance}}/users/{{name}}".into(),
            update: Some(
                "projects/{{project}}/instances/{{instance}}/users?name={{name}}&host={{host}}"
                    .into(),
            ),
            delete: Some(
                "projects/{{project}}/instances/{{instance}}/users?name={{name}}&host={{host}}"
                    .into(),
            ),
            update_verb: UpdateVerb::Put,
            update_mask_param: None,
            // Mutation responses are operation envelopes, never the user.
            read_after_write: true,
            async_operations: true,
        },
    }
}
