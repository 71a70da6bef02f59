//! Management server data source: read-only lookup of a backup/DR
//! management server by name and location. Everything except the
//! lookup arguments is owned by the server.

use cirrus_core::{FieldKind, FieldSpec, Mutability, ResourceSchema, RestLayout};

pub fn schema() -> ResourceSchema {
    ResourceSchema {
        type_name: "management_server".into(),
        fields: vec![
            FieldSpec::new("name", FieldKind::String, Mutability::Immutable).required(),
            FieldSpec::new("project", FieldKind::String, Mutability::Immutable)
                .server_defaulted(),
            FieldSpec::new("location", FieldKind::String, Mutability::Immutable)
                .server_defaulted(),
            FieldSpec::new("server_type", FieldKind::String, Mutability::ComputedOnly)
                .with_api_name("type"),
            FieldSpec::new(
                "networks",
                FieldKind::List(Box::new(FieldKind::Object(vec![
                    FieldSpec::new("network", FieldKind::String, Mutability::ComputedOnly),
                    FieldSpec::new("peering_mode", FieldKind::String, Mutability::ComputedOnly),
                ]))),
                Mutability::ComputedOnly,
            ),
            FieldSpec::new(
                "management_uri",
                FieldKind::Object(vec![
                    FieldSpec::new("web_ui", FieldKind::String, Mutability::ComputedOnly),
                    FieldSpec::new("api", FieldKind::String, Mutability::ComputedOnly),
                ]),
                Mutability::ComputedOnly,
            ),
            FieldSpec::new("oauth2_client_id", FieldKind::String, Mutability::ComputedOnly),
            FieldSpec::new("state", FieldKind::String, Mutability::ComputedOnly),
        ],
        rest: RestLayout {
            collection: String::new(),
            resource:
                "projects/{{project}}/locations/{{location}}/managementServers/{{name}}".into(),
            ..RestLayout::default()
        },
    }
}
