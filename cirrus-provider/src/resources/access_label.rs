//! Data access label: a named UDM query scoping what an analyst may
//! see inside an instance. Label id and its containing instance are
//! fixed at creation; the query and description evolve in place.

use cirrus_core::{FieldKind, FieldSpec, Mutability, ResourceSchema, RestLayout, UpdateVerb};

pub fn schema() -> ResourceSchema {
    ResourceSchema {
        type_name: "data_access_label".into(),
        fields: vec![
            FieldSpec::new("data_access_label_id", FieldKind::String, Mutability::Immutable)
                .required(),
            FieldSpec::new("project", FieldKind::String, Mutability::Immutable)
                .server_defaulted(),
            FieldSpec::new("location", FieldKind::String, Mutability::Immutable)
                .server_defaulted(),
            FieldSpec::new("instance", FieldKind::String, Mutability::Immutable).required(),
            FieldSpec::new("udm_query", FieldKind::String, Mutability::Updatable).required(),
            FieldSpec::new("description", FieldKind::String, Mutability::Updatable),
            FieldSpec::new("display_name", FieldKind::String, Mutability::Updatable),
            FieldSpec::new("author", FieldKind::String, Mutability::ComputedOnly),
            FieldSpec::new("create_time", FieldKind::String, Mutability::ComputedOnly),
            FieldSpec::new("update_time", FieldKind::String, Mutability::ComputedOnly),
        ],
        rest: RestLayout {
            collection: "projects/{{project}}/locations/{{location}}/instances/{{instance}}/dataAccessLabels?dataAccessLabelId={{data_access_label_id}}".into(),
            resource: "projects/{{project}}/locations/{{location}}/instances/{{instance}}/dataAccessLabels/{{data_access_label_id}}".into(),
            update: None,
            delete: None,
            update_verb: UpdateVerb::Patch,
            update_mask_param: Some("updateMask".into()),
            read_after_write: false,
            async_operations: false,
        },
    }
}
