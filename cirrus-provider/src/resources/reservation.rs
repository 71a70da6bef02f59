//! Pub/Sub Lite reservation: a named pool of throughput capacity.
//!
//! Only `throughput_capacity` may change in place; everything naming
//! the reservation recreates it.

use cirrus_core::{FieldKind, FieldSpec, Mutability, ResourceSchema, RestLayout, UpdateVerb};

pub fn schema() -> ResourceSchema {
    ResourceSchema {
        type_name: "pubsub_lite_reservation".into(),
        fields: vec![
            FieldSpec::new("name", FieldKind::String, Mutability::Immutable).required(),
            FieldSpec::new("throughput_capacity", FieldKind::Int, Mutability::Updatable)
                .required(),
            FieldSpec::new("region", FieldKind::String, Mutability::Immutable)
                .server_defaulted(),
            FieldSpec::new("project", FieldKind::String, Mutability::Immutable)
                .server_defaulted(),
            FieldSpec::new("id", FieldKind::String, Mutability::ComputedOnly),
        ],
        rest: RestLayout {
            collection:
                "projects/{{project}}/locations/{{region}}/reservations?reservationId={{name}}"
                    .into(),
            resource: "projects/{{project}}/locations/{{region}}/reservations/{{name}}".into(),
            update: None,
            delete: None,
            update_verb: UpdateVerb::Patch,
            update_mask_param: Some("updateMask".into()),
            read_after_write: false,
            async_operations: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cirrus_core::{plan, AttributeSet, Operation, Value};

    fn reservation(capacity: i64) -> AttributeSet {
        let mut attrs = AttributeSet::new();
        attrs.insert("name", "r1".into()).unwrap();
        attrs.insert("project", "p1".into()).unwrap();
        attrs.insert("region", "us-central1".into()).unwrap();
        attrs.insert("throughput_capacity", Value::Int(capacity)).unwrap();
        attrs
    }

    #[test]
    fn capacity_change_updates_in_place() {
        let schema = schema();
        let op = plan(&schema, &reservation(4), Some(&reservation(2))).unwrap();
        match op {
            Operation::Update { field_mask } => {
                assert!(field_mask.contains("throughput_capacity"));
            }
            other => panic!("expected update, got {other}"),
        }
    }

    #[test]
    fn rename_forces_replace() {
        let schema = schema();
        let mut desired = reservation(2);
        desired.insert("name", "r2".into()).unwrap();
        assert_eq!(
            plan(&schema, &desired, Some(&reservation(2))).unwrap(),
            Operation::Replace
        );
    }

    #[test]
    fn computed_id_never_encodes() {
        let schema = schema();
        let mut attrs = reservation(2);
        attrs.insert("name", "r1".into()).unwrap();
        let body = cirrus_core::projection::encode(&schema, &attrs, None).unwrap();
        assert!(body.get("id").is_none());
        assert_eq!(body["throughputCapacity"], serde_json::json!(2));
    }
}
