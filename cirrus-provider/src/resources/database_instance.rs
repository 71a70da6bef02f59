//! AlloyDB database instance data source: read-only projection of an
//! instance inside a cluster.

use cirrus_core::{FieldKind, FieldSpec, Mutability, ResourceSchema, RestLayout};

pub fn schema() -> ResourceSchema {
    ResourceSchema {
        type_name: "alloydb_database_instance".into(),
        fields: vec![
            FieldSpec::new("instance_id", FieldKind::String, Mutability::Immutable).required(),
            FieldSpec::new("cluster_id", FieldKind::String, Mutability::Immutable).required(),
            FieldSpec::new("project", FieldKind::String, Mutability::Immutable)
                .server_defaulted(),
            FieldSpec::new("location", FieldKind::String, Mutability::Immutable)
                .server_defaulted(),
            FieldSpec::new("instance_type", FieldKind::String, Mutability::ComputedOnly),
            FieldSpec::new("availability_type", FieldKind::String, Mutability::ComputedOnly),
            FieldSpec::new("ip_address", FieldKind::String, Mutability::ComputedOnly),
            FieldSpec::new("state", FieldKind::String, Mutability::ComputedOnly),
            FieldSpec::new(
                "machine_config",
                FieldKind::Object(vec![FieldSpec::new(
                    "cpu_count",
                    FieldKind::Int,
                    Mutability::ComputedOnly,
                )]),
                Mutability::ComputedOnly,
            ),
            FieldSpec::new(
                "labels",
                FieldKind::Map(Box::new(FieldKind::String)),
                Mutability::ComputedOnly,
            ),
        ],
        rest: RestLayout {
            collection: String::new(),
            resource:
                "projects/{{project}}/locations/{{location}}/clusters/{{cluster_id}}/instances/{{instance_id}}"
                    .into(),
            ..RestLayout::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cirrus_core::projection::decode;
    use cirrus_core::{template, AttributeSet};

    #[test]
    fn identifier_includes_cluster_and_instance() {
        let schema = schema();
        let mut args = AttributeSet::new();
        args.insert("project", "p1".into()).unwrap();
        args.insert("location", "us-central1".into()).unwrap();
        args.insert("cluster_id", "c1".into()).unwrap();
        args.insert("instance_id", "i1".into()).unwrap();

        let id = template::render(&schema.rest.resource, &schema, &args).unwrap();
        assert_eq!(
            id,
            "projects/p1/locations/us-central1/clusters/c1/instances/i1"
        );
    }

    #[test]
    fn decodes_machine_config() {
        let schema = schema();
        let body = serde_json::json!({
            "instanceType": "PRIMARY",
            "state": "READY",
            "machineConfig": {"cpuCount": 4},
            "labels": {"env": "prod"}
        });
        let attrs = decode(&schema, &body).unwrap();
        assert_eq!(attrs.get("machine_config.cpu_count").unwrap().as_int(), Some(4));
        assert_eq!(attrs.get("labels.env").unwrap().as_str(), Some("prod"));
    }
}
