//! Resource schemas managed by this provider.
//!
//! Each module declares one resource (or read-only data source) as a
//! plain [`ResourceSchema`] value: field specs, mutability, and the
//! REST layout its backend expects.

pub mod access_label;
pub mod database_instance;
pub mod management_server;
pub mod reservation;
pub mod sql_user;

use cirrus_core::ResourceSchema;

/// Look up a managed resource schema by type name.
pub fn schema_for(type_name: &str) -> Option<ResourceSchema> {
    match type_name {
        "sql_user" => Some(sql_user::schema()),
        "pubsub_lite_reservation" => Some(reservation::schema()),
        "data_access_label" => Some(access_label::schema()),
        _ => None,
    }
}

/// Look up a read-only data source schema by type name.
pub fn data_source_for(type_name: &str) -> Option<ResourceSchema> {
    match type_name {
        "management_server" => Some(management_server::schema()),
        "alloydb_database_instance" => Some(database_instance::schema()),
        _ => None,
    }
}

/// All managed resource type names, for CLI help and validation.
pub fn resource_names() -> &'static [&'static str] {
    &["sql_user", "pubsub_lite_reservation", "data_access_label"]
}

/// All data source type names.
pub fn data_source_names() -> &'static [&'static str] {
    &["management_server", "alloydb_database_instance"]
}
