//! Test fixtures for warehouse adapter integration tests
//!
//! Schemas shaped like real BigQuery `tables.get` responses, including
//! properties the adapters must carry through untouched.

use docsync_core::{SchemaField, TableSchema};
use serde_json::json;

/// A typical customers table
///
/// - Required primary key
/// - PII column guarded by a policy tag
/// - Nullable free-text column without a description
pub fn customers_schema() -> TableSchema {
    TableSchema::from_fields(vec![
        SchemaField::new("customer_id")
            .with_type("INTEGER")
            .with_property("mode", json!("REQUIRED"))
            .with_description("Surrogate key"),
        SchemaField::new("email")
            .with_type("STRING")
            .with_property("mode", json!("NULLABLE"))
            .with_property(
                "policyTags",
                json!({ "names": ["projects/acme/locations/us/taxonomies/1/policyTags/7"] }),
            )
            .with_description("Contact address"),
        SchemaField::new("notes")
            .with_type("STRING")
            .with_property("mode", json!("NULLABLE")),
    ])
}

/// An orders table with a repeated nested record
pub fn orders_schema() -> TableSchema {
    TableSchema::from_fields(vec![
        SchemaField::new("order_id")
            .with_type("STRING")
            .with_property("mode", json!("REQUIRED")),
        SchemaField::new("amount")
            .with_type("NUMERIC")
            .with_property("precision", json!("10"))
            .with_property("scale", json!("2")),
        SchemaField::new("line_items")
            .with_type("RECORD")
            .with_property("mode", json!("REPEATED"))
            .with_property(
                "fields",
                json!([
                    { "name": "sku", "type": "STRING", "description": "Stock keeping unit" },
                    { "name": "quantity", "type": "INTEGER" }
                ]),
            ),
    ])
}

/// A raw `tables.get`-style schema payload
pub fn raw_bigquery_schema() -> serde_json::Value {
    json!({
        "fields": [
            { "name": "id", "type": "INTEGER", "mode": "REQUIRED" },
            { "name": "status", "type": "STRING", "mode": "NULLABLE", "description": "Order status",
              "maxLength": "32", "defaultValueExpression": "'pending'" }
        ]
    })
}
