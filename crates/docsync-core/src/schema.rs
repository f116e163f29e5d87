//! Warehouse-side schema types
//!
//! Only `name` and `description` are interpreted. Every other field property
//! the warehouse returns (type, mode, policy tags, nested fields, ...) is
//! kept in [`SchemaField::extra`] and written back as it was received.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Identifies a table in a warehouse
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableIdentifier {
    /// Database/project name
    pub database: String,

    /// Schema/dataset name
    pub schema: String,

    /// Table name
    pub table: String,
}

impl TableIdentifier {
    /// Create a new table identifier
    pub fn new(database: impl Into<String>, schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Get fully qualified name
    pub fn fqn(&self) -> String {
        format!("{}.{}.{}", self.database, self.schema, self.table)
    }
}

impl fmt::Display for TableIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fqn())
    }
}

/// One field of a warehouse table schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    /// Field name
    pub name: String,

    /// Field description, if one is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Everything else the warehouse reported for this field
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SchemaField {
    /// Create a field with no description and no extra properties
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            extra: Map::new(),
        }
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the warehouse type (stored as the `type` property)
    pub fn with_type(self, field_type: impl Into<String>) -> Self {
        self.with_property("type", Value::String(field_type.into()))
    }

    /// Set an arbitrary pass-through property
    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Ordered field list of a warehouse table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableSchema {
    /// Top-level fields in warehouse order
    #[serde(default)]
    pub fields: Vec<SchemaField>,
}

impl TableSchema {
    /// Create a schema from a list of fields
    pub fn from_fields(fields: Vec<SchemaField>) -> Self {
        Self { fields }
    }

    /// Find a top-level field by name
    pub fn find_field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get all top-level field names
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

/// A warehouse table as fetched for a read-modify-write cycle
#[derive(Debug, Clone, PartialEq)]
pub struct WarehouseTable {
    /// Table reference as reported by the warehouse
    pub id: TableIdentifier,

    /// Current schema
    pub schema: TableSchema,

    /// Version tag of the fetched definition; an update carrying it fails if
    /// the table changed in between
    pub etag: Option<String>,
}

impl WarehouseTable {
    pub fn new(id: TableIdentifier, schema: TableSchema) -> Self {
        Self { id, schema, etag: None }
    }

    /// Set the version tag
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_table_identifier() {
        let table = TableIdentifier::new("my_project", "my_dataset", "my_table");
        assert_eq!(table.database, "my_project");
        assert_eq!(table.schema, "my_dataset");
        assert_eq!(table.table, "my_table");
        assert_eq!(table.fqn(), "my_project.my_dataset.my_table");
        assert_eq!(table.to_string(), "my_project.my_dataset.my_table");
    }

    #[test]
    fn field_keeps_unknown_properties() {
        let raw = json!({
            "name": "amount",
            "type": "NUMERIC",
            "mode": "REQUIRED",
            "policyTags": { "names": ["projects/p/locations/us/taxonomies/1/policyTags/2"] },
            "precision": "10"
        });

        let field: SchemaField = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(field.name, "amount");
        assert_eq!(field.description, None);
        assert_eq!(field.extra.get("mode"), Some(&json!("REQUIRED")));

        assert_eq!(serde_json::to_value(&field).unwrap(), raw);
    }

    #[test]
    fn null_description_reads_as_none() {
        let field: SchemaField =
            serde_json::from_value(json!({ "name": "id", "description": null })).unwrap();
        assert_eq!(field.description, None);
    }

    #[test]
    fn schema_without_fields_is_empty() {
        let schema: TableSchema = serde_json::from_value(json!({})).unwrap();
        assert!(schema.fields.is_empty());
    }

    #[test]
    fn find_field_by_name() {
        let schema = TableSchema::from_fields(vec![
            SchemaField::new("id").with_type("INT64"),
            SchemaField::new("email").with_type("STRING").with_description("Contact address"),
        ]);

        assert_eq!(schema.field_names(), vec!["id", "email"]);
        assert_eq!(
            schema.find_field("email").and_then(|f| f.description.as_deref()),
            Some("Contact address")
        );
        assert!(schema.find_field("missing").is_none());
    }
}
