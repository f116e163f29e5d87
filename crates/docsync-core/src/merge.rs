//! Overlay inherited descriptions onto a warehouse schema
//!
//! The warehouse schema decides which fields exist. The overlay only ever
//! rewrites `description` on top-level fields whose name has an inherited
//! entry; catalog columns with no matching field are ignored.

use crate::inheritance::InheritedColumns;
use crate::schema::TableSchema;

/// What an overlay did to a schema
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MergeOutcome {
    /// Fields whose description was written, in schema order
    pub applied: Vec<String>,

    /// Inherited columns with no field of the same name
    pub unmatched: Vec<String>,
}

impl MergeOutcome {
    /// Number of fields that received a description
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }
}

/// Write inherited descriptions into matching fields of `schema`
pub fn overlay_descriptions(schema: &mut TableSchema, inherited: &InheritedColumns) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    for field in &mut schema.fields {
        if let Some(description) = inherited.description_for(&field.name) {
            field.description = Some(description.to_string());
            outcome.applied.push(field.name.clone());
        }
    }

    outcome.unmatched = inherited
        .names()
        .filter(|name| schema.find_field(name).is_none())
        .map(str::to_string)
        .collect();

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CatalogColumn;
    use crate::schema::SchemaField;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn warehouse_schema() -> TableSchema {
        TableSchema::from_fields(vec![
            SchemaField::new("x").with_type("STRING").with_description("old"),
            SchemaField::new("z").with_type("STRING").with_description("old"),
            SchemaField::new("w")
                .with_type("RECORD")
                .with_description("old")
                .with_property("mode", json!("REPEATED"))
                .with_property("fields", json!([{ "name": "x", "type": "STRING", "description": "nested" }])),
        ])
    }

    fn inherited() -> InheritedColumns {
        InheritedColumns::from_columns(&[
            CatalogColumn::new("x", "inherited").inherited_from("y"),
            CatalogColumn::new("z", "own"),
        ])
    }

    #[test]
    fn overlay_only_touches_inherited_fields() {
        let mut schema = warehouse_schema();
        let outcome = overlay_descriptions(&mut schema, &inherited());

        let expected = TableSchema::from_fields(vec![
            SchemaField::new("x").with_type("STRING").with_description("inherited"),
            SchemaField::new("z").with_type("STRING").with_description("old"),
            warehouse_schema().fields[2].clone(),
        ]);

        assert_eq!(schema, expected);
        assert_eq!(outcome.applied, vec!["x".to_string()]);
        assert!(outcome.unmatched.is_empty());
    }

    #[test]
    fn overlay_is_idempotent() {
        let inherited = inherited();

        let mut once = warehouse_schema();
        overlay_descriptions(&mut once, &inherited);

        let mut twice = once.clone();
        overlay_descriptions(&mut twice, &inherited);

        assert_eq!(once, twice);
    }

    #[test]
    fn unmatched_columns_are_ignored() {
        let inherited = InheritedColumns::from_columns(&[
            CatalogColumn::new("dropped_upstream", "gone").inherited_from("a"),
        ]);

        let mut schema = warehouse_schema();
        let outcome = overlay_descriptions(&mut schema, &inherited);

        assert_eq!(schema, warehouse_schema());
        assert_eq!(schema.fields.len(), 3);
        assert_eq!(outcome.applied_count(), 0);
        assert_eq!(outcome.unmatched, vec!["dropped_upstream".to_string()]);
    }

    #[test]
    fn nested_fields_are_not_matched() {
        let mut schema = warehouse_schema();
        overlay_descriptions(&mut schema, &inherited());

        assert_eq!(
            schema.fields[2].extra.get("fields"),
            Some(&json!([{ "name": "x", "type": "STRING", "description": "nested" }]))
        );
    }

    #[test]
    fn field_without_description_gains_one() {
        let mut schema = TableSchema::from_fields(vec![SchemaField::new("x").with_type("INT64")]);
        overlay_descriptions(&mut schema, &inherited());

        assert_eq!(schema.fields[0].description.as_deref(), Some("inherited"));
    }

    #[test]
    fn marked_column_without_text_leaves_field_alone() {
        let inherited = InheritedColumns::from_columns(&[CatalogColumn {
            name: "x".to_string(),
            description: None,
            description_origin_column_name: Some("y".to_string()),
        }]);

        let mut schema = warehouse_schema();
        let outcome = overlay_descriptions(&mut schema, &inherited);

        assert_eq!(schema, warehouse_schema());
        assert!(outcome.applied.is_empty());
        assert!(outcome.unmatched.is_empty());
    }

    #[test]
    fn empty_inherited_description_keeps_warehouse_text() {
        let inherited = InheritedColumns::from_columns(&[CatalogColumn::new("x", "").inherited_from("y")]);

        let mut schema = warehouse_schema();
        let outcome = overlay_descriptions(&mut schema, &inherited);

        assert_eq!(schema.fields[0].description.as_deref(), Some("old"));
        assert_eq!(schema, warehouse_schema());
        assert!(outcome.applied.is_empty());
        assert!(outcome.unmatched.is_empty());
    }
}
