//! Catalog-side model types
//!
//! These mirror the node shape returned by the dbt Cloud Discovery API.
//! Fields that the API may return as `null` are `Option`s, but they must
//! still be present in the payload: a missing key is a malformed response,
//! not an implicit `null`.

use serde::{Deserialize, Deserializer, Serialize};
use crate::schema::TableIdentifier;

/// Deserialize a field that must be present but may be `null`.
///
/// Plain `Option<T>` fields default to `None` when the key is missing.
/// Routing them through `deserialize_with` disables that, so serde reports
/// `missing field` instead.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

/// A column in a model's catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogColumn {
    /// Column name
    pub name: String,

    /// Column description
    #[serde(deserialize_with = "nullable")]
    pub description: Option<String>,

    /// Upstream column the description was copied from, if any
    #[serde(deserialize_with = "nullable")]
    pub description_origin_column_name: Option<String>,
}

impl CatalogColumn {
    /// Create a column with its own (non-inherited) description
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            description_origin_column_name: None,
        }
    }

    /// Mark the description as inherited from `origin`
    pub fn inherited_from(mut self, origin: impl Into<String>) -> Self {
        self.description_origin_column_name = Some(origin.into());
        self
    }

    /// Whether the description was propagated from an upstream column
    pub fn is_inherited(&self) -> bool {
        self.description_origin_column_name.is_some()
    }
}

/// Catalog information attached to a model
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelCatalog {
    /// Ordered column list
    pub columns: Vec<CatalogColumn>,
}

/// A warehouse table as represented in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Database/project name
    #[serde(deserialize_with = "nullable")]
    pub database: Option<String>,

    /// Schema/dataset name
    #[serde(deserialize_with = "nullable")]
    pub schema: Option<String>,

    /// Relation name in the warehouse
    #[serde(deserialize_with = "nullable")]
    pub alias: Option<String>,

    /// Catalog metadata; `null` when the model was never cataloged
    #[serde(deserialize_with = "nullable")]
    pub catalog: Option<ModelCatalog>,
}

impl Model {
    /// Create a model located at `database.schema.alias` with no columns
    pub fn new(database: impl Into<String>, schema: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            database: Some(database.into()),
            schema: Some(schema.into()),
            alias: Some(alias.into()),
            catalog: Some(ModelCatalog::default()),
        }
    }

    /// Set the catalog columns
    pub fn with_columns(mut self, columns: Vec<CatalogColumn>) -> Self {
        self.catalog = Some(ModelCatalog { columns });
        self
    }

    /// Catalog columns, empty when the catalog is `null`
    pub fn columns(&self) -> &[CatalogColumn] {
        self.catalog
            .as_ref()
            .map(|c| c.columns.as_slice())
            .unwrap_or(&[])
    }

    /// Human-readable location, with `?` for missing parts
    pub fn display_name(&self) -> String {
        let part = |p: &Option<String>| p.clone().unwrap_or_else(|| "?".to_string());
        format!("{}.{}.{}", part(&self.database), part(&self.schema), part(&self.alias))
    }

    /// Build the warehouse table identifier
    pub fn table_identifier(&self) -> Result<TableIdentifier, MissingLocation> {
        let database = self.database.as_ref().ok_or(MissingLocation::Database)?;
        let schema = self.schema.as_ref().ok_or(MissingLocation::Schema)?;
        let alias = self.alias.as_ref().ok_or(MissingLocation::Alias)?;
        Ok(TableIdentifier::new(database, schema, alias))
    }
}

/// Which part of a model's warehouse location is `null`
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MissingLocation {
    #[error("Model has no database")]
    Database,

    #[error("Model has no schema")]
    Schema,

    #[error("Model has no alias")]
    Alias,
}
