//! docsync core
//!
//! Domain model shared by every stage of a documentation sync:
//! catalog models and their columns, warehouse table schemas, the
//! inherited-description filter and the schema overlay.

pub mod schema;
pub mod model;
pub mod inheritance;
pub mod merge;
pub mod config;

pub use schema::{TableIdentifier, SchemaField, TableSchema, WarehouseTable};
pub use model::{Model, ModelCatalog, CatalogColumn, MissingLocation};
pub use inheritance::InheritedColumns;
pub use merge::{overlay_descriptions, MergeOutcome};
pub use config::{SyncConfig, ConfigError};
