//! Warehouse catalog adapters for schema documentation
//!
//! This module provides adapters that read a table's schema from a data
//! warehouse and patch it back with updated field descriptions.
//!
//! ## Features
//!
//! Enable warehouse support via Cargo features:
//! - `bigquery` - Google BigQuery support
//!
//! ## Example
//!
//! ```rust,ignore
//! use docsync_catalog::{BigQueryAdapter, WarehouseAdapter};
//! use docsync_core::TableIdentifier;
//!
//! let adapter = BigQueryAdapter::from_service_account_file("service_account.json").await?;
//! let mut table = adapter.get_table(&TableIdentifier::new("my-project", "my_dataset", "my_table")).await?;
//! table.schema.fields[0].description = Some("Primary key".to_string());
//! adapter.update_schema(&table).await?;
//! ```

pub mod adapter;
pub mod bigquery;
pub mod mock;

pub use adapter::{WarehouseAdapter, FetchError, Operation, classify_status};
pub use bigquery::BigQueryAdapter;
pub use mock::{MockAdapter, MockAdapterBuilder};
pub use docsync_core::{TableIdentifier, WarehouseTable};
