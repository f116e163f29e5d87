//! Mock warehouse adapter for testing
//!
//! This adapter keeps table schemas in memory and never connects to a
//! warehouse. It's useful for:
//! - Unit testing the sync pipeline
//! - Asserting exactly which tables were read and which patches were sent
//! - Simulating lookup failures, rejected updates and concurrent edits
//!
//! ## Usage
//!
//! ```rust,ignore
//! use docsync_catalog::{MockAdapterBuilder, WarehouseAdapter};
//! use docsync_core::{TableIdentifier, TableSchema, SchemaField};
//!
//! let adapter = MockAdapterBuilder::new()
//!     .with_table("db", "sch", "tbl", TableSchema::from_fields(vec![
//!         SchemaField::new("id").with_description("old"),
//!     ]))
//!     .build();
//!
//! let table = adapter.get_table(&TableIdentifier::new("db", "sch", "tbl")).await?;
//! adapter.update_schema(&table).await?;
//! assert_eq!(adapter.updates().await.len(), 1);
//! ```

use crate::adapter::{WarehouseAdapter, FetchError};
use docsync_core::{TableIdentifier, TableSchema, WarehouseTable};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Mutable state shared between clones of a [`MockAdapter`]
#[derive(Default)]
struct MockState {
    /// Stored schemas by table FQN
    tables: HashMap<String, TableSchema>,

    /// Bumped on every change to a stored table
    versions: HashMap<String, u64>,

    /// Errors returned by `get_table` for specific tables
    get_errors: HashMap<String, FetchError>,

    /// Errors returned by `update_schema` for specific tables
    update_errors: HashMap<String, FetchError>,

    /// Every `get_table` call, in order
    gets: Vec<TableIdentifier>,

    /// Every accepted `update_schema` call, in order
    updates: Vec<WarehouseTable>,
}

impl MockState {
    fn store(&mut self, fqn: String, schema: TableSchema) {
        *self.versions.entry(fqn.clone()).or_insert(0) += 1;
        self.tables.insert(fqn, schema);
    }

    fn etag(&self, fqn: &str) -> String {
        format!("v{}", self.versions.get(fqn).copied().unwrap_or(0))
    }
}

/// Mock warehouse adapter for testing
///
/// Accepted updates replace the stored schema, so a later `get_table`
/// sees the patched descriptions. Fetched tables carry an etag; an update
/// whose etag no longer matches the stored table is rejected.
#[derive(Clone)]
pub struct MockAdapter {
    state: Arc<RwLock<MockState>>,

    /// Name to return from name() method
    adapter_name: &'static str,
}

impl MockAdapter {
    /// Create a new mock adapter with no tables
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockState::default())),
            adapter_name: "Mock",
        }
    }

    /// Set a custom adapter name
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.adapter_name = name;
        self
    }

    /// Add or replace the schema of a table
    ///
    /// Replacing a table invalidates etags handed out before.
    pub async fn add_table(&self, table: TableIdentifier, schema: TableSchema) {
        self.state.write().await.store(table.fqn(), schema);
    }

    /// Make `get_table` fail for a specific table
    pub async fn add_get_error(&self, table: TableIdentifier, error: FetchError) {
        self.state.write().await.get_errors.insert(table.fqn(), error);
    }

    /// Make `update_schema` fail for a specific table
    pub async fn add_update_error(&self, table: TableIdentifier, error: FetchError) {
        self.state.write().await.update_errors.insert(table.fqn(), error);
    }

    /// Current stored schema of a table
    pub async fn schema_of(&self, table: &TableIdentifier) -> Option<TableSchema> {
        self.state.read().await.tables.get(&table.fqn()).cloned()
    }

    /// Tables requested through `get_table`, in call order
    pub async fn gets(&self) -> Vec<TableIdentifier> {
        self.state.read().await.gets.clone()
    }

    /// Accepted schema updates, in call order
    pub async fn updates(&self) -> Vec<WarehouseTable> {
        self.state.read().await.updates.clone()
    }

    /// Total number of warehouse calls (reads and accepted writes)
    pub async fn call_count(&self) -> usize {
        let state = self.state.read().await;
        state.gets.len() + state.updates.len()
    }
}

impl Default for MockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl WarehouseAdapter for MockAdapter {
    fn name(&self) -> &'static str {
        self.adapter_name
    }

    async fn get_table(&self, table: &TableIdentifier) -> Result<WarehouseTable, FetchError> {
        let mut state = self.state.write().await;
        state.gets.push(table.clone());

        if let Some(error) = state.get_errors.get(&table.fqn()) {
            return Err(error.clone());
        }

        let fqn = table.fqn();
        let schema = state
            .tables
            .get(&fqn)
            .cloned()
            .ok_or_else(|| FetchError::TableNotFound(fqn.clone()))?;

        Ok(WarehouseTable::new(table.clone(), schema).with_etag(state.etag(&fqn)))
    }

    async fn update_schema(&self, table: &WarehouseTable) -> Result<TableIdentifier, FetchError> {
        let mut state = self.state.write().await;
        let fqn = table.id.fqn();

        if let Some(error) = state.update_errors.get(&fqn) {
            return Err(error.clone());
        }

        if !state.tables.contains_key(&fqn) {
            return Err(FetchError::TableNotFound(fqn));
        }

        if let Some(etag) = &table.etag {
            if *etag != state.etag(&fqn) {
                return Err(FetchError::UpdateRejected {
                    table: fqn,
                    reason: "Precondition failed: table was modified after it was read".to_string(),
                });
            }
        }

        state.store(fqn, table.schema.clone());
        state.updates.push(table.clone());
        Ok(table.id.clone())
    }
}

/// Builder for creating MockAdapter with multiple tables
pub struct MockAdapterBuilder {
    state: MockState,
    adapter_name: &'static str,
}

impl MockAdapterBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            state: MockState::default(),
            adapter_name: "Mock",
        }
    }

    /// Add a table schema
    pub fn with_table(mut self, database: &str, schema_name: &str, table: &str, schema: TableSchema) -> Self {
        let fqn = TableIdentifier::new(database, schema_name, table).fqn();
        self.state.store(fqn, schema);
        self
    }

    /// Make `get_table` fail for a table
    pub fn with_get_error(mut self, database: &str, schema_name: &str, table: &str, error: FetchError) -> Self {
        let fqn = TableIdentifier::new(database, schema_name, table).fqn();
        self.state.get_errors.insert(fqn, error);
        self
    }

    /// Make `update_schema` fail for a table
    pub fn with_update_error(mut self, database: &str, schema_name: &str, table: &str, error: FetchError) -> Self {
        let fqn = TableIdentifier::new(database, schema_name, table).fqn();
        self.state.update_errors.insert(fqn, error);
        self
    }

    /// Set adapter name
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.adapter_name = name;
        self
    }

    /// Build the MockAdapter
    pub fn build(self) -> MockAdapter {
        MockAdapter {
            state: Arc::new(RwLock::new(self.state)),
            adapter_name: self.adapter_name,
        }
    }
}

impl Default for MockAdapterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
