//! Warehouse adapter trait for reading and patching table schemas

use docsync_core::{TableIdentifier, WarehouseTable};

/// Errors that can occur when talking to a warehouse
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Update rejected for {table}: {reason}")]
    UpdateRejected { table: String, reason: String },

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Which warehouse call produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetTable,
    UpdateSchema,
}

/// Map a failed warehouse HTTP response onto [`FetchError`]
///
/// `message` is the error text the warehouse returned with `status`.
pub fn classify_status(status: u16, message: &str, table: &TableIdentifier, operation: Operation) -> FetchError {
    match (status, operation) {
        (401, _) => FetchError::AuthenticationError(message.to_string()),
        (403, _) => FetchError::PermissionDenied(format!("Cannot access {}: {}", table.fqn(), message)),
        (404, _) => FetchError::TableNotFound(table.fqn()),
        (412, Operation::UpdateSchema) => FetchError::UpdateRejected {
            table: table.fqn(),
            reason: format!("Table was modified after it was read: {}", message),
        },
        (_, Operation::UpdateSchema) => FetchError::UpdateRejected {
            table: table.fqn(),
            reason: format!("HTTP {}: {}", status, message),
        },
        (_, Operation::GetTable) => FetchError::RequestFailed(format!("HTTP {}: {}", status, message)),
    }
}

/// Trait for warehouses whose table schemas can be read and patched
#[async_trait::async_trait]
pub trait WarehouseAdapter: Send + Sync {
    /// Get the adapter name (e.g., "BigQuery")
    fn name(&self) -> &'static str;

    /// Fetch the current definition of a table
    async fn get_table(&self, table: &TableIdentifier) -> Result<WarehouseTable, FetchError>;

    /// Write `table.schema` back to the warehouse
    ///
    /// Only the schema property is sent; partitioning, clustering,
    /// expiration and every other table property are left as they are.
    /// When `table.etag` is set the write is conditional on it, and a table
    /// changed since it was fetched yields [`FetchError::UpdateRejected`].
    /// Returns the table reference reported by the warehouse.
    async fn update_schema(&self, table: &WarehouseTable) -> Result<TableIdentifier, FetchError>;
}
