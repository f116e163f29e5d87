//! The documentation sync pipeline
//!
//! Models are processed strictly one after another. For each model:
//!
//! ```text
//! PENDING → FILTERED → SKIPPED
//!                    → FETCHED → MERGED → WRITTEN
//! ```
//!
//! The first failure aborts the run. Tables written before the failure stay
//! written; later models are never touched.

use docsync_catalog::{FetchError, WarehouseAdapter};
use docsync_core::{
    overlay_descriptions, InheritedColumns, MissingLocation, Model, SyncConfig, TableIdentifier,
};
use docsync_dbt::{fetch_all_models, DiscoveryApi, DiscoveryError};

/// Errors that abort a sync run
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Catalog query failed")]
    Catalog(#[from] DiscoveryError),

    #[error("Model {model} has inherited columns but no complete warehouse location")]
    Location {
        model: String,
        #[source]
        source: MissingLocation,
    },

    #[error("Table lookup failed for {table}")]
    TableLookup {
        table: String,
        #[source]
        source: FetchError,
    },

    #[error("Schema update rejected for {table}")]
    UpdateRejected {
        table: String,
        #[source]
        source: FetchError,
    },
}

/// Knobs for a single run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Environment whose models are synced
    pub environment_id: u64,

    /// Models per catalog page
    pub page_size: u32,

    /// Fetch and merge, but never write
    pub dry_run: bool,
}

impl SyncOptions {
    pub fn new(environment_id: u64, page_size: u32) -> Self {
        Self {
            environment_id,
            page_size,
            dry_run: false,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.environment_id, config.page_size)
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// A table whose schema received inherited descriptions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableUpdate {
    /// Table reference as reported by the warehouse
    pub table: TableIdentifier,

    /// Fields that received a description
    pub applied: Vec<String>,

    /// Inherited columns missing from the warehouse schema
    pub unmatched: Vec<String>,
}

/// Terminal state of one model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelOutcome {
    /// No inherited columns; the warehouse was not contacted
    Skipped,

    /// Schema merged and written
    Written(TableUpdate),

    /// Schema merged; write suppressed by dry run
    Merged(TableUpdate),
}

/// Progress notifications emitted while a run proceeds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The catalog returned zero models
    NoModels,

    /// A model was skipped
    Skipped { model: String },

    /// A table was updated
    Updated(TableUpdate),

    /// A table would have been updated (dry run)
    WouldUpdate(TableUpdate),
}

/// Counters for a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncSummary {
    /// Models returned by the catalog
    pub models: usize,

    /// Models without inherited columns
    pub skipped: usize,

    /// Tables written (or merged, in a dry run)
    pub tables: usize,

    /// Field descriptions written across all tables
    pub fields: usize,
}

/// Runs the catalog → warehouse documentation sync
pub struct Synchronizer<'a> {
    catalog: &'a dyn DiscoveryApi,
    warehouse: &'a dyn WarehouseAdapter,
    options: SyncOptions,
}

impl<'a> Synchronizer<'a> {
    pub fn new(catalog: &'a dyn DiscoveryApi, warehouse: &'a dyn WarehouseAdapter, options: SyncOptions) -> Self {
        Self {
            catalog,
            warehouse,
            options,
        }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Read every model of the configured environment
    pub async fn collect_models(&self) -> Result<Vec<Model>, SyncError> {
        let models = fetch_all_models(self.catalog, self.options.environment_id, self.options.page_size).await?;
        Ok(models)
    }

    /// Take one model through filter, fetch, merge and write
    pub async fn sync_model(&self, model: &Model) -> Result<ModelOutcome, SyncError> {
        let (has_inherited, inherited) = InheritedColumns::collect(model.columns());
        if !has_inherited {
            tracing::debug!(model = %model.display_name(), "no inherited columns, skipping");
            return Ok(ModelOutcome::Skipped);
        }

        let table_id = model.table_identifier().map_err(|source| SyncError::Location {
            model: model.display_name(),
            source,
        })?;

        let mut table = self
            .warehouse
            .get_table(&table_id)
            .await
            .map_err(|source| SyncError::TableLookup {
                table: table_id.fqn(),
                source,
            })?;
        tracing::debug!(table = %table_id, fields = table.schema.fields.len(), "fetched warehouse schema");

        let merge = overlay_descriptions(&mut table.schema, &inherited);
        if !merge.unmatched.is_empty() {
            tracing::debug!(
                table = %table_id,
                columns = ?merge.unmatched,
                "inherited columns not present in warehouse schema"
            );
        }

        if self.options.dry_run {
            return Ok(ModelOutcome::Merged(TableUpdate {
                table: table.id,
                applied: merge.applied,
                unmatched: merge.unmatched,
            }));
        }

        let updated = self
            .warehouse
            .update_schema(&table)
            .await
            .map_err(|source| SyncError::UpdateRejected {
                table: table_id.fqn(),
                source,
            })?;
        tracing::info!(table = %updated, fields = merge.applied.len(), "updated table schema");

        Ok(ModelOutcome::Written(TableUpdate {
            table: updated,
            applied: merge.applied,
            unmatched: merge.unmatched,
        }))
    }

    /// Run the whole pipeline, reporting progress through `on_event`
    ///
    /// Events are emitted as soon as each model finishes, so a caller that
    /// prints them has already reported every written table when a later
    /// model fails.
    pub async fn run<F>(&self, mut on_event: F) -> Result<SyncSummary, SyncError>
    where
        F: FnMut(&SyncEvent),
    {
        let models = self.collect_models().await?;

        let mut summary = SyncSummary {
            models: models.len(),
            ..SyncSummary::default()
        };

        if models.is_empty() {
            on_event(&SyncEvent::NoModels);
            return Ok(summary);
        }

        for model in &models {
            let event = match self.sync_model(model).await? {
                ModelOutcome::Skipped => {
                    summary.skipped += 1;
                    SyncEvent::Skipped { model: model.display_name() }
                }
                ModelOutcome::Written(update) => {
                    summary.tables += 1;
                    summary.fields += update.applied.len();
                    SyncEvent::Updated(update)
                }
                ModelOutcome::Merged(update) => {
                    summary.tables += 1;
                    summary.fields += update.applied.len();
                    SyncEvent::WouldUpdate(update)
                }
            };
            on_event(&event);
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsync_catalog::MockAdapterBuilder;
    use docsync_core::{CatalogColumn, SchemaField, TableSchema};
    use docsync_dbt::MockDiscoveryClient;

    fn options() -> SyncOptions {
        SyncOptions::new(1, 500)
    }

    #[tokio::test]
    async fn model_without_markers_is_skipped_without_warehouse_calls() {
        let catalog = MockDiscoveryClient::new();
        let warehouse = MockAdapterBuilder::new().build();
        let sync = Synchronizer::new(&catalog, &warehouse, options());

        let model = Model::new("db", "sch", "tbl").with_columns(vec![CatalogColumn::new("id", "Primary key")]);

        assert_eq!(sync.sync_model(&model).await.unwrap(), ModelOutcome::Skipped);
        assert_eq!(warehouse.call_count().await, 0);
    }

    #[tokio::test]
    async fn uncataloged_model_is_skipped() {
        let catalog = MockDiscoveryClient::new();
        let warehouse = MockAdapterBuilder::new().build();
        let sync = Synchronizer::new(&catalog, &warehouse, options());

        let model = Model {
            catalog: None,
            ..Model::new("db", "sch", "tbl")
        };

        assert_eq!(sync.sync_model(&model).await.unwrap(), ModelOutcome::Skipped);
    }

    #[tokio::test]
    async fn missing_location_fails_only_when_needed() {
        let catalog = MockDiscoveryClient::new();
        let warehouse = MockAdapterBuilder::new().build();
        let sync = Synchronizer::new(&catalog, &warehouse, options());

        let model = Model {
            database: None,
            ..Model::new("db", "sch", "tbl")
        };
        assert_eq!(sync.sync_model(&model).await.unwrap(), ModelOutcome::Skipped);

        let model = model.with_columns(vec![CatalogColumn::new("id", "Primary key").inherited_from("id")]);
        assert!(matches!(
            sync.sync_model(&model).await,
            Err(SyncError::Location { source: MissingLocation::Database, .. })
        ));
    }

    #[tokio::test]
    async fn dry_run_merges_without_writing() {
        let catalog = MockDiscoveryClient::new();
        let warehouse = MockAdapterBuilder::new()
            .with_table(
                "db",
                "sch",
                "tbl",
                TableSchema::from_fields(vec![SchemaField::new("id").with_description("old")]),
            )
            .build();
        let sync = Synchronizer::new(&catalog, &warehouse, options().with_dry_run(true));

        let model = Model::new("db", "sch", "tbl")
            .with_columns(vec![CatalogColumn::new("id", "Primary key").inherited_from("id")]);

        let outcome = sync.sync_model(&model).await.unwrap();
        assert_eq!(
            outcome,
            ModelOutcome::Merged(TableUpdate {
                table: TableIdentifier::new("db", "sch", "tbl"),
                applied: vec!["id".to_string()],
                unmatched: vec![],
            })
        );
        assert!(warehouse.updates().await.is_empty());
    }

    #[test]
    fn error_chain_names_the_table() {
        let err = SyncError::TableLookup {
            table: "db.sch.tbl".to_string(),
            source: FetchError::TableNotFound("db.sch.tbl".to_string()),
        };

        assert_eq!(err.to_string(), "Table lookup failed for db.sch.tbl");
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Table not found: db.sch.tbl"));
    }
}
