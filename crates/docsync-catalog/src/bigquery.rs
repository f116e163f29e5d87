//! BigQuery warehouse adapter using the tables.get / tables.patch REST calls
//!
//! Requires the IAM permissions `bigquery.tables.get` and
//! `bigquery.tables.update` on every dataset being documented.
//!
//! Table resources are exchanged as raw JSON. Every field property other
//! than `name` and `description` (type parameters, default value
//! expressions, collation, range element types, nested fields, ...) is
//! carried in [`docsync_core::SchemaField::extra`] and sent back exactly as
//! it was read.
//!
//! ## Authentication
//!
//! 1. Service account JSON file (explicit path)
//! 2. Application Default Credentials (ADC)
//! 3. A ready-made OAuth access token
//!
//! ## Concurrent edits
//!
//! The etag returned by `tables.get` is sent as `If-Match` on the patch.
//! If the table changed in between, BigQuery answers 412 and the update is
//! rejected instead of overwriting the other change.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let adapter = BigQueryAdapter::from_service_account_file("/path/to/service-account.json").await?;
//! let table = adapter.get_table(&TableIdentifier::new("my-project", "my_dataset", "my_table")).await?;
//! ```
//!
//! The catalog's `database.schema.alias` maps onto BigQuery's
//! `project.dataset.table`.

use crate::adapter::{WarehouseAdapter, FetchError};
#[cfg(feature = "bigquery")]
use crate::adapter::{classify_status, Operation};
use docsync_core::{TableIdentifier, WarehouseTable};

#[cfg(feature = "bigquery")]
use docsync_core::TableSchema;
#[cfg(feature = "bigquery")]
use gcp_bigquery_client::yup_oauth2::{
    self,
    authenticator::{ApplicationDefaultCredentialsTypes, Authenticator},
    ApplicationDefaultCredentialsAuthenticator, ApplicationDefaultCredentialsFlowOpts,
    DefaultHyperClientBuilder, HyperClientBuilder, ServiceAccountAuthenticator,
};
#[cfg(feature = "bigquery")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "bigquery")]
const BIGQUERY_V2_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";

#[cfg(feature = "bigquery")]
const BIGQUERY_SCOPE: &str = "https://www.googleapis.com/auth/bigquery";

#[cfg(not(feature = "bigquery"))]
const NOT_COMPILED: &str = "BigQuery support not compiled. Rebuild with: cargo build --features bigquery";

#[cfg(feature = "bigquery")]
type OAuthAuthenticator = Authenticator<<DefaultHyperClientBuilder as HyperClientBuilder>::Connector>;

/// Where bearer tokens come from
#[cfg(feature = "bigquery")]
enum TokenSource {
    OAuth(OAuthAuthenticator),
    Static(String),
}

#[cfg(feature = "bigquery")]
impl TokenSource {
    async fn access_token(&self) -> Result<String, FetchError> {
        match self {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::OAuth(auth) => {
                let token = auth
                    .token(&[BIGQUERY_SCOPE])
                    .await
                    .map_err(|e| FetchError::AuthenticationError(format!("Failed to obtain access token: {}", e)))?;

                token
                    .token()
                    .map(str::to_string)
                    .ok_or_else(|| FetchError::AuthenticationError("Token response carried no access token".to_string()))
            }
        }
    }
}

/// BigQuery warehouse adapter
pub struct BigQueryAdapter {
    /// Token provider (only available with bigquery feature)
    #[cfg(feature = "bigquery")]
    tokens: TokenSource,

    #[cfg(feature = "bigquery")]
    http: reqwest::Client,

    /// REST API root, without trailing slash
    #[cfg(feature = "bigquery")]
    base_url: String,

    /// Placeholder for when feature is disabled
    #[cfg(not(feature = "bigquery"))]
    _phantom: std::marker::PhantomData<()>,
}

impl BigQueryAdapter {
    #[cfg(feature = "bigquery")]
    fn with_tokens(tokens: TokenSource) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("docsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            tokens,
            http,
            base_url: BIGQUERY_V2_URL.to_string(),
        })
    }

    /// Create a new BigQuery adapter using a service account key file
    #[cfg(feature = "bigquery")]
    pub async fn from_service_account_file(key_path: impl AsRef<std::path::Path>) -> Result<Self, FetchError> {
        let key_path = key_path.as_ref();

        let key = yup_oauth2::read_service_account_key(key_path)
            .await
            .map_err(|e| FetchError::AuthenticationError(format!(
                "Failed to read service account key file '{}': {}",
                key_path.display(), e
            )))?;

        let auth = ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .map_err(|e| FetchError::AuthenticationError(format!(
                "Failed to create service account authenticator: {}",
                e
            )))?;

        Self::with_tokens(TokenSource::OAuth(auth))
    }

    /// Create adapter without bigquery feature (returns error)
    #[cfg(not(feature = "bigquery"))]
    pub async fn from_service_account_file(_key_path: impl AsRef<std::path::Path>) -> Result<Self, FetchError> {
        Err(FetchError::ConfigError(NOT_COMPILED.to_string()))
    }

    /// Create a new BigQuery adapter using Application Default Credentials (ADC)
    #[cfg(feature = "bigquery")]
    pub async fn with_adc() -> Result<Self, FetchError> {
        let opts = ApplicationDefaultCredentialsFlowOpts::default();
        let auth = match ApplicationDefaultCredentialsAuthenticator::builder(opts).await {
            ApplicationDefaultCredentialsTypes::InstanceMetadata(builder) => builder.build().await,
            ApplicationDefaultCredentialsTypes::ServiceAccount(builder) => builder.build().await,
        }
        .map_err(|e| FetchError::AuthenticationError(format!(
            "Failed to authenticate with ADC: {}. \
             Ensure GOOGLE_APPLICATION_CREDENTIALS is set or run 'gcloud auth application-default login'",
            e
        )))?;

        Self::with_tokens(TokenSource::OAuth(auth))
    }

    /// Create adapter without bigquery feature (returns error)
    #[cfg(not(feature = "bigquery"))]
    pub async fn with_adc() -> Result<Self, FetchError> {
        Err(FetchError::ConfigError(NOT_COMPILED.to_string()))
    }

    /// Create an adapter that sends a fixed OAuth access token
    /// (e.g. from `gcloud auth print-access-token`)
    #[cfg(feature = "bigquery")]
    pub fn with_access_token(token: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_tokens(TokenSource::Static(token.into()))
    }

    /// Create adapter without bigquery feature (returns error)
    #[cfg(not(feature = "bigquery"))]
    pub fn with_access_token(_token: impl Into<String>) -> Result<Self, FetchError> {
        Err(FetchError::ConfigError(NOT_COMPILED.to_string()))
    }

    /// Point the adapter at another REST root (emulators, proxies)
    #[cfg(feature = "bigquery")]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[cfg(feature = "bigquery")]
    fn table_url(&self, table: &TableIdentifier) -> String {
        format!(
            "{}/projects/{}/datasets/{}/tables/{}",
            self.base_url, table.database, table.schema, table.table
        )
    }

    /// Body of a successful response, or the classified error
    #[cfg(feature = "bigquery")]
    async fn read_body(
        response: reqwest::Response,
        table: &TableIdentifier,
        operation: Operation,
    ) -> Result<String, FetchError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::NetworkError(format!("Failed to read response body: {}", e)))?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(classify_status(status.as_u16(), &error_message(&body), table, operation))
        }
    }
}

/// Table reference as it appears in a table resource
#[cfg(feature = "bigquery")]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableReference {
    project_id: String,
    dataset_id: String,
    table_id: String,
}

#[cfg(feature = "bigquery")]
impl TableReference {
    fn from_identifier(id: &TableIdentifier) -> Self {
        Self {
            project_id: id.database.clone(),
            dataset_id: id.schema.clone(),
            table_id: id.table.clone(),
        }
    }

    fn to_identifier(&self) -> TableIdentifier {
        TableIdentifier::new(&self.project_id, &self.dataset_id, &self.table_id)
    }
}

/// The parts of a table resource the adapter reads
#[cfg(feature = "bigquery")]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableResource {
    table_reference: TableReference,

    /// Views and external tables may have no schema
    #[serde(default)]
    schema: TableSchema,

    #[serde(default)]
    etag: Option<String>,
}

/// Body of a `tables.patch` call
///
/// Properties absent from a patch are left unchanged, so only the reference
/// and the schema are sent.
#[cfg(feature = "bigquery")]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TablePatch<'a> {
    table_reference: TableReference,
    schema: &'a TableSchema,
}

#[cfg(feature = "bigquery")]
fn parse_table(body: &str) -> Result<WarehouseTable, FetchError> {
    let resource: TableResource = serde_json::from_str(body)
        .map_err(|e| FetchError::InvalidResponse(format!("Unreadable table resource: {}", e)))?;

    let table = WarehouseTable::new(resource.table_reference.to_identifier(), resource.schema);
    Ok(match resource.etag {
        Some(etag) => table.with_etag(etag),
        None => table,
    })
}

#[cfg(feature = "bigquery")]
fn patch_request(table: &WarehouseTable) -> TablePatch<'_> {
    TablePatch {
        table_reference: TableReference::from_identifier(&table.id),
        schema: &table.schema,
    }
}

/// `error.message` of a BigQuery error payload, or the raw body
#[cfg(feature = "bigquery")]
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait::async_trait]
impl WarehouseAdapter for BigQueryAdapter {
    fn name(&self) -> &'static str {
        "BigQuery"
    }

    #[cfg(feature = "bigquery")]
    async fn get_table(&self, table: &TableIdentifier) -> Result<WarehouseTable, FetchError> {
        let token = self.tokens.access_token().await?;

        let response = self
            .http
            .get(self.table_url(table))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| FetchError::NetworkError(e.to_string()))?;

        let body = Self::read_body(response, table, Operation::GetTable).await?;
        parse_table(&body)
    }

    #[cfg(not(feature = "bigquery"))]
    async fn get_table(&self, _table: &TableIdentifier) -> Result<WarehouseTable, FetchError> {
        Err(FetchError::ConfigError(NOT_COMPILED.to_string()))
    }

    #[cfg(feature = "bigquery")]
    async fn update_schema(&self, table: &WarehouseTable) -> Result<TableIdentifier, FetchError> {
        let id = &table.id;
        let token = self.tokens.access_token().await?;

        let mut request = self
            .http
            .patch(self.table_url(id))
            .bearer_auth(token)
            .json(&patch_request(table));

        if let Some(etag) = &table.etag {
            request = request.header(reqwest::header::IF_MATCH, etag.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::NetworkError(e.to_string()))?;

        let body = Self::read_body(response, id, Operation::UpdateSchema).await?;
        Ok(parse_table(&body)?.id)
    }

    #[cfg(not(feature = "bigquery"))]
    async fn update_schema(&self, _table: &WarehouseTable) -> Result<TableIdentifier, FetchError> {
        Err(FetchError::ConfigError(NOT_COMPILED.to_string()))
    }
}
