//! Discovery API client

use docsync_core::SyncConfig;
use crate::query::{parse_models_response, GraphQlRequest, ModelsPage, PageRequest, MODELS_QUERY};

/// Errors that can occur when querying the Discovery API
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Discovery API returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("GraphQL errors: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Environment {0} not found")]
    EnvironmentNotFound(u64),

    #[error("Page {page} reports more results but no end cursor")]
    MissingCursor { page: usize },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Source of model pages
///
/// Implemented by the HTTP client and by [`crate::MockDiscoveryClient`].
#[async_trait::async_trait]
pub trait DiscoveryApi: Send + Sync {
    /// Fetch a single page of applied models
    async fn models_page(&self, request: &PageRequest) -> Result<ModelsPage, DiscoveryError>;
}

/// HTTP client for the dbt Cloud Discovery API
pub struct DiscoveryClient {
    /// GraphQL endpoint URL
    endpoint: String,

    /// Service token sent as a bearer token
    token: String,

    http: reqwest::Client,
}

impl DiscoveryClient {
    /// Create a client for an explicit endpoint
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Result<Self, DiscoveryError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("docsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DiscoveryError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            token: token.into(),
            http,
        })
    }

    /// Create a client from the run configuration
    pub fn from_config(config: &SyncConfig) -> Result<Self, DiscoveryError> {
        Self::new(config.discovery_endpoint(), config.service_token.clone())
    }

    /// GraphQL endpoint this client posts to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl DiscoveryApi for DiscoveryClient {
    async fn models_page(&self, request: &PageRequest) -> Result<ModelsPage, DiscoveryError> {
        let body = GraphQlRequest {
            query: MODELS_QUERY,
            variables: request,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| DiscoveryError::NetworkError(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(DiscoveryError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_models_response(&text, request.environment_id)
    }
}
