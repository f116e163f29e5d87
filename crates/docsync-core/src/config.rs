//! Runtime configuration, read once from the environment

use std::path::PathBuf;

/// dbt Cloud host
pub const HOST_VAR: &str = "DBT_CLOUD_HOST";

/// Service token for the Discovery API
pub const TOKEN_VAR: &str = "DBT_CLOUD_SERVICE_TOKEN";

/// Numeric environment id
pub const ENVIRONMENT_VAR: &str = "DBT_CLOUD_ENVIRONMENT_ID";

/// Path to the BigQuery service-account key
pub const CREDENTIALS_VAR: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Discovery API page size
pub const PAGE_SIZE_VAR: &str = "DOCSYNC_PAGE_SIZE";

/// Key file used when no credentials path is configured
pub const DEFAULT_CREDENTIALS_PATH: &str = "./service_account.json";

/// Models requested per Discovery API page
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// Everything a sync run needs to reach the catalog and the warehouse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// dbt Cloud host (e.g. `cloud.getdbt.com`) or a full Discovery API URL
    pub host: String,

    /// Bearer token for the Discovery API
    pub service_token: String,

    /// Environment whose applied models are synced
    pub environment_id: u64,

    /// Service-account key file for the warehouse
    pub credentials_path: PathBuf,

    /// Models per Discovery API request
    pub page_size: u32,
}

impl SyncConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup
    ///
    /// Required variables that are unset or blank are reported by name.
    /// The credentials file must exist.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::MissingVar(name));

        let host = require(HOST_VAR)?;
        let service_token = require(TOKEN_VAR)?;

        let raw_env = require(ENVIRONMENT_VAR)?;
        let environment_id = raw_env.trim().parse::<u64>().map_err(|e| ConfigError::InvalidVar {
            name: ENVIRONMENT_VAR,
            value: raw_env.clone(),
            reason: e.to_string(),
        })?;

        let page_size = match get(PAGE_SIZE_VAR) {
            Some(raw) => parse_page_size(&raw).map_err(|reason| ConfigError::InvalidVar {
                name: PAGE_SIZE_VAR,
                value: raw.clone(),
                reason,
            })?,
            None => DEFAULT_PAGE_SIZE,
        };

        let credentials_path = get(CREDENTIALS_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_PATH));

        let config = Self {
            host: host.trim().to_string(),
            service_token,
            environment_id,
            credentials_path,
            page_size,
        };
        config.check_credentials()?;

        Ok(config)
    }

    /// Replace the page size
    pub fn with_page_size(mut self, page_size: u32) -> Result<Self, ConfigError> {
        if page_size == 0 {
            return Err(ConfigError::InvalidVar {
                name: PAGE_SIZE_VAR,
                value: page_size.to_string(),
                reason: "page size must be greater than zero".to_string(),
            });
        }
        self.page_size = page_size;
        Ok(self)
    }

    /// Discovery API GraphQL endpoint for the configured host
    pub fn discovery_endpoint(&self) -> String {
        let host = self.host.trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://metadata.{}/graphql", host)
        }
    }

    fn check_credentials(&self) -> Result<(), ConfigError> {
        if self.credentials_path.is_file() {
            Ok(())
        } else {
            Err(ConfigError::CredentialsNotFound(self.credentials_path.clone()))
        }
    }
}

fn parse_page_size(raw: &str) -> Result<u32, String> {
    match raw.trim().parse::<u32>() {
        Ok(0) => Err("page size must be greater than zero".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Config error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("Invalid value '{value}' for {name}: {reason}")]
    InvalidVar {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Service account credentials not found at {}", .0.display())]
    CredentialsNotFound(PathBuf),
}
