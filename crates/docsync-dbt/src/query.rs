//! Discovery API query and response shapes
//!
//! Reference: https://docs.getdbt.com/docs/dbt-cloud-apis/discovery-api

use serde::{Deserialize, Serialize};
use docsync_core::model::{nullable, Model};
use crate::client::DiscoveryError;

/// Applied models of one environment, with warehouse location and catalog columns
pub const MODELS_QUERY: &str = r#"
query Models($environmentId: BigInt!, $first: Int, $after: String) {
  environment(id: $environmentId) {
    applied {
      models(first: $first, after: $after) {
        pageInfo {
          endCursor
          hasNextPage
          hasPreviousPage
          startCursor
        }
        totalCount
        edges {
          node {
            database
            schema
            alias
            catalog {
              columns {
                description
                name
                descriptionOriginColumnName
              }
            }
          }
        }
      }
    }
  }
}
"#;

/// Variables for one page of [`MODELS_QUERY`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub environment_id: u64,

    /// Page size
    pub first: u32,

    /// Cursor of the previous page; `null` for the first page
    pub after: Option<String>,
}

impl PageRequest {
    /// Request the first page
    pub fn first_page(environment_id: u64, page_size: u32) -> Self {
        Self {
            environment_id,
            first: page_size,
            after: None,
        }
    }

    /// Request the page following `cursor`
    pub fn next_page(&self, cursor: impl Into<String>) -> Self {
        Self {
            after: Some(cursor.into()),
            ..self.clone()
        }
    }
}

/// JSON body posted to the GraphQL endpoint
#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a, V> {
    pub query: &'a str,
    pub variables: &'a V,
}

/// Top-level GraphQL envelope
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct GraphQlResponse<T> {
    #[serde(default)]
    pub data: Option<T>,

    #[serde(default)]
    pub errors: Option<Vec<GraphQlError>>,
}

/// One entry of the GraphQL `errors` array
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ModelsData {
    #[serde(deserialize_with = "nullable")]
    pub environment: Option<EnvironmentNode>,
}

#[derive(Debug, Deserialize)]
pub struct EnvironmentNode {
    #[serde(deserialize_with = "nullable")]
    pub applied: Option<AppliedState>,
}

#[derive(Debug, Deserialize)]
pub struct AppliedState {
    pub models: ModelConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConnection {
    pub page_info: PageInfo,

    #[serde(default)]
    pub total_count: Option<u64>,

    pub edges: Vec<ModelEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(deserialize_with = "nullable")]
    pub end_cursor: Option<String>,

    pub has_next_page: bool,

    #[serde(default)]
    pub has_previous_page: bool,

    #[serde(default)]
    pub start_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ModelEdge {
    pub node: Model,
}

/// One decoded page of models
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelsPage {
    pub models: Vec<Model>,

    pub has_next_page: bool,

    pub end_cursor: Option<String>,

    /// Total models in the environment, when the API reports it
    pub total_count: Option<u64>,
}

impl From<ModelConnection> for ModelsPage {
    fn from(connection: ModelConnection) -> Self {
        Self {
            models: connection.edges.into_iter().map(|e| e.node).collect(),
            has_next_page: connection.page_info.has_next_page,
            end_cursor: connection.page_info.end_cursor,
            total_count: connection.total_count,
        }
    }
}

/// Decode a raw response body for [`MODELS_QUERY`]
pub fn parse_models_response(body: &str, environment_id: u64) -> Result<ModelsPage, DiscoveryError> {
    let response: GraphQlResponse<ModelsData> = serde_json::from_str(body)
        .map_err(|e| DiscoveryError::InvalidResponse(e.to_string()))?;

    if let Some(errors) = response.errors.filter(|e| !e.is_empty()) {
        return Err(DiscoveryError::GraphQl(
            errors.into_iter().map(|e| e.message).collect(),
        ));
    }

    let data = response
        .data
        .ok_or_else(|| DiscoveryError::InvalidResponse("response has no data".to_string()))?;

    let environment = data
        .environment
        .ok_or(DiscoveryError::EnvironmentNotFound(environment_id))?;

    let applied = environment.applied.ok_or_else(|| {
        DiscoveryError::InvalidResponse(format!(
            "environment {} has no applied state",
            environment_id
        ))
    })?;

    Ok(applied.models.into())
}
