//! dbt Cloud Discovery API access
//!
//! This crate handles:
//! - The GraphQL models query and its typed response shapes
//! - The HTTP client for the Discovery API
//! - Cursor pagination over all applied models of an environment
//! - An in-memory mock of the API for tests

pub mod query;
pub mod client;
pub mod pagination;
pub mod mock;

pub use query::{PageRequest, PageInfo, ModelsPage, MODELS_QUERY, parse_models_response};
pub use client::{DiscoveryApi, DiscoveryClient, DiscoveryError};
pub use pagination::fetch_all_models;
pub use mock::MockDiscoveryClient;
