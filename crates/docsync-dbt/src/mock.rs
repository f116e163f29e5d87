//! Mock Discovery API for testing
//!
//! Serves a scripted sequence of pages without any network access. Page `n`
//! (zero-based) is served for the cursor `cursor-n`, and the first page for
//! a request without a cursor, so tests also verify that callers thread the
//! end cursor through correctly. Every request is recorded.
//!
//! ```rust,ignore
//! let api = MockDiscoveryClient::new()
//!     .with_page(vec![Model::new("db", "sch", "a"), Model::new("db", "sch", "b")])
//!     .with_page(vec![Model::new("db", "sch", "c")]);
//!
//! let models = fetch_all_models(&api, 1, 2).await?;
//! assert_eq!(models.len(), 3);
//! ```

use std::sync::Arc;
use tokio::sync::Mutex;
use docsync_core::Model;
use crate::client::{DiscoveryApi, DiscoveryError};
use crate::query::{ModelsPage, PageRequest};

#[derive(Debug, Clone)]
enum ScriptedPage {
    Models(Vec<Model>),
    Raw(ModelsPage),
    Fail(DiscoveryError),
}

/// In-memory Discovery API
#[derive(Clone, Default)]
pub struct MockDiscoveryClient {
    pages: Vec<ScriptedPage>,

    /// Requests received, in order (shared between clones)
    requests: Arc<Mutex<Vec<PageRequest>>>,
}

impl MockDiscoveryClient {
    /// Create a mock that serves a single empty page
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page of models
    pub fn with_page(mut self, models: Vec<Model>) -> Self {
        self.pages.push(ScriptedPage::Models(models));
        self
    }

    /// Append a page that is returned verbatim, pagination fields included
    pub fn with_raw_page(mut self, page: ModelsPage) -> Self {
        self.pages.push(ScriptedPage::Raw(page));
        self
    }

    /// Append a page whose request fails
    pub fn with_failing_page(mut self, error: DiscoveryError) -> Self {
        self.pages.push(ScriptedPage::Fail(error));
        self
    }

    /// All requests received so far
    pub async fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().await.clone()
    }

    /// Number of requests received so far
    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    fn page_index(after: Option<&str>) -> Result<usize, DiscoveryError> {
        match after {
            None => Ok(0),
            Some(cursor) => cursor
                .strip_prefix("cursor-")
                .and_then(|n| n.parse().ok())
                .ok_or_else(|| DiscoveryError::InvalidResponse(format!("unknown cursor '{}'", cursor))),
        }
    }
}

#[async_trait::async_trait]
impl DiscoveryApi for MockDiscoveryClient {
    async fn models_page(&self, request: &PageRequest) -> Result<ModelsPage, DiscoveryError> {
        self.requests.lock().await.push(request.clone());

        let index = Self::page_index(request.after.as_deref())?;

        if self.pages.is_empty() && index == 0 {
            return Ok(ModelsPage {
                models: Vec::new(),
                has_next_page: false,
                end_cursor: None,
                total_count: Some(0),
            });
        }

        let page = self.pages.get(index).ok_or_else(|| {
            DiscoveryError::InvalidResponse(format!("no page scripted at index {}", index))
        })?;

        match page {
            ScriptedPage::Models(models) => Ok(ModelsPage {
                models: models.clone(),
                has_next_page: index + 1 < self.pages.len(),
                end_cursor: Some(format!("cursor-{}", index + 1)),
                total_count: None,
            }),
            ScriptedPage::Raw(page) => Ok(page.clone()),
            ScriptedPage::Fail(error) => Err(error.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_mock_serves_empty_page() {
        let api = MockDiscoveryClient::new();
        let page = api.models_page(&PageRequest::first_page(1, 10)).await.unwrap();

        assert!(page.models.is_empty());
        assert!(!page.has_next_page);
    }

    #[tokio::test]
    async fn unknown_cursor_is_rejected() {
        let api = MockDiscoveryClient::new().with_page(vec![]);
        let request = PageRequest::first_page(1, 10).next_page("bogus");

        assert!(matches!(
            api.models_page(&request).await,
            Err(DiscoveryError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn clones_share_request_log() {
        let api = MockDiscoveryClient::new();
        let clone = api.clone();

        clone.models_page(&PageRequest::first_page(1, 10)).await.unwrap();
        assert_eq!(api.request_count().await, 1);
    }
}
