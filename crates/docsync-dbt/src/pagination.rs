//! Cursor pagination over the models connection

use docsync_core::Model;
use crate::client::{DiscoveryApi, DiscoveryError};
use crate::query::PageRequest;

/// Fetch every applied model of an environment
///
/// Pages are requested one after another, each with the previous page's end
/// cursor, until the API reports no further page. Models are returned in
/// page order. Any failed page aborts the whole read.
pub async fn fetch_all_models(
    api: &dyn DiscoveryApi,
    environment_id: u64,
    page_size: u32,
) -> Result<Vec<Model>, DiscoveryError> {
    let mut models = Vec::new();
    let mut request = PageRequest::first_page(environment_id, page_size);
    let mut page_number = 1;

    loop {
        let page = api.models_page(&request).await?;

        tracing::debug!(
            page = page_number,
            cursor = request.after.as_deref().unwrap_or("<start>"),
            models = page.models.len(),
            "fetched models page"
        );

        models.extend(page.models);

        if !page.has_next_page {
            break;
        }

        let cursor = page
            .end_cursor
            .ok_or(DiscoveryError::MissingCursor { page: page_number })?;
        request = request.next_page(cursor);
        page_number += 1;
    }

    tracing::info!(
        environment_id,
        pages = page_number,
        models = models.len(),
        "collected models from discovery API"
    );

    Ok(models)
}
