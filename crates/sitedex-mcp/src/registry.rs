//! Published resource registry with double-checked locking

use sitedex_core::Site;

use crate::error::McpResult;
use crate::types::{PageRegistry, PublishedPage};

/// Publish `url` unless it is already registered.
///
/// Returns `true` when this call added the page. The fast path takes only a
/// read lock. On a miss the page is loaded without holding any lock, then the
/// write lock re-checks before inserting. Concurrent misses may load the same
/// page twice; only the first insert is kept, so a URL's content never changes.
///
/// # Errors
///
/// Returns an error if the page cannot be loaded; nothing is registered then.
#[tracing::instrument(skip(registry, site, title))]
pub async fn publish_page(
    registry: &PageRegistry,
    site: &Site,
    url: &str,
    title: &str,
) -> McpResult<bool> {
    // Fast path: already published
    if registry.read().await.contains_key(url) {
        tracing::debug!(url, "resource already published");
        return Ok(false);
    }

    tracing::debug!(url, "publishing resource");
    let html = site.load_page(url).await?;

    let mut write_lock = registry.write().await;
    if write_lock.contains_key(url) {
        tracing::debug!(url, "resource published by another task");
        return Ok(false);
    }
    write_lock.insert(
        url.to_string(),
        PublishedPage {
            title: title.to_string(),
            html,
        },
    );
    drop(write_lock);

    tracing::info!(url, "resource published");
    Ok(true)
}

/// Look up a published page.
pub async fn published_page(registry: &PageRegistry, url: &str) -> Option<PublishedPage> {
    registry.read().await.get(url).cloned()
}

/// Every published URL with its title, sorted by URL.
pub async fn published_entries(registry: &PageRegistry) -> Vec<(String, String)> {
    let read_lock = registry.read().await;
    let mut entries: Vec<_> = read_lock
        .iter()
        .map(|(url, page)| (url.clone(), page.title.clone()))
        .collect();
    drop(read_lock);
    entries.sort();
    entries
}
