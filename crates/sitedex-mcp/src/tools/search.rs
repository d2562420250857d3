//! Search tool: run the query, then publish or inline each hit's page

use futures::future::try_join_all;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sitedex_core::html::{page_text, truncate_chars};
use sitedex_core::{IndexHit, Searcher, Site};

use crate::error::McpResult;
use crate::registry::publish_page;
use crate::types::PageRegistry;

/// Default number of ranked hits returned
pub const DEFAULT_LIMIT: u32 = 20;

/// Parameters for the search tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// Search query; multi-word queries require every word, then fall back to single words
    pub query: String,

    /// Maximum number of results to return (default 20)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl SearchParams {
    /// Effective hit limit
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT) as usize
    }
}

/// Output from the search tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchToolOutput {
    /// Number of matching pages, independent of the limit
    pub total: u64,
    /// Ranked results
    pub hits: Vec<SearchResult>,
}

/// Individual search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchResult {
    /// Page title
    pub title: String,
    /// Absolute page URL; also the resource URI when resources are enabled
    pub url: String,
    /// Plain-text snippet around the match
    pub excerpt: String,
    /// Page text (full indexed text with resources, excerpt-length text without)
    pub content: String,
}

/// Result of one tool invocation, including what it published
#[derive(Debug, Clone)]
pub struct SearchRun {
    /// Tool output
    pub output: SearchToolOutput,
    /// Number of resources this call added
    pub published: usize,
}

/// Shared state the search tool works against
pub struct SearchContext<'a> {
    /// Query front end
    pub searcher: &'a Searcher,
    /// Site for page loads
    pub site: &'a Site,
    /// Published resources
    pub registry: &'a PageRegistry,
    /// Whether hits are published as resources
    pub resources_enabled: bool,
}

/// Handle a search tool call.
///
/// With resources enabled every hit page not yet published is loaded and
/// registered, and `content` is the indexed body text. Without resources the
/// page is loaded, stripped to text, and cut to the excerpt's length.
/// Any failed page load fails the whole call.
#[tracing::instrument(skip(ctx, params), fields(query = %params.query))]
pub async fn handle_search(ctx: &SearchContext<'_>, params: &SearchParams) -> McpResult<SearchRun> {
    let outcome = ctx.searcher.search(&params.query, params.limit())?;

    let (hits, published) = if ctx.resources_enabled {
        let added = try_join_all(
            outcome
                .hits
                .iter()
                .map(|hit| publish_page(ctx.registry, ctx.site, &hit.url, &hit.title)),
        )
        .await?;
        let hits: Vec<_> = outcome.hits.into_iter().map(with_indexed_content).collect();
        (hits, added.into_iter().filter(|added| *added).count())
    } else {
        let hits = try_join_all(
            outcome
                .hits
                .into_iter()
                .map(|hit| inline_content(ctx.site, hit)),
        )
        .await?;
        (hits, 0)
    };

    tracing::debug!(total = outcome.total, returned = hits.len(), published, "search handled");

    Ok(SearchRun {
        output: SearchToolOutput {
            total: outcome.total as u64,
            hits,
        },
        published,
    })
}

fn with_indexed_content(hit: IndexHit) -> SearchResult {
    SearchResult {
        title: hit.title,
        url: hit.url,
        excerpt: hit.excerpt,
        content: hit.body,
    }
}

async fn inline_content(site: &Site, hit: IndexHit) -> McpResult<SearchResult> {
    let html = site.load_page(&hit.url).await?;
    let text = page_text(&html);
    let content = truncate_chars(&text, hit.excerpt.chars().count()).to_string();
    Ok(SearchResult {
        title: hit.title,
        url: hit.url,
        excerpt: hit.excerpt,
        content,
    })
}
