use serde::{Deserialize, Serialize};

use crate::html;

/// A page handed to the index builder.
///
/// `url` is either site-relative (`/openai.html`) or absolute; relative URLs
/// are made absolute with the site origin when they come back out of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedPage {
    /// Page URL as stored in the index
    pub url: String,
    /// Title from `<title>`, falling back to the first `<h1>`, then the URL
    pub title: String,
    /// Visible body text, whitespace collapsed
    pub text: String,
}

impl IndexedPage {
    /// Build an indexable page from raw HTML.
    pub fn from_html(url: impl Into<String>, source: &str) -> Self {
        let url = url.into();
        let title = html::page_title(source).unwrap_or_else(|| url.clone());
        Self {
            text: html::page_text(source),
            title,
            url,
        }
    }
}

/// One ranked hit, materialized from stored fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexHit {
    /// Absolute page URL
    pub url: String,
    /// Page title from index metadata
    pub title: String,
    /// Plain-text snippet around the match
    pub excerpt: String,
    /// Full body text stored in the index
    pub body: String,
}

/// Result of [`crate::Searcher::search`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Unfiltered match count of the attempt that was used
    pub total: usize,
    /// Ranked hits, at most `limit` of them
    pub hits: Vec<IndexHit>,
    /// Single token that produced the result when the full query found nothing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_token: Option<String>,
}
