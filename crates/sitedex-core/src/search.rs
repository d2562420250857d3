use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::index::{QueryResult, SearchIndex};
use crate::source::absolute_url;
use crate::{IndexHit, Result, SearchOutcome};

/// Query front end with single-token fallback and URL normalization.
#[derive(Clone)]
pub struct Searcher {
    index: Arc<SearchIndex>,
    origin: String,
}

impl Searcher {
    /// Wrap an index; relative URLs are resolved against `origin`
    pub fn new(index: Arc<SearchIndex>, origin: impl Into<String>) -> Self {
        Self {
            index,
            origin: origin.into(),
        }
    }

    /// Run `query`, falling back to its individual tokens when it matches nothing.
    ///
    /// Tokens are tried left to right and the first one with any match wins.
    /// When none matches, the last attempt's (empty) result is returned.
    /// `total` always comes from the attempt that was used.
    #[instrument(skip(self), level = "debug")]
    pub fn search(&self, query: &str, limit: usize) -> Result<SearchOutcome> {
        let mut result = self.index.query(query, limit)?;
        let mut fallback_token = None;

        if result.total == 0 && query.contains(char::is_whitespace) {
            for token in query.split_whitespace() {
                debug!(token, "retrying with single token");
                result = self.index.query(token, limit)?;
                if result.total > 0 {
                    fallback_token = Some(token.to_string());
                    break;
                }
            }
        }

        info!(
            query,
            total = result.total,
            fallback_token = fallback_token.as_deref(),
            "search complete"
        );
        Ok(self.materialize(result, fallback_token))
    }

    fn materialize(&self, result: QueryResult, fallback_token: Option<String>) -> SearchOutcome {
        let hits = result
            .hits
            .into_iter()
            .map(|hit| IndexHit {
                url: absolute_url(&self.origin, &hit.url),
                title: hit.title,
                excerpt: hit.excerpt,
                body: hit.body,
            })
            .collect();

        SearchOutcome {
            total: result.total,
            hits,
            fallback_token,
        }
    }
}
