use crate::html::{collapse_whitespace, truncate_chars};
use crate::{Error, IndexedPage, Result};
use std::path::Path;
use tantivy::collector::{Count, TopDocs};
use tantivy::query::QueryParser;
use tantivy::schema::{Field, STORED, STRING, Schema, TEXT, Value};
use tantivy::snippet::SnippetGenerator;
use tantivy::{Index, IndexReader, TantivyDocument, doc};
use tracing::{debug, info};

/// Maximum number of characters in a generated excerpt
pub const DEFAULT_EXCERPT_CHARS: usize = 160;

/// Writer heap budget; fixture-sized sites never come close
const WRITER_HEAP_BYTES: usize = 50_000_000;

/// Tantivy-backed page index.
///
/// Exposes only `create`/`open`/`add_pages`/`query`; the schema, tokenizer,
/// and on-disk format stay tantivy's business.
pub struct SearchIndex {
    index: Index,
    url_field: Field,
    title_field: Field,
    text_field: Field,
    reader: IndexReader,
}

/// Raw result of running one query string
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    /// Number of matching documents, independent of the limit
    pub total: usize,
    /// Ranked hits with site-relative or absolute URLs as stored
    pub hits: Vec<StoredHit>,
}

/// One ranked document as stored in the index
#[derive(Debug, Clone)]
pub struct StoredHit {
    /// URL field, exactly as indexed
    pub url: String,
    /// Title field
    pub title: String,
    /// Plain-text snippet around the match
    pub excerpt: String,
    /// Body text field
    pub body: String,
}

impl SearchIndex {
    /// Create an empty index at `index_path`, creating the directory if needed.
    pub fn create(index_path: &Path) -> Result<Self> {
        let mut schema_builder = Schema::builder();

        let url_field = schema_builder.add_text_field("url", STRING | STORED);
        let title_field = schema_builder.add_text_field("title", TEXT | STORED);
        let text_field = schema_builder.add_text_field("text", TEXT | STORED);

        let schema = schema_builder.build();

        std::fs::create_dir_all(index_path)
            .map_err(|e| Error::Index(format!("Failed to create index directory: {e}")))?;

        let index = Index::create_in_dir(index_path, schema)
            .map_err(|e| Error::Index(format!("Failed to create index: {e}")))?;

        Self::from_index(index, url_field, title_field, text_field)
    }

    /// Open an existing index, such as a downloaded bundle.
    ///
    /// Fails when the directory holds no index or its schema lacks the
    /// `url`, `title` or `text` field.
    pub fn open(index_path: &Path) -> Result<Self> {
        let index = Index::open_in_dir(index_path)
            .map_err(|e| Error::Index(format!("Failed to open index: {e}")))?;

        let schema = index.schema();
        let field = |name: &str| {
            schema
                .get_field(name)
                .map_err(|_| Error::Index(format!("Missing {name} field")))
        };
        let url_field = field("url")?;
        let title_field = field("title")?;
        let text_field = field("text")?;

        Self::from_index(index, url_field, title_field, text_field)
    }

    fn from_index(
        index: Index,
        url_field: Field,
        title_field: Field,
        text_field: Field,
    ) -> Result<Self> {
        let reader = index
            .reader_builder()
            .reload_policy(tantivy::ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .map_err(|e| Error::Index(format!("Failed to create reader: {e}")))?;

        Ok(Self {
            index,
            url_field,
            title_field,
            text_field,
            reader,
        })
    }

    /// Add pages, commit, and wait for merges so the files on disk are final.
    pub fn add_pages(&mut self, pages: &[IndexedPage]) -> Result<()> {
        let mut writer = self
            .index
            .writer::<TantivyDocument>(WRITER_HEAP_BYTES)
            .map_err(|e| Error::Index(format!("Failed to create writer: {e}")))?;

        let mut total_text_bytes = 0usize;
        for page in pages {
            total_text_bytes += page.text.len();
            writer
                .add_document(doc!(
                    self.url_field => page.url.as_str(),
                    self.title_field => page.title.as_str(),
                    self.text_field => page.text.as_str()
                ))
                .map_err(|e| Error::Index(format!("Failed to add document: {e}")))?;
        }

        writer
            .commit()
            .map_err(|e| Error::Index(format!("Failed to commit: {e}")))?;
        writer
            .wait_merging_threads()
            .map_err(|e| Error::Index(format!("Failed to finish merges: {e}")))?;

        self.reader
            .reload()
            .map_err(|e| Error::Index(format!("Failed to reload reader: {e}")))?;

        info!(
            pages = pages.len(),
            bytes = total_text_bytes,
            "indexed pages"
        );
        Ok(())
    }

    /// Number of documents visible to the reader
    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Run one query string; every term must match.
    ///
    /// `limit` bounds the ranked hits only; `total` is always the full count.
    pub fn query(&self, query_str: &str, limit: usize) -> Result<QueryResult> {
        let searcher = self.reader.searcher();

        let mut query_parser =
            QueryParser::for_index(&self.index, vec![self.title_field, self.text_field]);
        query_parser.set_conjunction_by_default();

        let sanitized = escape_query(query_str);
        let (query, errors) = query_parser.parse_query_lenient(&sanitized);
        if !errors.is_empty() {
            debug!(query = query_str, ?errors, "lenient query parse dropped clauses");
        }

        // TopDocs preallocates for `limit`; more hits than documents is impossible.
        let limit = limit.min(usize::try_from(searcher.num_docs()).unwrap_or(usize::MAX));

        // TopDocs rejects a zero limit, so only count in that case.
        let (total, top_docs) = if limit == 0 {
            let total = searcher
                .search(&query, &Count)
                .map_err(|e| Error::Index(format!("Search failed: {e}")))?;
            (total, Vec::new())
        } else {
            searcher
                .search(&query, &(Count, TopDocs::with_limit(limit)))
                .map_err(|e| Error::Index(format!("Search failed: {e}")))?
        };

        let mut snippets = SnippetGenerator::create(&searcher, &*query, self.text_field)
            .map_err(|e| Error::Index(format!("Failed to create snippet generator: {e}")))?;
        snippets.set_max_num_chars(DEFAULT_EXCERPT_CHARS);

        let mut hits = Vec::with_capacity(top_docs.len());
        for (_score, doc_address) in top_docs {
            let doc: TantivyDocument = searcher
                .doc(doc_address)
                .map_err(|e| Error::Index(format!("Failed to retrieve doc: {e}")))?;

            let body = self.get_field_text(&doc, self.text_field)?;
            let snippet = snippets.snippet_from_doc(&doc);
            let fragment = collapse_whitespace(snippet.fragment());
            // Title-only matches have no body fragment; lead with the body instead.
            let excerpt = if fragment.is_empty() {
                truncate_chars(&body, DEFAULT_EXCERPT_CHARS).trim_end().to_string()
            } else {
                fragment
            };

            hits.push(StoredHit {
                url: self.get_field_text(&doc, self.url_field)?,
                title: self.get_field_text(&doc, self.title_field)?,
                excerpt,
                body,
            });
        }

        debug!(query = query_str, total, returned = hits.len(), "query executed");
        Ok(QueryResult { total, hits })
    }

    fn get_field_text(&self, doc: &TantivyDocument, field: Field) -> Result<String> {
        doc.get_first(field)
            .and_then(|v| v.as_str())
            .map(std::string::ToString::to_string)
            .ok_or_else(|| Error::Index("Field not found in document".into()))
    }
}

/// Escape query syntax so user text is always treated as plain terms.
fn escape_query(query_str: &str) -> String {
    let needs_escaping = query_str.chars().any(is_query_syntax);
    if !needs_escaping {
        return query_str.to_string();
    }

    let mut sanitized = String::with_capacity(query_str.len() * 2);
    for ch in query_str.chars() {
        if is_query_syntax(ch) {
            sanitized.push('\\');
        }
        sanitized.push(ch);
    }
    sanitized
}

const fn is_query_syntax(ch: char) -> bool {
    matches!(
        ch,
        '\\' | '"' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '~' | ':' | '+' | '-' | '*'
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_pages() -> Vec<IndexedPage> {
        vec![
            IndexedPage {
                url: "/hooks.html".to_string(),
                title: "React hooks".to_string(),
                text: "useState is a React hook that lets you add state to function components."
                    .to_string(),
            },
            IndexedPage {
                url: "/components.html".to_string(),
                title: "Components".to_string(),
                text: "Components are the building blocks of React applications.".to_string(),
            },
            IndexedPage {
                url: "https://other.example/routing".to_string(),
                title: "Routing".to_string(),
                text: "The App Router is the routing system in Next.js.".to_string(),
            },
        ]
    }

    fn build_index(temp_dir: &TempDir) -> SearchIndex {
        let index_path = temp_dir.path().join("index");
        let mut index = SearchIndex::create(&index_path).expect("Should create index");
        index
            .add_pages(&create_test_pages())
            .expect("Should index pages");
        index
    }

    #[test]
    fn test_index_creation() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let index_path = temp_dir.path().join("index");

        assert!(SearchIndex::create(&index_path).is_ok());
        assert!(index_path.exists());
    }

    #[test]
    fn test_index_open_nonexistent() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let result = SearchIndex::open(&temp_dir.path().join("nonexistent"));
        assert!(result.is_err(), "Should fail to open non-existent index");
    }

    #[test]
    fn test_reopen_sees_committed_pages() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        drop(build_index(&temp_dir));

        let reopened = SearchIndex::open(&temp_dir.path().join("index")).unwrap();
        assert_eq!(reopened.num_docs(), 3);
        assert_eq!(reopened.query("useState", 10).unwrap().total, 1);
    }

    #[test]
    fn test_query_counts_beyond_limit() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let index = build_index(&temp_dir);

        let result = index.query("React", 1).unwrap();
        assert_eq!(result.total, 2, "both React pages should be counted");
        assert_eq!(result.hits.len(), 1, "limit bounds returned hits");
    }

    #[test]
    fn test_query_zero_limit() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let index = build_index(&temp_dir);

        let result = index.query("React", 0).unwrap();
        assert_eq!(result.total, 2);
        assert!(result.hits.is_empty());
    }

    #[test]
    fn test_query_huge_limit_is_capped() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let index = build_index(&temp_dir);

        let result = index.query("React", u32::MAX as usize).unwrap();
        assert_eq!(result.total, 2);
        assert_eq!(result.hits.len(), 2);

        let result = index.query("React", usize::MAX).unwrap();
        assert_eq!(result.hits.len(), 2);
    }

    #[test]
    fn test_query_is_conjunctive() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let index = build_index(&temp_dir);

        assert_eq!(index.query("React routing", 10).unwrap().total, 0);
        assert_eq!(index.query("React state", 10).unwrap().total, 1);
    }

    #[test]
    fn test_query_excerpt_is_plain_text() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let index = build_index(&temp_dir);

        let result = index.query("useState", 10).unwrap();
        let hit = &result.hits[0];
        assert_eq!(hit.url, "/hooks.html");
        assert_eq!(hit.title, "React hooks");
        assert!(hit.excerpt.contains("useState"));
        assert!(!hit.excerpt.contains('<'));
        assert!(hit.body.starts_with("useState is a React hook"));
    }

    #[test]
    fn test_title_only_match_still_has_excerpt() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let index = build_index(&temp_dir);

        let result = index.query("hooks", 10).unwrap();
        assert_eq!(result.total, 1);
        assert!(!result.hits[0].excerpt.is_empty());
    }

    #[test]
    fn test_empty_and_syntax_queries_do_not_fail() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let index = build_index(&temp_dir);

        assert_eq!(index.query("", 10).unwrap().total, 0);
        assert!(index.query("title:(\"unbalanced", 10).is_ok());
        assert!(index.query("Next.js -", 10).is_ok());
    }

    #[test]
    fn test_escape_query() {
        assert_eq!(escape_query("plain words"), "plain words");
        assert_eq!(escape_query("a:b"), "a\\:b");
        assert_eq!(escape_query("(x)"), "\\(x\\)");
    }
}
