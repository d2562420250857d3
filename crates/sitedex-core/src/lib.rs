//! # sitedex-core
//!
//! Core functionality for sitedex - full-text search over a small static site,
//! built once at startup and queried by an MCP server.
//!
//! ## Architecture
//!
//! - **Content sources**: generated sample pages, remote pages, or a mirrored
//!   index bundle
//! - **Index**: tantivy behind `create`/`open`/`query`, persisted in the cache
//!   directory with a manifest describing the files
//! - **Search**: conjunctive query with a single-token fallback and absolute URLs
//! - **Error Handling**: one error enum with categorization and recovery hints
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sitedex_core::{ContentSource, Searcher, SiteConfig, build_index};
//!
//! # async fn run() -> sitedex_core::Result<()> {
//! let config = SiteConfig::new(
//!     ContentSource::Sample,
//!     None,
//!     SiteConfig::default_cache_root(),
//!     None,
//! )?;
//! let built = build_index(&config).await?;
//! let searcher = Searcher::new(Arc::new(built.index), built.site.origin());
//!
//! let outcome = searcher.search("openai", 20)?;
//! println!("{} matches", outcome.total);
//! # Ok(())
//! # }
//! ```

/// Index construction at startup
pub mod builder;
/// Index bundle manifests and mirror downloads
pub mod bundle;
/// Layered configuration and content source selection
pub mod config;
/// Error types and result aliases
pub mod error;
/// HTTP fetching for pages and bundle files
pub mod fetcher;
/// HTML to text extraction
pub mod html;
/// Search index implementation using Tantivy
pub mod index;
/// Generated fixture pages
pub mod sample;
/// Query front end with token fallback
pub mod search;
/// Page collection and loading for each content source
pub mod source;
/// Cache directory layout
pub mod storage;
/// Core data types
pub mod types;

// Re-export commonly used types
pub use builder::{BuiltIndex, build_index};
pub use bundle::{BUNDLE_ROUTE, Manifest, ManifestEntry};
pub use config::{ContentSource, FileConfig, HttpFileConfig, SiteConfig};
pub use error::{Error, Result};
pub use fetcher::Fetcher;
pub use index::SearchIndex;
pub use search::Searcher;
pub use source::Site;
pub use storage::Storage;
pub use types::*;
