//! Error types and handling for sitedex-core operations.
//!
//! A single error enum covers every failure the index pipeline can hit, from
//! reading the config file to downloading a mirrored bundle. Errors carry a
//! category that failed tool calls log alongside the message.
//!
//! ## Error Categories
//!
//! - **I/O Errors**: cache directory and fixture file operations
//! - **Network Errors**: page fetches and bundle downloads
//! - **Parse Errors**: HTML documents, manifests
//! - **Index Errors**: tantivy index creation, commits, and queries
//! - **Storage Errors**: cache layout and bundle integrity
//! - **Configuration Errors**: invalid settings or config files
//!
//! ## Categories in logs
//!
//! ```rust
//! use sitedex_core::Error;
//!
//! let err = Error::Index("commit failed".to_string());
//! assert_eq!(err.category(), "index");
//! ```

use thiserror::Error;

/// The main error type for sitedex-core operations.
///
/// All public functions in sitedex-core return `Result<T, Error>`. The error
/// chain is preserved through `source()` for the wrapped I/O and network
/// errors.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Covers cache directory creation, fixture writes, and local page reads.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network operation failed.
    ///
    /// Covers page fetches for the `pages` source, resource loads at query
    /// time, and bundle downloads for the `mirror` source. Nothing retries.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Parsing operation failed.
    ///
    /// Occurs when a fetched document or manifest does not have the expected
    /// shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Search index operation failed.
    ///
    /// Covers failures in creating, committing, opening, or querying the
    /// tantivy index.
    #[error("Index error: {0}")]
    Index(String),

    /// Storage operation failed.
    ///
    /// Covers cache layout problems beyond plain I/O, such as a bundle file
    /// whose checksum does not match its manifest entry.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration is invalid or inaccessible.
    ///
    /// ## Common Causes
    ///
    /// - Invalid TOML syntax in the config file
    /// - `mirror` source selected without a host
    /// - `pages` source selected with an empty page list
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource was not found.
    ///
    /// Used for 404 responses and for local page paths that do not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// URL is malformed or invalid.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<tantivy::TantivyError> for Error {
    fn from(err: tantivy::TantivyError) -> Self {
        Self::Index(err.to_string())
    }
}

impl Error {
    /// Get the error category as a string identifier.
    ///
    /// Used as the `category` field on error log events.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(_) => "network",
            Self::Parse(_) => "parse",
            Self::Index(_) => "index",
            Self::Storage(_) => "storage",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::InvalidUrl(_) => "invalid_url",
            Self::Serialization(_) => "serialization",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
