//! Common types for the sitedex MCP server

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

/// MIME type of every published page
pub const HTML_MIME_TYPE: &str = "text/html";

/// A page captured when it was first published as a resource.
///
/// Content never changes after registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPage {
    /// Title from the index at publication time
    pub title: String,
    /// Full page HTML
    pub html: String,
}

/// Type alias for the published resource set, keyed by absolute URL
pub type PageRegistry = Arc<RwLock<HashMap<String, PublishedPage>>>;
