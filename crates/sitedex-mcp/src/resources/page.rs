//! Page resources: published result pages plus the site-wide template.
//!
//! Published pages are served from the registry exactly as captured. Any
//! other URI under the site origin is addressable through the
//! `{origin}/{+path}` template and loaded on demand without being published.

use rmcp::model::{
    AnnotateAble, RawResource, ReadResourceResult, Resource, ResourceContents, ResourceTemplate,
};
use serde_json::json;
use sitedex_core::Site;

use crate::error::{McpError, McpResult};
use crate::registry::{published_entries, published_page};
use crate::types::{HTML_MIME_TYPE, PageRegistry};

/// URI template covering every page of the site
pub fn template_uri(origin: &str) -> String {
    format!("{origin}/{{+path}}")
}

/// Whether `uri` is addressable through the site template
pub fn matches_template(origin: &str, uri: &str) -> bool {
    uri.strip_prefix(origin)
        .is_some_and(|path| path.len() > 1 && path.starts_with('/'))
}

/// The single resource template advertised in resource mode.
pub fn site_template(origin: &str) -> McpResult<ResourceTemplate> {
    let template = json!({
        "uriTemplate": template_uri(origin),
        "name": "site-page",
        "description": format!("Any page under {origin}, fetched on demand"),
        "mimeType": HTML_MIME_TYPE,
    });
    serde_json::from_value(template).map_err(McpError::from)
}

/// Every published page as a listable resource.
pub async fn list_published(registry: &PageRegistry) -> Vec<Resource> {
    published_entries(registry)
        .await
        .into_iter()
        .map(|(url, title)| {
            let mut raw = RawResource::new(url, title);
            raw.mime_type = Some(HTML_MIME_TYPE.to_string());
            raw.no_annotation()
        })
        .collect()
}

/// Read a page resource.
///
/// Exact published URIs win; template matches are loaded on demand.
///
/// # Errors
///
/// Returns [`McpError::ResourceNotFound`] when the URI is neither published
/// nor under the site origin, or when the page does not exist.
#[tracing::instrument(skip(registry, site))]
pub async fn read_page(registry: &PageRegistry, site: &Site, uri: &str) -> McpResult<ReadResourceResult> {
    if let Some(page) = published_page(registry, uri).await {
        tracing::debug!(uri, "serving published page");
        return Ok(html_contents(uri, page.html));
    }

    if !matches_template(site.origin(), uri) {
        return Err(McpError::ResourceNotFound(uri.to_string()));
    }

    tracing::debug!(uri, "loading page through template");
    match site.load_page(uri).await {
        Ok(html) => Ok(html_contents(uri, html)),
        Err(sitedex_core::Error::NotFound(_)) => Err(McpError::ResourceNotFound(uri.to_string())),
        Err(e) => Err(e.into()),
    }
}

fn html_contents(uri: &str, html: String) -> ReadResourceResult {
    let mut contents = ResourceContents::text(html, uri);
    if let ResourceContents::TextResourceContents { mime_type, .. } = &mut contents {
        *mime_type = Some(HTML_MIME_TYPE.to_string());
    }
    ReadResourceResult {
        contents: vec![contents],
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://news.example";

    #[test]
    fn test_template_uri() {
        assert_eq!(template_uri(ORIGIN), "https://news.example/{+path}");
    }

    #[test]
    fn test_matches_template() {
        assert!(matches_template(ORIGIN, "https://news.example/issues/a"));
        assert!(!matches_template(ORIGIN, "https://news.example/"));
        assert!(!matches_template(ORIGIN, "https://news.example"));
        assert!(!matches_template(ORIGIN, "https://news.example.evil/a"));
        assert!(!matches_template(ORIGIN, "https://other.example/a"));
    }

    #[test]
    fn test_site_template_fields() {
        let template = site_template(ORIGIN).unwrap();
        let value = serde_json::to_value(&template).unwrap();
        assert_eq!(value["uriTemplate"], "https://news.example/{+path}");
        assert_eq!(value["mimeType"], "text/html");
    }

    #[test]
    fn test_html_contents_mime_type() {
        let result = html_contents("https://news.example/a", "<p>hi</p>".into());
        match &result.contents[0] {
            ResourceContents::TextResourceContents {
                uri,
                mime_type,
                text,
                ..
            } => {
                assert_eq!(uri, "https://news.example/a");
                assert_eq!(mime_type.as_deref(), Some("text/html"));
                assert_eq!(text, "<p>hi</p>");
            },
            ResourceContents::BlobResourceContents { .. } => panic!("expected text contents"),
        }
    }
}
