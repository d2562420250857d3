//! Configuration for the site index.
//!
//! Settings come from four layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. TOML config file (`--config`, `SITEDEX_CONFIG`, or the platform config dir)
//! 3. Environment (`SITEDEX_CACHE_DIR`, `HTTPS_PROXY`)
//! 4. Command-line flags (applied by the binary)
//!
//! The result is a validated [`SiteConfig`] built once at startup and passed
//! explicitly to everything that needs it.
//!
//! ## Example Configuration File
//!
//! ```toml
//! tool_name = "search_news"
//! resources = true
//! origin = "https://news.example"
//!
//! [source]
//! kind = "pages"
//! pages = ["https://news.example/issues/a", "https://news.example/issues/b"]
//!
//! [http]
//! port = 8848
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// Origin used for the generated sample site; matches the default HTTP listener.
pub const DEFAULT_SAMPLE_ORIGIN: &str = "http://localhost:8848";

/// Origin of the generated sample site when served on `port`.
pub fn sample_origin(port: u16) -> String {
    format!("http://localhost:{port}")
}

/// Environment variable overriding the cache root
pub const CACHE_DIR_ENV: &str = "SITEDEX_CACHE_DIR";

/// Environment variable pointing at a config file
pub const CONFIG_PATH_ENV: &str = "SITEDEX_CONFIG";

/// Where the pages to index come from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentSource {
    /// Generated fixture pages written to the cache's `site/` directory
    #[default]
    Sample,
    /// Remote HTML pages fetched at startup
    Pages {
        /// Absolute page URLs
        pages: Vec<String>,
    },
    /// Pre-built index bundle downloaded from another sitedex host
    Mirror {
        /// Host origin serving `/index/manifest.json`
        host: String,
    },
}

impl ContentSource {
    /// Short name used in logs
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Sample => "sample",
            Self::Pages { .. } => "pages",
            Self::Mirror { .. } => "mirror",
        }
    }
}

/// Validated settings for building and serving the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Content source for this process
    pub source: ContentSource,
    /// Origin prefixed to site-relative URLs, without a trailing slash
    pub origin: String,
    /// Root of the cache directory
    pub cache_root: PathBuf,
    /// Proxy used for HTTPS fetches only
    pub https_proxy: Option<String>,
}

impl SiteConfig {
    /// Validate and normalize raw settings.
    ///
    /// - `mirror` requires a non-empty host; its trailing slash is trimmed
    /// - `pages` requires at least one absolute http(s) URL
    /// - the origin defaults per source and must be an absolute http(s) URL
    pub fn new(
        source: ContentSource,
        origin: Option<String>,
        cache_root: PathBuf,
        https_proxy: Option<String>,
    ) -> Result<Self> {
        let source = match source {
            ContentSource::Sample => ContentSource::Sample,
            ContentSource::Pages { pages } => {
                if pages.is_empty() {
                    return Err(Error::Config(
                        "the pages source needs at least one page URL".into(),
                    ));
                }
                for page in &pages {
                    parse_http_url(page)?;
                }
                ContentSource::Pages { pages }
            },
            ContentSource::Mirror { host } => {
                let host = trim_origin(&host);
                if host.is_empty() {
                    return Err(Error::Config(
                        "the mirror source requires --host <URL>".into(),
                    ));
                }
                parse_http_url(&host)?;
                ContentSource::Mirror { host }
            },
        };

        let origin = match origin.map(|o| trim_origin(&o)).filter(|o| !o.is_empty()) {
            Some(origin) => origin,
            None => default_origin(&source)?,
        };
        parse_http_url(&origin)?;

        let https_proxy = https_proxy.filter(|p| !p.trim().is_empty());

        Ok(Self {
            source,
            origin,
            cache_root,
            https_proxy,
        })
    }

    /// Cache root from `SITEDEX_CACHE_DIR`, if set.
    pub fn cache_root_from_env() -> Option<PathBuf> {
        std::env::var(CACHE_DIR_ENV)
            .ok()
            .map(|dir| dir.trim().to_string())
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
    }

    /// Platform cache location, falling back to the temp directory.
    pub fn default_cache_root() -> PathBuf {
        directories::ProjectDirs::from("dev", "sitedex", "sitedex").map_or_else(
            || std::env::temp_dir().join("sitedex"),
            |dirs| dirs.cache_dir().to_path_buf(),
        )
    }

    /// HTTPS proxy from `HTTPS_PROXY` or `https_proxy`.
    pub fn proxy_from_env() -> Option<String> {
        ["HTTPS_PROXY", "https_proxy"]
            .iter()
            .find_map(|key| std::env::var(key).ok())
            .filter(|value| !value.trim().is_empty())
    }
}

fn default_origin(source: &ContentSource) -> Result<String> {
    match source {
        ContentSource::Sample => Ok(DEFAULT_SAMPLE_ORIGIN.to_string()),
        ContentSource::Pages { pages } => {
            let first = pages
                .first()
                .ok_or_else(|| Error::Config("no pages configured".into()))?;
            Ok(parse_http_url(first)?.origin().ascii_serialization())
        },
        ContentSource::Mirror { host } => Ok(host.clone()),
    }
}

fn trim_origin(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn parse_http_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::InvalidUrl(format!("'{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::InvalidUrl(format!(
            "'{raw}': unsupported scheme '{other}'"
        ))),
    }
}

/// `[http]` table of the config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpFileConfig {
    /// Serve over HTTP instead of stdio
    pub enabled: Option<bool>,
    /// Listen port
    pub port: Option<u16>,
}

/// On-disk configuration; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Name of the search tool
    pub tool_name: Option<String>,
    /// Whether result pages are published as resources
    pub resources: Option<bool>,
    /// Site origin override
    pub origin: Option<String>,
    /// Cache root override
    pub cache_dir: Option<PathBuf>,
    /// Content source
    pub source: Option<ContentSource>,
    /// HTTP transport settings
    pub http: Option<HttpFileConfig>,
}

impl FileConfig {
    /// Load a config file. A missing file at the default location is not an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let (path, required) = match explicit {
            Some(path) => (Some(path.to_path_buf()), true),
            None => match std::env::var(CONFIG_PATH_ENV) {
                Ok(path) if !path.trim().is_empty() => (Some(PathBuf::from(path.trim())), true),
                _ => (Self::default_path(), false),
            },
        };

        let Some(path) = path else {
            return Ok(Self::default());
        };

        if !path.exists() {
            if required {
                return Err(Error::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Ok(Self::default());
        }

        debug!(path = %path.display(), "loading config file");
        let content = fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("Failed to parse config: {e}")))
    }

    /// Platform config location, e.g. `~/.config/sitedex/sitedex.toml` on Linux
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "sitedex", "sitedex")
            .map(|dirs| dirs.config_dir().join("sitedex.toml"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cache() -> PathBuf {
        PathBuf::from("/tmp/sitedex-test")
    }

    #[test]
    fn test_sample_defaults() {
        let config = SiteConfig::new(ContentSource::Sample, None, cache(), None).unwrap();
        assert_eq!(config.origin, DEFAULT_SAMPLE_ORIGIN);
        assert_eq!(config.https_proxy, None);
    }

    #[test]
    fn test_mirror_host_trailing_slash_trimmed() {
        let config = SiteConfig::new(
            ContentSource::Mirror {
                host: "https://mirror.example/".into(),
            },
            None,
            cache(),
            None,
        )
        .unwrap();

        assert_eq!(
            config.source,
            ContentSource::Mirror {
                host: "https://mirror.example".into()
            }
        );
        assert_eq!(config.origin, "https://mirror.example");
    }

    #[test]
    fn test_mirror_requires_host() {
        let err = SiteConfig::new(
            ContentSource::Mirror { host: "  ".into() },
            None,
            cache(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("--host")));
    }

    #[test]
    fn test_pages_origin_from_first_page() {
        let config = SiteConfig::new(
            ContentSource::Pages {
                pages: vec![
                    "https://news.example/issues/a".into(),
                    "https://news.example/issues/b".into(),
                ],
            },
            None,
            cache(),
            Some("http://proxy:3128".into()),
        )
        .unwrap();

        assert_eq!(config.origin, "https://news.example");
        assert_eq!(config.https_proxy.as_deref(), Some("http://proxy:3128"));
    }

    #[test]
    fn test_pages_rejects_empty_and_bad_urls() {
        let empty = SiteConfig::new(ContentSource::Pages { pages: vec![] }, None, cache(), None);
        assert!(matches!(empty, Err(Error::Config(_))));

        let relative = SiteConfig::new(
            ContentSource::Pages {
                pages: vec!["/issues/a".into()],
            },
            None,
            cache(),
            None,
        );
        assert!(matches!(relative, Err(Error::InvalidUrl(_))));

        let ftp = SiteConfig::new(
            ContentSource::Pages {
                pages: vec!["ftp://files.example/a".into()],
            },
            None,
            cache(),
            None,
        );
        assert!(matches!(ftp, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_explicit_origin_wins() {
        let config = SiteConfig::new(
            ContentSource::Sample,
            Some("https://site.example/".into()),
            cache(),
            Some("   ".into()),
        )
        .unwrap();
        assert_eq!(config.origin, "https://site.example");
        assert_eq!(config.https_proxy, None, "blank proxy is ignored");
    }

    #[test]
    fn test_file_config_parses_tables() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sitedex.toml");
        fs::write(
            &path,
            r#"
tool_name = "search_news"
resources = false

[source]
kind = "mirror"
host = "https://mirror.example"

[http]
port = 9000
"#,
        )
        .unwrap();

        let config = FileConfig::load(Some(&path)).unwrap();
        assert_eq!(config.tool_name.as_deref(), Some("search_news"));
        assert_eq!(config.resources, Some(false));
        assert_eq!(
            config.source,
            Some(ContentSource::Mirror {
                host: "https://mirror.example".into()
            })
        );
        assert_eq!(config.http.and_then(|h| h.port), Some(9000));
    }

    #[test]
    fn test_file_config_missing_explicit_path() {
        let temp = TempDir::new().unwrap();
        let result = FileConfig::load(Some(&temp.path().join("nope.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_file_config_rejects_unknown_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sitedex.toml");
        fs::write(&path, "tool = \"typo\"\n").unwrap();
        assert!(matches!(
            FileConfig::load(Some(&path)),
            Err(Error::Config(_))
        ));
    }
}
