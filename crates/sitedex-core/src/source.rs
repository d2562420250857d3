use futures::future::try_join_all;
use tracing::{debug, info, instrument};

use crate::config::{ContentSource, SiteConfig};
use crate::fetcher::Fetcher;
use crate::sample::{SAMPLE_PAGES, write_sample_site};
use crate::storage::Storage;
use crate::{Error, IndexedPage, Result};

/// Prefix a site-relative URL with `origin`; URLs starting with `http` pass through.
pub fn absolute_url(origin: &str, url: &str) -> String {
    if url.starts_with("http") {
        return url.to_string();
    }
    if url.starts_with('/') {
        format!("{origin}{url}")
    } else {
        format!("{origin}/{url}")
    }
}

/// The site being indexed: where pages come from and how to load them again.
#[derive(Clone)]
pub struct Site {
    origin: String,
    source: ContentSource,
    storage: Storage,
    fetcher: Fetcher,
}

impl Site {
    /// Build a site from validated settings.
    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        Ok(Self {
            origin: config.origin.clone(),
            source: config.source.clone(),
            storage: Storage::with_root(config.cache_root.clone())?,
            fetcher: Fetcher::new(config.https_proxy.as_deref())?,
        })
    }

    /// Site origin, without a trailing slash
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Where the pages come from
    pub fn source(&self) -> &ContentSource {
        &self.source
    }

    /// Cache layout
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// HTTP client for remote pages
    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Load the raw HTML of a page.
    ///
    /// Sample pages under the origin are read from the cache's `site/`
    /// directory; everything else is fetched over HTTP. No retries.
    #[instrument(skip(self), level = "debug")]
    pub async fn load_page(&self, url: &str) -> Result<String> {
        if let Some(path) = self.local_path(url) {
            let file = self.storage.site_file(path)?;
            debug!(file = %file.display(), "reading local page");
            return tokio::fs::read_to_string(&file).await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::NotFound(format!("no page at '{url}'"))
                } else {
                    Error::Io(e)
                }
            });
        }
        self.fetcher.fetch_text(url).await
    }

    /// Collect every page of the source, ready for indexing.
    ///
    /// Remote pages are fetched concurrently and awaited together; any single
    /// failure fails the whole collection.
    pub async fn collect_pages(&self) -> Result<Vec<IndexedPage>> {
        match &self.source {
            ContentSource::Sample => {
                let site_dir = self.storage.site_dir();
                write_sample_site(&site_dir)?;
                let mut pages = Vec::with_capacity(SAMPLE_PAGES.len());
                for sample in SAMPLE_PAGES {
                    let html = tokio::fs::read_to_string(site_dir.join(sample.file)).await?;
                    pages.push(IndexedPage::from_html(sample.url_path(), &html));
                }
                info!(pages = pages.len(), "generated sample site");
                Ok(pages)
            },
            ContentSource::Pages { pages } => {
                info!(pages = pages.len(), "fetching site pages");
                let fetches = pages.iter().map(|url| async move {
                    let html = self.fetcher.fetch_text(url).await?;
                    Ok::<_, Error>(IndexedPage::from_html(url.as_str(), &html))
                });
                try_join_all(fetches).await
            },
            ContentSource::Mirror { host } => Err(Error::Config(format!(
                "the mirror source downloads a built index from {host} and has no pages to collect"
            ))),
        }
    }

    /// Site-relative path of `url` when it addresses a generated sample page.
    fn local_path<'a>(&self, url: &'a str) -> Option<&'a str> {
        if self.source != ContentSource::Sample {
            return None;
        }
        let rest = url.strip_prefix(self.origin.as_str())?;
        (rest.is_empty() || rest.starts_with('/')).then_some(rest)
    }
}
