//! Startup index construction.

use tracing::info;

use crate::bundle::{Manifest, download_bundle};
use crate::config::{ContentSource, SiteConfig};
use crate::index::SearchIndex;
use crate::source::Site;
use crate::Result;

/// Everything produced by a successful build.
pub struct BuiltIndex {
    /// Queryable index
    pub index: SearchIndex,
    /// Site the index was built from
    pub site: Site,
    /// Manifest describing the on-disk bundle
    pub manifest: Manifest,
}

/// Build (or download) the index for `config` and persist it under the cache.
///
/// The index directory is recreated from scratch every time. For `sample` and
/// `pages` the pages are collected first so a failed fetch leaves no partial
/// index behind.
pub async fn build_index(config: &SiteConfig) -> Result<BuiltIndex> {
    let site = Site::from_config(config)?;
    info!(
        source = config.source.kind(),
        origin = %config.origin,
        cache = %config.cache_root.display(),
        "building index"
    );

    let (index, manifest) = match &config.source {
        ContentSource::Mirror { host } => {
            site.storage().reset_index_dir()?;
            let manifest = download_bundle(site.fetcher(), host, site.storage()).await?;
            let index = SearchIndex::open(&site.storage().index_dir())?;
            (index, manifest)
        },
        ContentSource::Sample | ContentSource::Pages { .. } => {
            let pages = site.collect_pages().await?;
            let index_dir = site.storage().reset_index_dir()?;
            let mut index = SearchIndex::create(&index_dir)?;
            index.add_pages(&pages)?;
            let manifest = Manifest::write(&index_dir, pages.len() as u64)?;
            (index, manifest)
        },
    };

    info!(
        pages = index.num_docs(),
        files = manifest.files.len(),
        "index ready"
    );
    Ok(BuiltIndex {
        index,
        site,
        manifest,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MANIFEST_FILE;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_build_sample_index() {
        let temp = TempDir::new().unwrap();
        let config =
            SiteConfig::new(ContentSource::Sample, None, temp.path().to_path_buf(), None).unwrap();

        let built = build_index(&config).await.unwrap();

        assert_eq!(built.index.num_docs(), 3);
        assert_eq!(built.manifest.pages, 3);
        assert!(built.site.storage().index_dir().join(MANIFEST_FILE).exists());
        assert!(built.site.storage().site_dir().join("openai.html").exists());
        assert!(
            built.manifest.files.iter().all(|f| !f.name.ends_with(".lock")),
            "lock files must not be listed"
        );
    }

    #[tokio::test]
    async fn test_rebuild_replaces_previous_index() {
        let temp = TempDir::new().unwrap();
        let config =
            SiteConfig::new(ContentSource::Sample, None, temp.path().to_path_buf(), None).unwrap();

        drop(build_index(&config).await.unwrap());
        let rebuilt = build_index(&config).await.unwrap();

        assert_eq!(rebuilt.index.num_docs(), 3, "documents must not accumulate");
    }
}
