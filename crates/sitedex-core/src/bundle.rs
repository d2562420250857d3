//! Index bundles: the index directory plus a manifest, as served at `/index/`.
//!
//! A host running the HTTP transport exposes its freshly built index as
//! static files. The `mirror` content source downloads the manifest from such
//! a host, fetches every listed file concurrently, verifies each digest, and
//! opens the result as a local index.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::fetcher::{Fetcher, calculate_sha256};
use crate::storage::{MANIFEST_FILE, Storage};
use crate::{Error, Result};

/// URL path under which bundles are served
pub const BUNDLE_ROUTE: &str = "/index";

/// Current manifest format
pub const MANIFEST_VERSION: u32 = 1;

/// Description of a built index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Manifest format version
    pub version: u32,
    /// Number of indexed pages
    pub pages: u64,
    /// When the index was built
    pub built_at: DateTime<Utc>,
    /// Index files, relative to the index directory
    pub files: Vec<ManifestEntry>,
}

/// One file of the bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// File name inside the index directory
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Base64 `SHA256` of the content
    pub sha256: String,
}

impl Manifest {
    /// Scan a committed index directory and write its manifest.
    ///
    /// Lock files and the manifest itself are never listed.
    pub fn write(index_dir: &Path, pages: u64) -> Result<Self> {
        let mut files = Vec::new();
        for entry in fs::read_dir(index_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == MANIFEST_FILE || is_lock_file(&name) {
                continue;
            }
            let content = fs::read(entry.path())?;
            files.push(ManifestEntry {
                size: content.len() as u64,
                sha256: calculate_sha256(&content),
                name,
            });
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));

        let manifest = Self {
            version: MANIFEST_VERSION,
            pages,
            built_at: Utc::now(),
            files,
        };

        let path = index_dir.join(MANIFEST_FILE);
        fs::write(&path, serde_json::to_vec_pretty(&manifest)?)?;
        debug!(path = %path.display(), files = manifest.files.len(), "wrote bundle manifest");
        Ok(manifest)
    }

    /// Parse and sanity-check a downloaded manifest.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let manifest: Self = serde_json::from_slice(bytes)
            .map_err(|e| Error::Parse(format!("invalid bundle manifest: {e}")))?;

        if manifest.version != MANIFEST_VERSION {
            return Err(Error::Parse(format!(
                "unsupported manifest version {} (expected {MANIFEST_VERSION})",
                manifest.version
            )));
        }
        if manifest.files.is_empty() {
            return Err(Error::Parse("bundle manifest lists no files".into()));
        }
        for entry in &manifest.files {
            if !is_plain_file_name(&entry.name) {
                return Err(Error::Parse(format!(
                    "bundle manifest names an unsafe path: {}",
                    entry.name
                )));
            }
        }
        Ok(manifest)
    }
}

/// Download a bundle from `host` into the (already reset) index directory.
pub async fn download_bundle(fetcher: &Fetcher, host: &str, storage: &Storage) -> Result<Manifest> {
    let manifest_url = format!("{host}{BUNDLE_ROUTE}/{MANIFEST_FILE}");
    info!(url = %manifest_url, "downloading bundle manifest");

    let (bytes, _) = fetcher.fetch_bytes(&manifest_url).await?;
    let manifest = Manifest::parse(&bytes)?;
    let index_dir = storage.index_dir();

    let downloads = manifest.files.iter().map(|entry| {
        let url = format!("{host}{BUNDLE_ROUTE}/{}", entry.name);
        async move {
            let (body, sha256) = fetcher.fetch_bytes(&url).await?;
            if sha256 != entry.sha256 {
                return Err(Error::Storage(format!(
                    "checksum mismatch for bundle file {}",
                    entry.name
                )));
            }
            Ok::<_, Error>((entry, body))
        }
    });

    for (entry, body) in try_join_all(downloads).await? {
        fs::write(index_dir.join(&entry.name), body)?;
    }
    fs::write(storage.manifest_path(), &bytes)?;

    info!(
        files = manifest.files.len(),
        pages = manifest.pages,
        "bundle downloaded"
    );
    Ok(manifest)
}

fn is_lock_file(name: &str) -> bool {
    name.ends_with(".lock")
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !is_lock_file(name)
        && name != MANIFEST_FILE
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn entry(name: &str, content: &[u8]) -> ManifestEntry {
        ManifestEntry {
            name: name.to_string(),
            size: content.len() as u64,
            sha256: calculate_sha256(content),
        }
    }

    fn manifest_with(files: Vec<ManifestEntry>) -> Manifest {
        Manifest {
            version: MANIFEST_VERSION,
            pages: 2,
            built_at: Utc::now(),
            files,
        }
    }

    #[test]
    fn test_write_skips_locks_and_manifest() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("meta.json"), b"{}").unwrap();
        fs::write(temp.path().join("abc.idx"), b"data").unwrap();
        fs::write(temp.path().join(".tantivy-writer.lock"), b"").unwrap();
        fs::write(temp.path().join(MANIFEST_FILE), b"old").unwrap();

        let manifest = Manifest::write(temp.path(), 2).unwrap();
        let names: Vec<_> = manifest.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["abc.idx", "meta.json"]);

        let on_disk = Manifest::parse(&fs::read(temp.path().join(MANIFEST_FILE)).unwrap()).unwrap();
        assert_eq!(on_disk, manifest);
    }

    #[test]
    fn test_parse_rejects_unsafe_names() {
        for name in ["../escape", "dir/file", ".tantivy-meta.lock", ""] {
            let bytes = serde_json::to_vec(&manifest_with(vec![entry(name, b"x")])).unwrap();
            assert!(
                matches!(Manifest::parse(&bytes), Err(Error::Parse(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_rejects_wrong_version_and_empty() {
        let mut manifest = manifest_with(vec![entry("meta.json", b"{}")]);
        manifest.version = 99;
        let bytes = serde_json::to_vec(&manifest).unwrap();
        assert!(Manifest::parse(&bytes).is_err());

        let bytes = serde_json::to_vec(&manifest_with(vec![])).unwrap();
        assert!(Manifest::parse(&bytes).is_err());
    }

    #[tokio::test]
    async fn test_download_bundle_writes_files() {
        let server = MockServer::start().await;
        let manifest = manifest_with(vec![entry("meta.json", b"{}"), entry("seg.idx", b"idx")]);

        Mock::given(method("GET"))
            .and(path("/index/manifest.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&manifest))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/index/meta.json"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"{}".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/index/seg.idx"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"idx".to_vec()))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let storage = Storage::with_root(temp.path().to_path_buf()).unwrap();
        storage.reset_index_dir().unwrap();
        let fetcher = Fetcher::new(None).unwrap();

        let downloaded = download_bundle(&fetcher, &server.uri(), &storage).await.unwrap();

        assert_eq!(downloaded.files.len(), 2);
        assert_eq!(fs::read(storage.index_dir().join("seg.idx")).unwrap(), b"idx");
        assert!(storage.manifest_path().exists());
    }

    #[tokio::test]
    async fn test_download_bundle_checksum_mismatch() {
        let server = MockServer::start().await;
        let manifest = manifest_with(vec![entry("meta.json", b"expected")]);

        Mock::given(method("GET"))
            .and(path("/index/manifest.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&manifest))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/index/meta.json"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"tampered".to_vec()))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let storage = Storage::with_root(temp.path().to_path_buf()).unwrap();
        storage.reset_index_dir().unwrap();
        let fetcher = Fetcher::new(None).unwrap();

        let result = download_bundle(&fetcher, &server.uri(), &storage).await;
        match result {
            Err(Error::Storage(msg)) => assert!(msg.contains("meta.json")),
            other => panic!("expected checksum failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_download_bundle_missing_manifest() {
        let server = MockServer::start().await;
        let temp = TempDir::new().unwrap();
        let storage = Storage::with_root(temp.path().to_path_buf()).unwrap();
        let fetcher = Fetcher::new(None).unwrap();

        let result = download_bundle(&fetcher, &server.uri(), &storage).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
