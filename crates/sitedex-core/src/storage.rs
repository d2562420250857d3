use crate::{Error, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// File name of the bundle manifest inside the index directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// Cache directory layout.
///
/// ```text
/// <root>/
///   index/            tantivy files + manifest.json (served at /index/)
///   site/             generated sample pages (sample source only)
/// ```
///
/// The location is stable across restarts; the content is rebuilt on start.
#[derive(Debug, Clone)]
pub struct Storage {
    root_dir: PathBuf,
}

impl Storage {
    /// Creates storage rooted at `root_dir`, creating the directory if needed
    pub fn with_root(root_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root_dir)
            .map_err(|e| Error::Storage(format!("Failed to create cache root: {e}")))?;
        Ok(Self { root_dir })
    }

    /// Directory holding the index artifacts
    pub fn index_dir(&self) -> PathBuf {
        self.root_dir.join("index")
    }

    /// Directory holding generated site pages
    pub fn site_dir(&self) -> PathBuf {
        self.root_dir.join("site")
    }

    /// Path of the bundle manifest
    pub fn manifest_path(&self) -> PathBuf {
        self.index_dir().join(MANIFEST_FILE)
    }

    /// Delete and recreate the index directory, returning its path.
    pub fn reset_index_dir(&self) -> Result<PathBuf> {
        let dir = self.index_dir();
        if dir.exists() {
            info!(path = %dir.display(), "removing previous index");
            fs::remove_dir_all(&dir)?;
        }
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Map a site-relative URL path onto a file under the site directory.
    ///
    /// Query strings and fragments are ignored, a trailing `/` maps to
    /// `index.html`, and any path that would leave the site directory is
    /// rejected.
    pub fn site_file(&self, url_path: &str) -> Result<PathBuf> {
        let path = url_path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_start_matches('/');

        let mut resolved = self.site_dir();
        for component in Path::new(path).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {},
                _ => {
                    return Err(Error::NotFound(format!(
                        "path escapes the site directory: {url_path}"
                    )));
                },
            }
        }

        if path.is_empty() || path.ends_with('/') {
            resolved.push("index.html");
        }

        debug!(url_path, file = %resolved.display(), "resolved site file");
        Ok(resolved)
    }
}
