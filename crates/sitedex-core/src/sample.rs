//! Generated fixture site used by the `sample` content source.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::Result;

/// A generated fixture page
#[derive(Debug, Clone, Copy)]
pub struct SamplePage {
    /// File name under the site directory, also the URL path
    pub file: &'static str,
    /// Page title
    pub title: &'static str,
    /// Paragraph text
    pub body: &'static str,
}

/// The three fixture pages
pub const SAMPLE_PAGES: &[SamplePage] = &[
    SamplePage {
        file: "openai.html",
        title: "OpenAI launches new GPT model",
        body: "OpenAI today announced a new GPT model with stronger reasoning, \
               longer context windows and lower prices for developers.",
    },
    SamplePage {
        file: "anthropic.html",
        title: "Anthropic releases Claude 3",
        body: "Anthropic has released the Claude 3 family of assistants, \
               with improved vision support and faster responses.",
    },
    SamplePage {
        file: "ml.html",
        title: "Machine Learning breakthrough",
        body: "Researchers describe a machine learning breakthrough that cuts \
               training costs for large neural networks in half.",
    },
];

impl SamplePage {
    /// Render the page as a standalone HTML document
    pub fn render(&self) -> String {
        format!(
            "<!doctype html><html><head><title>{title}</title></head>\
             <body><h1>{title}</h1><p>{body}</p></body></html>",
            title = self.title,
            body = self.body,
        )
    }

    /// Site-relative URL of the page
    pub fn url_path(&self) -> String {
        format!("/{}", self.file)
    }
}

/// Write every fixture page into `site_dir`, replacing previous copies.
pub fn write_sample_site(site_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(site_dir)?;
    let mut written = Vec::with_capacity(SAMPLE_PAGES.len());
    for page in SAMPLE_PAGES {
        let path = site_dir.join(page.file);
        std::fs::write(&path, page.render())?;
        debug!(path = %path.display(), "wrote sample page");
        written.push(path);
    }
    Ok(written)
}
