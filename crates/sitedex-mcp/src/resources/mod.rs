//! MCP resources for sitedex

pub mod page;

pub use page::{list_published, matches_template, read_page, site_template, template_uri};
