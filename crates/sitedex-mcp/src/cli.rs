//! # CLI Structure and Argument Parsing
//!
//! `sitedex-mcp` takes no subcommands. Flags select the content source, the
//! tool name, resource publication, and the transport:
//!
//! ```bash
//! # Sample site over stdio
//! sitedex-mcp
//!
//! # Remote pages, no resources, HTTP on port 9000
//! sitedex-mcp --page https://news.example/issues/a --no-resources 9000
//!
//! # Mirror another instance's index
//! sitedex-mcp --host http://localhost:8848 --tool-name=search_news
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Default name of the search tool
pub const DEFAULT_TOOL_NAME: &str = "search_site";

/// Default HTTP listen port
pub const DEFAULT_PORT: u16 = 8848;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Command-line interface for `sitedex-mcp`
#[derive(Parser, Clone, Debug)]
#[command(name = "sitedex-mcp")]
#[command(version)]
#[command(about = "MCP server for full-text search over a small static site", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Serve over HTTP on this port (implies --http)
    #[arg(value_name = "PORT")]
    pub port: Option<u16>,

    /// Serve over HTTP instead of stdio
    #[arg(long)]
    pub http: bool,

    /// Name of the search tool; a bare flag keeps the default
    #[arg(
        long,
        value_name = "NAME",
        num_args = 0..=1,
        default_missing_value = DEFAULT_TOOL_NAME
    )]
    pub tool_name: Option<String>,

    /// Return excerpt-length text instead of publishing result pages as resources
    #[arg(long)]
    pub no_resources: bool,

    /// Mirror the index served by another sitedex host
    #[arg(long, value_name = "URL", conflicts_with = "page")]
    pub host: Option<String>,

    /// Index this remote page (repeatable)
    #[arg(long = "page", value_name = "URL")]
    pub page: Vec<String>,

    /// Origin used to make site-relative URLs absolute
    #[arg(long, value_name = "URL")]
    pub origin: Option<String>,

    /// Cache root directory
    #[arg(long, value_name = "PATH")]
    pub cache_dir: Option<PathBuf>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'v', long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}
