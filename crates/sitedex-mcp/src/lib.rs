//! sitedex MCP Server
//!
//! Exposes one search tool over a small static-site index and, optionally,
//! each result page as an MCP resource.

pub mod cli;
pub mod error;
pub mod logging;
pub mod registry;
pub mod resources;
pub mod server;
pub mod settings;
pub mod tools;
pub mod transport;
pub mod types;

pub use error::{McpError, McpResult};
pub use server::{McpServer, ToolCall};
pub use settings::{Settings, Transport};

/// Build the index described by `settings` and serve it until the transport closes.
///
/// # Errors
///
/// Returns an error if the index cannot be built or the transport fails.
pub async fn run(settings: Settings) -> McpResult<()> {
    tracing::debug!(?settings, "initializing sitedex MCP server");

    let built = sitedex_core::build_index(&settings.site).await?;
    let server = McpServer::new(built, &settings.tool_name, settings.resources);

    match settings.transport {
        Transport::Stdio => transport::serve_stdio(server).await,
        Transport::Http { port } => transport::serve_http(server, port).await,
    }
}
