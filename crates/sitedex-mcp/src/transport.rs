//! Transports: stdio, or streamable HTTP with the index bundle alongside.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::Router;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use sitedex_core::{BUNDLE_ROUTE, ContentSource, Storage};
use tower_http::services::ServeDir;

use crate::error::{McpError, McpResult};
use crate::server::McpServer;

/// Path of the MCP endpoint on the HTTP transport
pub const MCP_ROUTE: &str = "/mcp";

/// Serve the MCP protocol over stdio until the client disconnects
pub async fn serve_stdio(server: McpServer) -> McpResult<()> {
    tracing::info!(tool = server.tool_name(), "sitedex MCP server starting on stdio");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let service = rmcp::serve_server(server, (stdin, stdout))
        .await
        .map_err(|e| {
            tracing::error!("server initialization error: {}", e);
            McpError::Protocol(e.to_string())
        })?;

    // Keep the service running until it's cancelled
    service.waiting().await.map_err(|e| {
        tracing::error!("server runtime error: {}", e);
        McpError::Protocol(e.to_string())
    })?;

    tracing::info!("sitedex MCP server stopped");
    Ok(())
}

/// Build the HTTP router.
///
/// - `/mcp`: streamable HTTP MCP endpoint
/// - `/index/*`: the index bundle, for mirrors
/// - everything else: the generated sample site, when that is the source
pub fn router(server: McpServer) -> Router {
    let storage: Storage = server.site().storage().clone();
    let serve_site = *server.site().source() == ContentSource::Sample;

    let mcp = StreamableHttpService::new(
        move || Ok(server.clone()),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig::default(),
    );

    let router = Router::new()
        .nest_service(MCP_ROUTE, mcp)
        .nest_service(BUNDLE_ROUTE, ServeDir::new(storage.index_dir()));

    if serve_site {
        router.fallback_service(ServeDir::new(storage.site_dir()))
    } else {
        router
    }
}

/// Serve over HTTP on `127.0.0.1:<port>` until Ctrl-C
pub async fn serve_http(server: McpServer, port: u16) -> McpResult<()> {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    let tool = server.tool_name().to_string();
    let app = router(server);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| McpError::Protocol(format!("failed to bind {addr}: {e}")))?;

    tracing::info!(tool = %tool, "sitedex MCP server listening on http://{addr}{MCP_ROUTE}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| McpError::Protocol(e.to_string()))?;

    tracing::info!("sitedex MCP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}
