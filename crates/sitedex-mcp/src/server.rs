//! MCP server implementation for sitedex

use std::collections::HashMap;
use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject,
    ListResourceTemplatesResult, ListResourcesResult, ListToolsResult, PaginatedRequestParam,
    ProtocolVersion, ReadResourceRequestParam, ReadResourceResult, Resource, ResourceTemplate,
    ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer, ServerHandler};
use schemars::JsonSchema;
use sitedex_core::{BuiltIndex, Searcher, Site};
use tokio::sync::RwLock;

use crate::error::{McpError, McpResult};
use crate::resources;
use crate::tools::{SearchContext, SearchParams, SearchRun, SearchToolOutput, handle_search};
use crate::types::PageRegistry;

/// A search tool call shaped for the client
#[derive(Debug)]
pub struct ToolCall {
    /// Structured output, or an `isError` result when the search failed
    pub result: CallToolResult,
    /// Whether the call registered new resources
    pub resources_changed: bool,
}

/// MCP server for one site index
#[derive(Clone)]
pub struct McpServer {
    tool_name: Arc<str>,
    resources_enabled: bool,
    searcher: Searcher,
    site: Site,
    /// Published resources, shared by the tool and resource handlers
    registry: PageRegistry,
}

impl McpServer {
    /// Create a server over a built index
    pub fn new(built: BuiltIndex, tool_name: &str, resources_enabled: bool) -> Self {
        let BuiltIndex { index, site, .. } = built;
        Self {
            tool_name: Arc::from(tool_name),
            resources_enabled,
            searcher: Searcher::new(Arc::new(index), site.origin()),
            site,
            registry: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Name the search tool is served under
    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    /// Whether result pages are published as resources
    pub const fn resources_enabled(&self) -> bool {
        self.resources_enabled
    }

    /// Site behind the index
    pub const fn site(&self) -> &Site {
        &self.site
    }

    /// Tool definition with input and output schemas
    pub fn search_tool(&self) -> McpResult<Tool> {
        let description = format!(
            "Full-text search over {}. Multi-word queries match pages containing every word \
             and fall back to the first single word that matches. Returns the total match \
             count and up to `limit` results (default 20).",
            self.site.origin()
        );
        let mut tool = Tool::new(
            self.tool_name.to_string(),
            description,
            Arc::new(schema_object::<SearchParams>()?),
        );
        tool.output_schema = Some(Arc::new(schema_object::<SearchToolOutput>()?));
        Ok(tool)
    }

    /// Validate a tool call's name and arguments.
    pub fn parse_call(&self, name: &str, arguments: Option<JsonObject>) -> McpResult<SearchParams> {
        if name != &*self.tool_name {
            return Err(McpError::UnknownTool(name.to_string()));
        }
        let arguments = serde_json::Value::Object(arguments.unwrap_or_default());
        serde_json::from_value(arguments).map_err(|e| McpError::InvalidParams(e.to_string()))
    }

    /// Run one search and apply the content policy for this server's mode.
    pub async fn run_search(&self, params: &SearchParams) -> McpResult<SearchRun> {
        let ctx = SearchContext {
            searcher: &self.searcher,
            site: &self.site,
            registry: &self.registry,
            resources_enabled: self.resources_enabled,
        };
        handle_search(&ctx, params).await
    }

    /// Handle a `tools/call` for the search tool.
    ///
    /// Unknown tool names and malformed arguments are protocol errors. A search
    /// that fails after validation, such as a failed page load, is reported in
    /// band as an `isError` result.
    pub async fn call_search(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> McpResult<ToolCall> {
        let params = self.parse_call(name, arguments)?;
        let published_before = self.registry.read().await.len();

        match self.run_search(&params).await {
            Ok(run) => Ok(ToolCall {
                result: CallToolResult::structured(serde_json::to_value(&run.output)?),
                resources_changed: run.published > 0,
            }),
            Err(e) => {
                tracing::warn!(
                    query = %params.query,
                    category = e.category(),
                    error = %e,
                    "search failed"
                );
                // Loads that finished before the failure stay published.
                let resources_changed = self.registry.read().await.len() > published_before;
                Ok(ToolCall {
                    result: CallToolResult::error(vec![Content::text(e.to_string())]),
                    resources_changed,
                })
            },
        }
    }

    /// Published pages, or an error when resources are disabled
    pub async fn page_resources(&self) -> McpResult<Vec<Resource>> {
        self.require_resources()?;
        Ok(resources::list_published(&self.registry).await)
    }

    /// The site template, or an error when resources are disabled
    pub fn page_templates(&self) -> McpResult<Vec<ResourceTemplate>> {
        self.require_resources()?;
        Ok(vec![resources::site_template(self.site.origin())?])
    }

    /// Read a page resource by URI.
    pub async fn read_page(&self, uri: &str) -> McpResult<ReadResourceResult> {
        self.require_resources()?;
        resources::read_page(&self.registry, &self.site, uri).await
    }

    const fn require_resources(&self) -> McpResult<()> {
        if self.resources_enabled {
            Ok(())
        } else {
            Err(McpError::ResourcesDisabled)
        }
    }

    fn instructions(&self) -> String {
        let origin = self.site.origin();
        if self.resources_enabled {
            format!(
                "Use the `{}` tool to search {origin}. Every result URL is published as a \
                 text/html resource; other pages under {origin}/ can be read through the \
                 resource template.",
                self.tool_name
            )
        } else {
            format!(
                "Use the `{}` tool to search {origin}. Each result carries an excerpt-length \
                 text preview in `content`; resources are disabled.",
                self.tool_name
            )
        }
    }
}

fn schema_object<T: JsonSchema>() -> McpResult<JsonObject> {
    match serde_json::to_value(schemars::schema_for!(T))? {
        serde_json::Value::Object(object) => Ok(object),
        other => Err(McpError::Internal(format!(
            "schema is not an object: {other}"
        ))),
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        let capabilities = if self.resources_enabled {
            ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_resources_list_changed()
                .build()
        } else {
            ServerCapabilities::builder().enable_tools().build()
        };

        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities,
            server_info: Implementation {
                name: "sitedex-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(self.instructions()),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(vec![self.search_tool()?]))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let call = self.call_search(&request.name, request.arguments).await?;

        if call.resources_changed {
            if let Err(e) = context.peer.notify_resource_list_changed().await {
                tracing::warn!(error = %e, "failed to send resource list change");
            }
        }

        Ok(call.result)
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        Ok(ListResourcesResult::with_all_items(self.page_resources().await?))
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, ErrorData> {
        Ok(ListResourceTemplatesResult::with_all_items(self.page_templates()?))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        Ok(self.read_page(&request.uri).await?)
    }
}
