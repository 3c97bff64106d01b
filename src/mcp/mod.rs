//! MCP server exposing Argo CD operations as tools.

mod dispatch;
pub mod format;
mod tools;
mod types;

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

pub use dispatch::{ToolDispatcher, ToolError};
pub use tools::{catalog, ToolName};
pub use types::*;

use rmcp::{
    model::{
        CallToolRequestParam, CallToolResult, Implementation, JsonObject, ListToolsResult,
        PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
};

use crate::argocd::ArgoClient;

pub const SERVER_NAME: &str = "argocd-mcp-server";

const INSTRUCTIONS: &str = r#"Inspect and operate Argo CD applications.

DISCOVERY:
- list_projects: Projects known to Argo CD
- list_applications: Applications with sync and health status, filter by project or label selector
- get_application: Full application resource as JSON
- get_application_manifests: Rendered Kubernetes manifests
- get_sync_history: Previously deployed revisions

OPERATIONS:
- sync_application: Reconcile live state with git (use dry_run to preview, prune to remove orphaned resources)
- rollback_application: Redeploy a revision taken from get_sync_history"#;

/// MCP server shared by the stdio and HTTP transports.
#[derive(Clone)]
pub struct ArgoMcpServer {
    dispatcher: ToolDispatcher,
    tools: Arc<Vec<Tool>>,
}

impl ArgoMcpServer {
    pub fn new(client: ArgoClient) -> Self {
        Self {
            dispatcher: ToolDispatcher::new(client),
            tools: Arc::new(catalog()),
        }
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    pub fn list_tools_result(&self) -> ListToolsResult {
        ListToolsResult::with_all_items(self.tools.as_ref().clone())
    }

    /// Run a tool call. Failures are reported inside the content, never as errors.
    pub async fn call_tool_result(
        &self,
        name: &str,
        arguments: Option<&JsonObject>,
    ) -> CallToolResult {
        tracing::info!(tool = name, "tool call");
        CallToolResult::success(self.dispatcher.dispatch(name, arguments).await)
    }

    /// [`call_tool_result`](Self::call_tool_result) for arguments not yet known to be an object.
    pub async fn call_tool_value(&self, name: &str, arguments: &Value) -> CallToolResult {
        tracing::info!(tool = name, "tool call");
        CallToolResult::success(self.dispatcher.dispatch_value(name, arguments).await)
    }
}

impl ServerHandler for ArgoMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            server_info: Implementation {
                name: SERVER_NAME.into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(INSTRUCTIONS.into()),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(self.list_tools_result()))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            Ok(self
                .call_tool_result(&request.name, request.arguments.as_ref())
                .await)
        }
    }
}

pub async fn run_stdio_server(server: ArgoMcpServer) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio");

    let service = server.serve((stdin(), stdout())).await?;

    let quit_reason = service.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
