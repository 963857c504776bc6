//! MCP server handler implementation.
//!
//! Each worker event becomes one tool; the host drives the lifecycle by
//! calling them in order.
use std::sync::Arc;

use crate::tools::cache::{CacheGetParams, get_impl, stores_impl};
use crate::tools::events::{PushParams, SyncParams, click_impl, push_impl, sync_impl};
use crate::tools::fetch::fetch_impl;
use crate::tools::lifecycle::{activate_impl, install_impl, status_impl};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use shellcache_client::HttpFetcher;
use shellcache_core::hooks::NotificationClick;
use shellcache_core::{CacheDb, FetchRequest, Worker};

pub type HostWorker = Worker<CacheDb, HttpFetcher>;

/// The MCP server handler wrapping one worker version.
#[derive(Clone)]
pub struct ShellcacheHost {
    worker: Arc<HostWorker>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ShellcacheHost {
    pub fn new(worker: Arc<HostWorker>) -> Self {
        Self { worker, tool_router: Self::tool_router() }
    }

    #[tool(description = "Install the worker: fetch every app-shell URL and store them all, or nothing.")]
    async fn sw_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.worker).await
    }

    #[tool(description = "Activate the installed worker: delete stale stores and take control of clients.")]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.worker).await
    }

    #[tool(description = "Report lifecycle state, current store and whether clients are controlled.")]
    async fn sw_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.worker).await
    }

    /// Answer an intercepted request.
    ///
    /// Returns the response plus the strategy decision that produced it.
    #[tool(
        description = "Handle a fetch event. Returns status, type, headers, body text and the cache/network decision."
    )]
    async fn sw_fetch(&self, params: Parameters<FetchRequest>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.worker, params.0).await
    }

    #[tool(description = "Deliver a background-sync event. Only the configured tag runs the sync task.")]
    async fn sw_sync(&self, params: Parameters<SyncParams>) -> Result<CallToolResult, McpError> {
        sync_impl(&self.worker, params.0).await
    }

    #[tool(description = "Deliver a push message and show the resulting notification.")]
    async fn sw_push(&self, params: Parameters<PushParams>) -> Result<CallToolResult, McpError> {
        push_impl(&self.worker, params.0).await
    }

    #[tool(description = "Deliver a notification click. The 'open' action opens the notification's URL.")]
    async fn sw_notification_click(&self, params: Parameters<NotificationClick>) -> Result<CallToolResult, McpError> {
        click_impl(&self.worker, params.0).await
    }

    #[tool(description = "Read a stored response by URL. Fails with STORE_MISS when absent.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.worker, params.0).await
    }

    #[tool(description = "List response stores with entry counts.")]
    async fn cache_stores(&self) -> Result<CallToolResult, McpError> {
        stores_impl(self.worker.storage()).await
    }
}

impl ServerHandler for ShellcacheHost {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "shellcache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Call sw_install then sw_activate before sw_fetch; fetches before activation go straight to the network."
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
