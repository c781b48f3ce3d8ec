//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::state::AppState;
use crate::tools::cache::{CacheListParams, CacheMatchParams};
use crate::tools::notifications::NotificationClickParams;
use crate::tools::push::{PushDeliverParams, PushRemindersParams, PushSubscribeParams, PushUnsubscribeParams};
use crate::tools::web_fetch::WebFetchParams;
use crate::tools::{cache, notifications, push, web_fetch, worker};

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

/// The main MCP server handler for lifi-sw.
#[derive(Clone)]
pub struct LifiServer {
    tool_router: ToolRouter<Self>,
    state: Arc<AppState>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl LifiServer {
    /// Create a new server handler.
    pub fn new(state: Arc<AppState>) -> Self {
        Self { tool_router: Self::tool_router(), state }
    }

    #[tool(description = "Show the active and waiting worker versions, cache stores, and open windows.")]
    async fn worker_status(&self) -> Result<CallToolResult, McpError> {
        worker::status_impl(&self.state).await
    }

    /// Route a request through the worker.
    ///
    /// Documents go network-first with a cache fallback, other GETs are
    /// answered from the cache when possible, and everything else passes
    /// through to the network.
    #[tool(
        description = "Fetch a URL as a page controlled by the worker would. Reports whether the response came from the cache, the network, or passed through."
    )]
    async fn web_fetch(&self, params: Parameters<WebFetchParams>) -> Result<CallToolResult, McpError> {
        web_fetch::fetch_impl(&self.state, params.0).await
    }

    #[tool(description = "Deliver a push message to the worker. Returns the notification it shows.")]
    async fn push_deliver(&self, params: Parameters<PushDeliverParams>) -> Result<CallToolResult, McpError> {
        push::deliver_impl(&self.state, params.0).await
    }

    #[tool(description = "Click a shown notification by tag. Closes it and focuses or opens its target window.")]
    async fn notification_click(&self, params: Parameters<NotificationClickParams>) -> Result<CallToolResult, McpError> {
        notifications::click_impl(&self.state, params.0).await
    }

    #[tool(description = "List notifications currently shown.")]
    async fn notifications_list(&self) -> Result<CallToolResult, McpError> {
        notifications::list_impl(&self.state).await
    }

    #[tool(description = "List cache stores, or the entries of one store.")]
    async fn cache_list(&self, params: Parameters<CacheListParams>) -> Result<CallToolResult, McpError> {
        cache::list_impl(&self.state, params.0).await
    }

    #[tool(description = "Look a request up in the cache without touching the network.")]
    async fn cache_match(&self, params: Parameters<CacheMatchParams>) -> Result<CallToolResult, McpError> {
        cache::match_impl(&self.state, params.0).await
    }

    #[tool(description = "Store an agent's web push subscription, replacing any with the same endpoint.")]
    async fn push_subscribe(&self, params: Parameters<PushSubscribeParams>) -> Result<CallToolResult, McpError> {
        push::subscribe_impl(&self.state, params.0).await
    }

    #[tool(description = "Remove the push subscription for an endpoint.")]
    async fn push_unsubscribe(&self, params: Parameters<PushUnsubscribeParams>) -> Result<CallToolResult, McpError> {
        push::unsubscribe_impl(&self.state, params.0).await
    }

    #[tool(description = "List stored push subscriptions.")]
    async fn push_subscriptions(&self) -> Result<CallToolResult, McpError> {
        push::list_impl(&self.state).await
    }

    #[tool(description = "Send today's follow-up reminder for the given contact names through the worker.")]
    async fn push_reminders(&self, params: Parameters<PushRemindersParams>) -> Result<CallToolResult, McpError> {
        push::reminders_impl(&self.state, params.0).await
    }
}

impl ServerHandler for LifiServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "lifi-sw".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[tokio::test]
    async fn test_all_tools_routed() {
        let server = testing::origin().await;
        let handler = LifiServer::new(Arc::new(testing::state(&server).await));

        let mut names: Vec<String> = handler.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "cache_list",
                "cache_match",
                "notification_click",
                "notifications_list",
                "push_deliver",
                "push_reminders",
                "push_subscribe",
                "push_subscriptions",
                "push_unsubscribe",
                "web_fetch",
                "worker_status",
            ]
        );
    }

    #[tokio::test]
    async fn test_server_info() {
        let server = testing::origin().await;
        let handler = LifiServer::new(Arc::new(testing::state(&server).await));

        let info = handler.get_info();
        assert_eq!(info.server_info.name, "lifi-sw");
        assert!(info.capabilities.tools.is_some());
    }
}
