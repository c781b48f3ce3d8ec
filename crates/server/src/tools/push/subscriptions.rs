//! push_subscribe, push_unsubscribe and push_subscriptions tools.

use lifi_core::PushSubscription;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;
use crate::state::AppState;
use crate::tools::json_result;

/// Parameters for the push_subscribe tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PushSubscribeParams {
    /// Agent the subscription belongs to.
    pub agent_name: String,
    /// The browser's `PushSubscription` JSON (`endpoint`, `keys`, ...).
    pub subscription: serde_json::Value,
}

/// Parameters for the push_unsubscribe tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PushUnsubscribeParams {
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PushSubscribeOutput {
    pub endpoint: String,
    /// Subscriptions stored after saving.
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PushUnsubscribeOutput {
    /// False when nothing was stored for the endpoint.
    pub removed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PushSubscriptionsOutput {
    pub subscriptions: Vec<PushSubscription>,
}

pub async fn subscribe_impl(state: &AppState, params: PushSubscribeParams) -> Result<CallToolResult, McpError> {
    let agent_name = params.agent_name.trim();
    if agent_name.is_empty() {
        return Err(ToolError::InvalidInput("agent_name cannot be empty".into()).into());
    }

    state.db.save_subscription(agent_name, &params.subscription).await?;

    let endpoint = params
        .subscription
        .get("endpoint")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    tracing::info!(agent = %agent_name, endpoint = %endpoint, "push subscription saved");

    let total = state.db.list_subscriptions().await?.len();
    json_result(&PushSubscribeOutput { endpoint, total })
}

pub async fn unsubscribe_impl(state: &AppState, params: PushUnsubscribeParams) -> Result<CallToolResult, McpError> {
    let removed = state.db.remove_subscription(&params.endpoint).await?;
    json_result(&PushUnsubscribeOutput { removed })
}

pub async fn list_impl(state: &AppState) -> Result<CallToolResult, McpError> {
    let subscriptions = state.db.list_subscriptions().await?;
    json_result(&PushSubscriptionsOutput { subscriptions })
}
