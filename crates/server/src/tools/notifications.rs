//! notifications_list and notification_click tools.

use lifi_core::worker::WindowClient;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::error::ToolError;
use crate::host::ShownNotification;
use crate::state::AppState;

/// Parameters for the notification_click tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NotificationClickParams {
    /// Tag of the notification to activate.
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NotificationsListOutput {
    pub notifications: Vec<ShownNotification>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NotificationClickOutput {
    /// The window focused or opened at the notification's target.
    pub window: WindowClient,
}

pub async fn list_impl(state: &AppState) -> Result<CallToolResult, McpError> {
    json_result(&NotificationsListOutput { notifications: state.tray.shown() })
}

pub async fn click_impl(state: &AppState, params: NotificationClickParams) -> Result<CallToolResult, McpError> {
    let notification = state
        .tray
        .get(&params.tag)
        .ok_or_else(|| ToolError::InvalidInput(format!("no notification tagged {}", params.tag)))?;

    let window = state.registration.notification_click(notification).await?;
    tracing::info!(tag = %params.tag, window = window.id, url = %window.url, "notification clicked");
    json_result(&NotificationClickOutput { window })
}
