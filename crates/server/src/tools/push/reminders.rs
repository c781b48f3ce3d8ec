//! push_reminders tool implementation.
//!
//! Composes the daily follow-up reminder and delivers it to the active
//! worker. Remote push services are not contacted; the stored subscription
//! count is reported so callers can see who would be notified.

use lifi_core::worker::{Notification, follow_up_reminder};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::tools::json_result;

/// Parameters for the push_reminders tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PushRemindersParams {
    /// Contacts whose follow-ups are due today.
    #[serde(default)]
    pub contact_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PushRemindersOutput {
    /// False when nothing was due.
    pub sent: bool,
    pub notification: Option<Notification>,
    /// Stored push subscriptions.
    pub subscriptions: usize,
}

pub async fn reminders_impl(state: &AppState, params: PushRemindersParams) -> Result<CallToolResult, McpError> {
    let subscriptions = state.db.list_subscriptions().await?.len();

    let Some(payload) = follow_up_reminder(&params.contact_names) else {
        tracing::debug!("no follow-ups due");
        return json_result(&PushRemindersOutput { sent: false, notification: None, subscriptions });
    };

    let notification = state.registration.push(Some(payload.encode())).await?;
    tracing::info!(due = params.contact_names.len(), subscriptions, "follow-up reminder sent");
    json_result(&PushRemindersOutput { sent: true, notification: Some(notification), subscriptions })
}
