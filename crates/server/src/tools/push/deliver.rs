//! push_deliver tool implementation.
//!
//! Delivers a push message to the active worker, which shows the resulting
//! notification.

use lifi_core::worker::{Notification, PushPayload};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;
use crate::state::AppState;

/// Parameters for the push_deliver tool.
///
/// `data` is delivered verbatim and takes precedence over the structured
/// fields. With neither, the message carries no data at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PushDeliverParams {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    /// Path or URL opened when the notification is clicked.
    #[serde(default)]
    pub url: Option<String>,
    /// Raw push data.
    #[serde(default)]
    pub data: Option<String>,
}

impl PushDeliverParams {
    fn into_data(self) -> Option<Vec<u8>> {
        if let Some(raw) = self.data {
            return Some(raw.into_bytes());
        }

        let payload = PushPayload { title: self.title, body: self.body, tag: self.tag, url: self.url };
        if payload == PushPayload::default() { None } else { Some(payload.encode()) }
    }
}

/// Output from the push_deliver tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PushDeliverOutput {
    /// The notification the worker showed.
    pub notification: Notification,
}

pub async fn deliver_impl(state: &AppState, params: PushDeliverParams) -> Result<CallToolResult, McpError> {
    let notification = state.registration.push(params.into_data()).await?;
    tracing::info!(tag = %notification.options.tag, title = %notification.title, "push delivered");
    json_result(&PushDeliverOutput { notification })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[tokio::test]
    async fn test_deliver_structured() {
        let server = testing::origin().await;
        let state = testing::active_state(&server).await;

        let params = PushDeliverParams { tag: Some("call-7".into()), ..Default::default() };
        let output: PushDeliverOutput = testing::output(&deliver_impl(&state, params).await.unwrap());

        assert_eq!(output.notification.title, "LIFI Reminder");
        assert_eq!(output.notification.options.tag, "call-7");
        assert_eq!(output.notification.options.data.url, "/dashboard");
        assert!(state.tray.get("call-7").is_some());
    }

    #[tokio::test]
    async fn test_deliver_malformed_data_uses_defaults() {
        let server = testing::origin().await;
        let state = testing::active_state(&server).await;

        let params = PushDeliverParams { data: Some("not json".into()), title: Some("ignored".into()), ..Default::default() };
        let output: PushDeliverOutput = testing::output(&deliver_impl(&state, params).await.unwrap());

        assert_eq!(output.notification.title, "LIFI Reminder");
        assert_eq!(output.notification.options.tag, "follow-up");
    }

    #[tokio::test]
    async fn test_deliver_without_worker() {
        let server = testing::origin().await;
        let state = testing::state(&server).await;

        let err = deliver_impl(&state, PushDeliverParams::default()).await.unwrap_err();
        assert_eq!(err.code.0, -32022);
    }

    #[test]
    fn test_empty_params_carry_no_data() {
        assert!(PushDeliverParams::default().into_data().is_none());
    }
}
