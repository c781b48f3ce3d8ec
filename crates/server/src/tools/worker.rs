//! worker_status tool implementation.

use lifi_core::StoreInfo;
use lifi_core::worker::WindowClient;
use lifi_core::worker::registration::RegistrationStatus;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::state::AppState;

/// Output from the worker_status tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerStatusOutput {
    /// Origin the worker controls.
    pub origin: String,
    /// Active and waiting worker versions.
    pub registration: RegistrationStatus,
    /// Every cache store generation on disk.
    pub stores: Vec<StoreInfo>,
    /// Windows opened on the worker's behalf.
    pub windows: Vec<WindowClient>,
}

pub async fn status_impl(state: &AppState) -> Result<CallToolResult, McpError> {
    let output = WorkerStatusOutput {
        origin: state.origin.to_string(),
        registration: state.registration.status().await,
        stores: state.db.list_stores().await?,
        windows: state.clients.windows(),
    };
    json_result(&output)
}
