//! cache_list tool implementation.
//!
//! Lists store generations, or the entries of one store.

use lifi_core::StoreInfo;
use lifi_core::cache::EntryInfo;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;
use crate::state::AppState;
use crate::tools::json_result;

/// Parameters for the cache_list tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheListParams {
    /// List this store's entries instead of the stores.
    #[serde(default)]
    pub store: Option<String>,
}

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheListOutput {
    pub stores: Vec<StoreInfo>,
    /// Present when a store was named.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<EntryInfo>>,
}

pub async fn list_impl(state: &AppState, params: CacheListParams) -> Result<CallToolResult, McpError> {
    let output = match params.store {
        Some(name) => {
            let store = state
                .db
                .store_info(&name)
                .await?
                .ok_or_else(|| ToolError::InvalidInput(format!("no cache store named {name}")))?;
            let entries = state.db.list_entries(&name).await?;
            CacheListOutput { stores: vec![store], entries: Some(entries) }
        }
        None => CacheListOutput { stores: state.db.list_stores().await?, entries: None },
    };
    json_result(&output)
}
