//! MCP tool implementations.
//!
//! Each tool is an `*_impl` function over [`AppState`](crate::state::AppState)
//! returning its output as pretty-printed JSON text.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::error::ToolError;

pub mod cache;
pub mod notifications;
pub mod push;
pub mod web_fetch;
pub mod worker;

/// Wrap a tool output as a successful JSON text result.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(|e| ToolError::Output(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
