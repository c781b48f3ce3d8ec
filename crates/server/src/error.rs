//! Errors raised by the tool layer itself.
//!
//! Worker, cache and network failures arrive as [`lifi_core::Error`] and are
//! converted directly; these cover what only the MCP surface can get wrong.

use rmcp::model::{ErrorCode, ErrorData as McpError};

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Tool arguments that parse but make no sense (e.g., unknown tag).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Tool output could not be encoded as JSON.
    #[error("OUTPUT_FAILED: {0}")]
    Output(String),
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let (code, message) = match &err {
            ToolError::InvalidInput(msg) => (-32602, msg.clone()),
            ToolError::Output(msg) => (-32603, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_codes() {
        let err: McpError = ToolError::InvalidInput("no notification tagged call-9".into()).into();
        assert_eq!(err.code.0, -32602);
        assert_eq!(err.message, "no notification tagged call-9");

        let err: McpError = ToolError::Output("bad float".into()).into();
        assert_eq!(err.code.0, -32603);
    }
}
