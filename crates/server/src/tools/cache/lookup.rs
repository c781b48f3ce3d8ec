//! cache_match tool implementation.
//!
//! Looks a request up across every store without touching the network.

use lifi_core::{Destination, Request};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::tools::json_result;

/// Parameters for the cache_match tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheMatchParams {
    /// Absolute URL, or a path resolved against the worker's origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "GET".into()
}

/// Output from the cache_match tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheMatchOutput {
    pub url: String,
    pub matched: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Stored body as text; absent when it isn't valid UTF-8.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default)]
    pub size: usize,
}

pub async fn match_impl(state: &AppState, params: CacheMatchParams) -> Result<CallToolResult, McpError> {
    let url = state.resolve(&params.url)?;
    let request = Request::from_parts(&params.method, url.as_str(), Destination::infer_from_path(url.path()))?;

    let output = match state.db.match_request(&request).await? {
        Some(response) => CacheMatchOutput {
            url: url.to_string(),
            matched: true,
            status: Some(response.status),
            content_type: response.content_type().map(str::to_string),
            size: response.body.len(),
            body: String::from_utf8(response.body).ok(),
        },
        None => CacheMatchOutput {
            url: url.to_string(),
            matched: false,
            status: None,
            content_type: None,
            body: None,
            size: 0,
        },
    };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn params(url: &str) -> CacheMatchParams {
        CacheMatchParams { url: url.into(), method: default_method() }
    }

    #[tokio::test]
    async fn test_match_precached_asset() {
        let server = testing::origin().await;
        let state = testing::active_state(&server).await;

        let output: CacheMatchOutput = testing::output(&match_impl(&state, params("/static/style.css")).await.unwrap());
        assert!(output.matched);
        assert_eq!(output.status, Some(200));
        assert_eq!(output.body.as_deref(), Some("asset /static/style.css"));
    }

    #[tokio::test]
    async fn test_match_ignores_fragment() {
        let server = testing::origin().await;
        let state = testing::active_state(&server).await;

        let output: CacheMatchOutput =
            testing::output(&match_impl(&state, params("/static/style.css#top")).await.unwrap());
        assert!(output.matched);
    }

    #[tokio::test]
    async fn test_miss() {
        let server = testing::origin().await;
        let state = testing::active_state(&server).await;

        let output: CacheMatchOutput = testing::output(&match_impl(&state, params("/dashboard")).await.unwrap());
        assert!(!output.matched);

        let post = CacheMatchParams { url: "/static/style.css".into(), method: "POST".into() };
        let output: CacheMatchOutput = testing::output(&match_impl(&state, post).await.unwrap());
        assert!(!output.matched);
    }
}
