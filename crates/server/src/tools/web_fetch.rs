//! web_fetch tool implementation.
//!
//! Sends a request through the registration, exactly as a page under the
//! worker's control would, and reports where the response came from.

use std::collections::BTreeMap;

use lifi_core::worker::ResponseSource;
use lifi_core::{Destination, Request};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::state::AppState;

/// Input parameters for web_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WebFetchParams {
    /// Absolute URL, or a path resolved against the worker's origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request destination ("document", "style", "image", ...).
    /// Inferred from the URL path when omitted.
    #[serde(default)]
    pub destination: Option<String>,

    /// Extra request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Request body, sent as UTF-8.
    #[serde(default)]
    pub body: Option<String>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for web_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WebFetchOutput {
    /// The resolved request URL.
    pub url: String,
    /// URL of the response after redirects.
    pub final_url: String,
    pub status: u16,
    pub status_text: String,
    /// Cache, network, passthrough, or uncontrolled.
    pub source: ResponseSource,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    /// Body as text; absent when it isn't valid UTF-8.
    pub body: Option<String>,
    /// Body length in bytes.
    pub size: usize,
}

pub async fn fetch_impl(state: &AppState, params: WebFetchParams) -> Result<CallToolResult, McpError> {
    let url = state.resolve(&params.url)?;
    let destination = match params.destination.as_deref() {
        Some(dest) => dest.parse::<Destination>()?,
        None => Destination::infer_from_path(url.path()),
    };

    let mut request = Request::from_parts(&params.method, url.as_str(), destination)?;
    for (name, value) in params.headers {
        request = request.with_header(name, value);
    }
    if let Some(body) = params.body {
        request = request.with_body(body);
    }

    tracing::debug!(method = %request.method, url = %request.url, destination = %destination, "web_fetch");
    let routed = state.registration.fetch(request).await?;
    let response = routed.response;

    let output = WebFetchOutput {
        url: url.to_string(),
        final_url: response.url.clone(),
        status: response.status,
        status_text: response.status_text.clone(),
        source: routed.source,
        content_type: response.content_type().map(str::to_string),
        size: response.body.len(),
        body: String::from_utf8(response.body).ok(),
        headers: response.headers,
    };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use httpmock::Method::POST;

    fn params(url: &str) -> WebFetchParams {
        WebFetchParams {
            url: url.to_string(),
            method: default_method(),
            destination: None,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    #[tokio::test]
    async fn test_asset_served_from_cache() {
        let server = testing::origin().await;
        let state = testing::active_state(&server).await;

        let output: WebFetchOutput = testing::output(&fetch_impl(&state, params("/static/style.css")).await.unwrap());
        assert_eq!(output.source, ResponseSource::Cache);
        assert_eq!(output.status, 200);
        assert_eq!(output.body.as_deref(), Some("asset /static/style.css"));
    }

    #[tokio::test]
    async fn test_document_goes_to_network() {
        let server = testing::origin().await;
        let state = testing::active_state(&server).await;

        let output: WebFetchOutput = testing::output(&fetch_impl(&state, params("/dashboard")).await.unwrap());
        assert_eq!(output.source, ResponseSource::Network);
        assert_eq!(output.content_type.as_deref(), Some("text/html"));
        assert_eq!(output.body.as_deref(), Some("<h1>Dashboard</h1>"));
    }

    #[tokio::test]
    async fn test_post_passes_through() {
        let server = testing::origin().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/calls").header("x-agent", "dana").body("note");
                then.status(201).body("saved");
            })
            .await;
        let state = testing::active_state(&server).await;

        let mut p = params("/calls");
        p.method = "post".into();
        p.headers.insert("x-agent".into(), "dana".into());
        p.body = Some("note".into());

        let output: WebFetchOutput = testing::output(&fetch_impl(&state, p).await.unwrap());
        mock.assert_async().await;
        assert_eq!(output.source, ResponseSource::Passthrough);
        assert_eq!(output.status, 201);
    }

    #[tokio::test]
    async fn test_uncontrolled_without_worker() {
        let server = testing::origin().await;
        let state = testing::state(&server).await;

        let output: WebFetchOutput = testing::output(&fetch_impl(&state, params("/static/style.css")).await.unwrap());
        assert_eq!(output.source, ResponseSource::Uncontrolled);
    }

    #[tokio::test]
    async fn test_invalid_destination() {
        let server = testing::origin().await;
        let state = testing::state(&server).await;

        let mut p = params("/dashboard");
        p.destination = Some("teapot".into());
        let err = fetch_impl(&state, p).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }

    #[tokio::test]
    async fn test_empty_url() {
        let server = testing::origin().await;
        let state = testing::state(&server).await;

        assert!(fetch_impl(&state, params("  ")).await.is_err());
    }
}
