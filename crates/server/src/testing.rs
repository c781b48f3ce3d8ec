//! Test state backed by a mock origin.

use std::sync::Arc;

use httpmock::Method::GET;
use httpmock::MockServer;
use lifi_client::{FetchClient, FetchConfig};
use lifi_core::CacheDb;
use lifi_core::worker::WorkerScript;
use lifi_core::worker::script::STATIC_ASSETS;
use rmcp::model::CallToolResult;
use url::Url;

use crate::state::AppState;

/// Origin serving every manifest asset plus a dashboard page.
pub(crate) async fn origin() -> MockServer {
    let server = MockServer::start_async().await;
    for path in STATIC_ASSETS {
        server
            .mock_async(|when, then| {
                when.method(GET).path(*path);
                then.status(200).body(format!("asset {path}"));
            })
            .await;
    }
    server
        .mock_async(|when, then| {
            when.method(GET).path("/dashboard");
            then.status(200).header("content-type", "text/html").body("<h1>Dashboard</h1>");
        })
        .await;
    server
}

/// State over `server` with no worker registered.
pub(crate) async fn state(server: &MockServer) -> AppState {
    let origin = Url::parse(&server.base_url()).unwrap();
    let db = CacheDb::open_in_memory().await.unwrap();
    let network = Arc::new(FetchClient::new(FetchConfig::default()).unwrap());
    AppState::new(origin, db, network)
}

/// State over `server` with the default worker active.
pub(crate) async fn active_state(server: &MockServer) -> AppState {
    let state = state(server).await;
    state.install(WorkerScript::default()).await.unwrap();
    state
}

/// Decode the JSON text of a successful tool result.
pub(crate) fn output<T: serde::de::DeserializeOwned>(result: &CallToolResult) -> T {
    let text = result.content[0].as_text().expect("Expected text content");
    serde_json::from_str(&text.text).unwrap()
}
