//! Fetch routing.
//!
//! - Non-GET requests are not intercepted.
//! - Documents go to the network first and fall back to the store.
//! - Everything else is answered from the store when possible and fetched
//!   otherwise. Fetched assets are not written back.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ServiceWorker;
use crate::{Destination, Error, Request, Response};

/// Where a routed response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    /// The worker answered from its store.
    Cache,
    /// The worker fetched it from the network.
    Network,
    /// The worker declined; the host fetched it unmodified.
    Passthrough,
    /// No worker controls the host; fetched directly.
    Uncontrolled,
}

/// Result of a fetch event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The worker did not respond; the host should perform the request
    /// itself.
    Passthrough,
    Respond { response: Response, source: ResponseSource },
}

impl ServiceWorker {
    pub(super) async fn handle_fetch(&self, request: &Request) -> Result<FetchOutcome, Error> {
        if !request.is_get() {
            tracing::trace!(method = %request.method, url = %request.url, "not intercepting");
            return Ok(FetchOutcome::Passthrough);
        }

        if request.destination == Destination::Document {
            self.network_first(request).await
        } else {
            self.cache_first(request).await
        }
    }

    async fn network_first(&self, request: &Request) -> Result<FetchOutcome, Error> {
        let network_err = match self.host.network.fetch(request).await {
            Ok(response) => return Ok(FetchOutcome::Respond { response, source: ResponseSource::Network }),
            Err(err) => err,
        };

        match self.host.storage.match_request(request).await {
            Ok(Some(response)) => {
                tracing::debug!(url = %request.url, error = %network_err, "network failed; serving cached document");
                Ok(FetchOutcome::Respond { response, source: ResponseSource::Cache })
            }
            Ok(None) => {
                tracing::debug!(url = %request.url, error = %network_err, "network failed and document not cached");
                Err(network_err)
            }
            Err(storage_err) => {
                tracing::warn!(url = %request.url, error = %storage_err, "cache lookup failed after network failure");
                Err(network_err)
            }
        }
    }

    async fn cache_first(&self, request: &Request) -> Result<FetchOutcome, Error> {
        if let Some(response) = self.host.storage.match_request(request).await? {
            tracing::trace!(url = %request.url, "cache hit");
            return Ok(FetchOutcome::Respond { response, source: ResponseSource::Cache });
        }

        let response = self.host.network.fetch(request).await?;
        Ok(FetchOutcome::Respond { response, source: ResponseSource::Network })
    }
}
