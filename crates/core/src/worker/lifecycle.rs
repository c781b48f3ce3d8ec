//! Install and activate handlers.

use futures::future::try_join_all;

use super::{ServiceWorker, WorkerState};
use crate::{Error, Request, Response};

impl ServiceWorker {
    /// Precache the static manifest into this version's store.
    ///
    /// The store is marked not ready first, and all assets are fetched
    /// before anything is written; any failure leaves the store not ready
    /// and the worker redundant.
    pub(super) async fn install(&self) -> Result<usize, Error> {
        self.transition(&[WorkerState::Parsed], WorkerState::Installing)?;

        match self.precache().await {
            Ok(cached) => {
                self.skip_waiting.store(self.script.skip_waiting, std::sync::atomic::Ordering::Release);
                self.set_state(WorkerState::Installed);
                tracing::info!(cache = %self.script.cache_name, cached, "worker installed");
                Ok(cached)
            }
            Err(err) => {
                self.set_state(WorkerState::Redundant);
                tracing::warn!(cache = %self.script.cache_name, error = %err, "worker install failed");
                Err(err)
            }
        }
    }

    async fn precache(&self) -> Result<usize, Error> {
        let name = &self.script.cache_name;
        self.host.storage.open(name).await?;

        let requests = self.script.manifest_requests(&self.origin)?;
        let entries = try_join_all(requests.into_iter().map(|request| self.fetch_asset(request))).await?;

        self.host.storage.populate(name, entries).await
    }

    async fn fetch_asset(&self, request: Request) -> Result<(Request, Response), Error> {
        let asset = request.url.path().to_string();
        let response = self
            .host
            .network
            .fetch(&request)
            .await
            .map_err(|e| Error::InstallFailed { asset: asset.clone(), reason: e.to_string() })?;

        if !response.ok() {
            return Err(Error::InstallFailed { asset, reason: format!("status {}", response.status) });
        }

        Ok((request, response))
    }

    /// Delete every store that isn't this version's, claim clients, and
    /// record this version's store as the active one.
    ///
    /// Activating an already active worker repeats the cleanup. On failure
    /// the worker falls back to its previous state so the host may retry.
    pub(super) async fn activate(&self) -> Result<(Vec<String>, usize), Error> {
        let previous =
            self.transition(&[WorkerState::Installed, WorkerState::Activated], WorkerState::Activating)?;

        match self.cleanup_and_claim().await {
            Ok((deleted, claimed)) => {
                self.set_state(WorkerState::Activated);
                tracing::info!(cache = %self.script.cache_name, deleted = ?deleted, claimed, "worker activated");
                Ok((deleted, claimed))
            }
            Err(err) => {
                self.set_state(previous);
                tracing::warn!(cache = %self.script.cache_name, error = %err, "worker activation failed");
                Err(err)
            }
        }
    }

    async fn cleanup_and_claim(&self) -> Result<(Vec<String>, usize), Error> {
        let stale: Vec<String> = self
            .host
            .storage
            .keys()
            .await?
            .into_iter()
            .filter(|name| *name != self.script.cache_name)
            .collect();

        try_join_all(stale.iter().map(|name| self.host.storage.delete(name))).await?;
        let claimed = self.host.clients.claim().await?;
        self.host.storage.set_active(&self.script.cache_name).await?;
        Ok((stale, claimed))
    }

    /// Take back control of this version's store after a restart.
    ///
    /// Succeeds only when the store was the last one activated and is still
    /// ready; the worker then skips install and activate entirely.
    pub(super) async fn resume(&self) -> Result<bool, Error> {
        let name = &self.script.cache_name;
        let storage = &self.host.storage;
        if storage.active().await?.as_deref() != Some(name.as_str()) || !storage.is_ready(name).await? {
            return Ok(false);
        }

        self.transition(&[WorkerState::Parsed], WorkerState::Activated)?;
        tracing::info!(cache = %name, "worker resumed from persisted store");
        Ok(true)
    }

    /// Mark a replaced worker as no longer usable.
    pub(super) fn retire(&self) {
        self.set_state(WorkerState::Redundant);
    }
}
