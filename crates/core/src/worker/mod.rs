//! The offline worker.
//!
//! A [`ServiceWorker`] owns one cache version. Its host delivers events
//! through [`ServiceWorker::dispatch`], which runs the matching handler and
//! only returns once all of the handler's work has finished:
//!
//! - `install` precaches the static manifest into the version's store
//! - `activate` deletes every other store version and claims clients
//! - `fetch` routes a request between the store and the network
//! - `push` shows a notification built from the push payload
//! - `notificationclick` closes the notification and opens its target

pub mod events;
pub mod host;
mod lifecycle;
pub mod push;
pub mod registration;
pub mod reminders;
pub mod router;
pub mod script;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use url::Url;

pub use events::{Event, EventKind, EventOutcome};
pub use host::{CacheStorage, Clients, HostServices, Network, Notifications, WindowClient};
pub use push::{Notification, NotificationData, NotificationOptions, PushPayload};
pub use registration::{Registration, RoutedResponse};
pub use reminders::follow_up_reminder;
pub use router::{FetchOutcome, ResponseSource};
pub use script::WorkerScript;

use crate::Error;

/// Lifecycle position of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// Install failed or a newer version replaced it.
    Redundant,
}

/// One worker version bound to its host.
pub struct ServiceWorker {
    script: WorkerScript,
    origin: Url,
    host: HostServices,
    state: Mutex<WorkerState>,
    skip_waiting: AtomicBool,
}

impl std::fmt::Debug for ServiceWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceWorker")
            .field("cache_name", &self.script.cache_name)
            .field("origin", &self.origin.as_str())
            .field("state", &self.state())
            .finish()
    }
}

impl ServiceWorker {
    pub fn new(script: WorkerScript, origin: Url, host: HostServices) -> Self {
        Self {
            script,
            origin,
            host,
            state: Mutex::new(WorkerState::Parsed),
            skip_waiting: AtomicBool::new(false),
        }
    }

    pub fn cache_name(&self) -> &str {
        &self.script.cache_name
    }

    pub fn script(&self) -> &WorkerScript {
        &self.script
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn state(&self) -> WorkerState {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Whether install asked to activate without waiting.
    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting.load(Ordering::Acquire)
    }

    /// Run the handler for `event` to completion.
    pub async fn dispatch(&self, event: Event) -> Result<EventOutcome, Error> {
        let kind = event.kind();
        let span = tracing::debug_span!("worker_event", event = %kind, cache = %self.script.cache_name);

        async move {
            match event {
                Event::Install => self.install().await.map(|cached| EventOutcome::Installed { cached }),
                Event::Activate => self
                    .activate()
                    .await
                    .map(|(deleted, claimed)| EventOutcome::Activated { deleted, claimed }),
                Event::Fetch(request) => self.handle_fetch(&request).await.map(EventOutcome::Fetch),
                Event::Push(data) => self.handle_push(data.as_deref()).await.map(EventOutcome::NotificationShown),
                Event::NotificationClick(notification) => self
                    .handle_notification_click(&notification)
                    .await
                    .map(EventOutcome::WindowOpened),
            }
        }
        .instrument(span)
        .await
    }

    async fn handle_push(&self, data: Option<&[u8]>) -> Result<Notification, Error> {
        let notification = PushPayload::decode(data).into_notification(&self.script.notifications);
        self.host.notifications.show(notification.clone()).await?;
        tracing::debug!(tag = %notification.options.tag, "notification shown");
        Ok(notification)
    }

    async fn handle_notification_click(&self, notification: &Notification) -> Result<WindowClient, Error> {
        self.host.notifications.close(&notification.options.tag).await?;

        let target = notification.target(&self.script.notifications);
        let url = self
            .origin
            .join(target)
            .map_err(|e| Error::InvalidUrl(format!("{target}: {e}")))?;
        self.host.clients.open_window(&url).await
    }

    fn set_state(&self, next: WorkerState) {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        tracing::trace!(from = ?*state, to = ?next, "worker state");
        *state = next;
    }

    /// Move to `next` if currently in one of `allowed`.
    fn transition(&self, allowed: &[WorkerState], next: WorkerState) -> Result<WorkerState, Error> {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !allowed.contains(&state) {
            return Err(Error::InvalidState(format!(
                "cannot move {} worker from {:?} to {:?}",
                self.script.cache_name, *state, next
            )));
        }
        let previous = *state;
        *state = next;
        Ok(previous)
    }
}
