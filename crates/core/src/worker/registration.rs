//! The host side of worker registration.
//!
//! A [`Registration`] holds at most one active and one waiting worker,
//! drives new versions through install and activate, and routes the host's
//! requests to whichever worker is in control.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use super::host::{Network, WindowClient};
use super::push::Notification;
use super::router::{FetchOutcome, ResponseSource};
use super::{Event, EventOutcome, ServiceWorker, WorkerState};
use crate::{Error, Request, Response};

/// A response together with how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedResponse {
    pub response: Response,
    pub source: ResponseSource,
}

/// Snapshot of the registration's worker slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RegistrationStatus {
    pub active: Option<WorkerStatus>,
    pub waiting: Option<WorkerStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WorkerStatus {
    pub cache_name: String,
    pub state: WorkerState,
}

impl From<&ServiceWorker> for WorkerStatus {
    fn from(worker: &ServiceWorker) -> Self {
        Self { cache_name: worker.cache_name().to_string(), state: worker.state() }
    }
}

pub struct Registration {
    network: Arc<dyn Network>,
    active: RwLock<Option<Arc<ServiceWorker>>>,
    waiting: RwLock<Option<Arc<ServiceWorker>>>,
    /// Serialises install/activate across versions.
    lifecycle: Mutex<()>,
}

impl Registration {
    /// `network` serves requests no worker answers.
    pub fn new(network: Arc<dyn Network>) -> Self {
        Self { network, active: RwLock::new(None), waiting: RwLock::new(None), lifecycle: Mutex::new(()) }
    }

    /// Install a new worker version and, if it asks to skip waiting, activate
    /// it in place of the current one.
    ///
    /// A failed install leaves the current active worker in control.
    pub async fn register(&self, worker: ServiceWorker) -> Result<Arc<ServiceWorker>, Error> {
        let _guard = self.lifecycle.lock().await;
        let worker = Arc::new(worker);

        worker.dispatch(Event::Install).await?;

        if worker.skip_waiting_requested() {
            if let Err(err) = self.promote(worker.clone()).await {
                tracing::warn!(cache = %worker.cache_name(), error = %err, "activation failed; worker left waiting");
                self.park(worker).await;
                return Err(err);
            }
        } else {
            tracing::info!(cache = %worker.cache_name(), "worker installed; waiting for activation");
            self.park(worker.clone()).await;
        }

        Ok(worker)
    }

    /// Put back in control a worker whose store a previous run activated.
    ///
    /// Returns `None` without touching the network when there is nothing to
    /// resume; the caller should then [`register`](Self::register) it.
    pub async fn resume(&self, worker: ServiceWorker) -> Result<Option<Arc<ServiceWorker>>, Error> {
        let _guard = self.lifecycle.lock().await;
        if !worker.resume().await? {
            return Ok(None);
        }

        let worker = Arc::new(worker);
        if let Some(previous) = self.active.write().await.replace(worker.clone())
            && !Arc::ptr_eq(&previous, &worker)
        {
            previous.retire();
        }
        Ok(Some(worker))
    }

    /// Hold an installed worker in the waiting slot, replacing any other.
    async fn park(&self, worker: Arc<ServiceWorker>) {
        if let Some(previous) = self.waiting.write().await.replace(worker.clone())
            && !Arc::ptr_eq(&previous, &worker)
        {
            previous.retire();
        }
    }

    /// Activate the waiting worker, if any.
    pub async fn activate_waiting(&self) -> Result<Option<Arc<ServiceWorker>>, Error> {
        let _guard = self.lifecycle.lock().await;
        let Some(worker) = self.waiting.write().await.take() else {
            return Ok(None);
        };

        if let Err(err) = self.promote(worker.clone()).await {
            *self.waiting.write().await = Some(worker);
            return Err(err);
        }
        Ok(Some(worker))
    }

    async fn promote(&self, worker: Arc<ServiceWorker>) -> Result<(), Error> {
        worker.dispatch(Event::Activate).await?;

        let previous = self.active.write().await.replace(worker.clone());
        if let Some(previous) = previous
            && !Arc::ptr_eq(&previous, &worker)
        {
            previous.retire();
            tracing::info!(replaced = %previous.cache_name(), by = %worker.cache_name(), "worker replaced");
        }
        Ok(())
    }

    pub async fn active(&self) -> Option<Arc<ServiceWorker>> {
        self.active.read().await.clone()
    }

    pub async fn status(&self) -> RegistrationStatus {
        RegistrationStatus {
            active: self.active.read().await.as_deref().map(WorkerStatus::from),
            waiting: self.waiting.read().await.as_deref().map(WorkerStatus::from),
        }
    }

    /// Route a request through the active worker, or straight to the network
    /// when no worker is in control.
    pub async fn fetch(&self, request: Request) -> Result<RoutedResponse, Error> {
        let Some(worker) = self.active().await else {
            let response = self.network.fetch(&request).await?;
            return Ok(RoutedResponse { response, source: ResponseSource::Uncontrolled });
        };

        match worker.dispatch(Event::Fetch(request.clone())).await? {
            EventOutcome::Fetch(FetchOutcome::Respond { response, source }) => Ok(RoutedResponse { response, source }),
            EventOutcome::Fetch(FetchOutcome::Passthrough) => {
                let response = self.network.fetch(&request).await?;
                Ok(RoutedResponse { response, source: ResponseSource::Passthrough })
            }
            other => Err(Error::InvalidState(format!("fetch produced {other:?}"))),
        }
    }

    /// Deliver a push message to the active worker.
    pub async fn push(&self, data: Option<Vec<u8>>) -> Result<Notification, Error> {
        let worker = self.active().await.ok_or(Error::NoActiveWorker)?;
        match worker.dispatch(Event::Push(data)).await? {
            EventOutcome::NotificationShown(notification) => Ok(notification),
            other => Err(Error::InvalidState(format!("push produced {other:?}"))),
        }
    }

    /// Deliver a notification activation to the active worker.
    pub async fn notification_click(&self, notification: Notification) -> Result<WindowClient, Error> {
        let worker = self.active().await.ok_or(Error::NoActiveWorker)?;
        match worker.dispatch(Event::NotificationClick(notification)).await? {
            EventOutcome::WindowOpened(window) => Ok(window),
            other => Err(Error::InvalidState(format!("notificationclick produced {other:?}"))),
        }
    }
}
