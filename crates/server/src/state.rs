//! Shared server state: the cache database, the registration, and the host
//! services the worker runs against.

use std::sync::Arc;

use lifi_client::{FetchClient, FetchConfig};
use lifi_core::worker::{HostServices, Network, Registration, ServiceWorker, WorkerScript};
use lifi_core::{AppConfig, CacheDb, Error};
use url::Url;

use crate::host::{HostClients, NotificationTray};

pub struct AppState {
    pub origin: Url,
    pub db: CacheDb,
    pub registration: Registration,
    pub clients: Arc<HostClients>,
    pub tray: Arc<NotificationTray>,
    network: Arc<dyn Network>,
}

impl AppState {
    pub fn new(origin: Url, db: CacheDb, network: Arc<dyn Network>) -> Self {
        Self {
            origin,
            db,
            registration: Registration::new(network.clone()),
            clients: Arc::new(HostClients::default()),
            tray: Arc::new(NotificationTray::default()),
            network,
        }
    }

    /// Open the database, build the HTTP client, and bring up the baked-in
    /// worker.
    ///
    /// An install failure is logged, not returned: the server still runs,
    /// with requests going straight to the network.
    pub async fn start(config: &AppConfig) -> anyhow::Result<Self> {
        let origin = config.origin_url()?;
        let db = CacheDb::open(&config.db_path).await?;
        let network = Arc::new(FetchClient::new(FetchConfig::from(config))?);

        let state = Self::new(origin, db, network);
        if let Err(e) = state.resume_or_install(WorkerScript::default()).await {
            tracing::warn!(error = %e, "worker install failed; serving uncontrolled");
        }
        Ok(state)
    }

    pub fn services(&self) -> HostServices {
        HostServices {
            storage: Arc::new(self.db.clone()),
            network: self.network.clone(),
            clients: self.clients.clone(),
            notifications: self.tray.clone(),
        }
    }

    /// Register a worker version built from `script`.
    pub async fn install(&self, script: WorkerScript) -> Result<Arc<ServiceWorker>, Error> {
        let worker = ServiceWorker::new(script, self.origin.clone(), self.services());
        let worker = self.registration.register(worker).await?;
        tracing::info!(cache = %worker.cache_name(), state = ?worker.state(), "worker registered");
        Ok(worker)
    }

    /// Resume `script`'s version if a previous run activated it, otherwise
    /// install it.
    ///
    /// A resumed version is not reinstalled, so its store keeps serving when
    /// the origin is unreachable at startup.
    pub async fn resume_or_install(&self, script: WorkerScript) -> Result<Arc<ServiceWorker>, Error> {
        let worker = ServiceWorker::new(script.clone(), self.origin.clone(), self.services());
        match self.registration.resume(worker).await {
            Ok(Some(worker)) => return Ok(worker),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "could not resume persisted worker"),
        }
        self.install(script).await
    }

    /// Resolve a possibly relative URL against the origin.
    pub fn resolve(&self, input: &str) -> Result<Url, Error> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::InvalidInput("url cannot be empty".into()));
        }
        self.origin
            .join(input)
            .map_err(|e| Error::InvalidUrl(format!("{input}: {e}")))
    }
}
