//! In-memory host doubles for worker tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use url::Url;

use super::host::{CacheStorage, Clients, HostServices, Network, Notifications, WindowClient};
use super::push::Notification;
use super::script::STATIC_ASSETS;
use super::{Event, ServiceWorker, WorkerScript};
use crate::{CacheDb, Error, Request, Response};

pub(crate) const TEST_ORIGIN: &str = "https://lifi.test";

pub(crate) fn ok_response(body: &str) -> Response {
    Response {
        url: String::new(),
        status: 200,
        status_text: "OK".into(),
        headers: vec![("content-type".into(), "text/plain".into())],
        body: body.as_bytes().to_vec(),
    }
}

/// Network answering by path; unknown paths fail like an unreachable server.
#[derive(Default)]
pub(crate) struct StubNetwork {
    routes: Mutex<HashMap<String, Option<Response>>>,
    calls: AtomicUsize,
}

impl StubNetwork {
    pub(crate) fn serve(&self, path: &str, response: Response) {
        self.routes.lock().unwrap().insert(path.to_string(), Some(response));
    }

    pub(crate) fn fail(&self, path: &str) {
        self.routes.lock().unwrap().insert(path.to_string(), None);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Network for StubNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let route = self.routes.lock().unwrap().get(request.url.path()).cloned();
        match route {
            Some(Some(mut response)) => {
                response.url = request.url.to_string();
                Ok(response)
            }
            _ => Err(Error::Network(format!("connection refused: {}", request.url))),
        }
    }
}

/// Storage whose every operation fails.
pub(crate) struct UnreadableStorage;

#[async_trait]
impl CacheStorage for UnreadableStorage {
    async fn open(&self, _name: &str) -> Result<(), Error> {
        Err(unreadable())
    }

    async fn populate(&self, _name: &str, _entries: Vec<(Request, Response)>) -> Result<usize, Error> {
        Err(unreadable())
    }

    async fn match_request(&self, _request: &Request) -> Result<Option<Response>, Error> {
        Err(unreadable())
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        Err(unreadable())
    }

    async fn delete(&self, _name: &str) -> Result<bool, Error> {
        Err(unreadable())
    }

    async fn is_ready(&self, _name: &str) -> Result<bool, Error> {
        Err(unreadable())
    }

    async fn active(&self) -> Result<Option<String>, Error> {
        Err(unreadable())
    }

    async fn set_active(&self, _name: &str) -> Result<(), Error> {
        Err(unreadable())
    }
}

fn unreadable() -> Error {
    Error::MigrationFailed("store unreadable".into())
}

#[derive(Default)]
pub(crate) struct RecordingClients {
    windows: Mutex<Vec<WindowClient>>,
    claims: AtomicUsize,
    refuse_claims: AtomicBool,
}

impl RecordingClients {
    /// Make `claim` fail until called again with false.
    pub(crate) fn refuse_claims(&self, refuse: bool) {
        self.refuse_claims.store(refuse, Ordering::SeqCst);
    }

    pub(crate) fn window_count(&self) -> usize {
        self.windows.lock().unwrap().len()
    }

    pub(crate) fn claims(&self) -> usize {
        self.claims.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Clients for RecordingClients {
    async fn claim(&self) -> Result<usize, Error> {
        if self.refuse_claims.load(Ordering::SeqCst) {
            return Err(Error::InvalidState("clients refused claim".into()));
        }
        self.claims.fetch_add(1, Ordering::SeqCst);
        Ok(self.windows.lock().unwrap().len())
    }

    async fn open_window(&self, url: &Url) -> Result<WindowClient, Error> {
        let mut windows = self.windows.lock().unwrap();
        for window in windows.iter_mut() {
            window.focused = false;
        }
        if let Some(window) = windows.iter_mut().find(|w| w.url == url.as_str()) {
            window.focused = true;
            return Ok(window.clone());
        }
        let window = WindowClient { id: windows.len() as u64 + 1, url: url.to_string(), focused: true };
        windows.push(window.clone());
        Ok(window)
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifications {
    shown: Mutex<Vec<Notification>>,
}

impl RecordingNotifications {
    pub(crate) fn shown(&self) -> Vec<Notification> {
        self.shown.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifications for RecordingNotifications {
    async fn show(&self, notification: Notification) -> Result<(), Error> {
        let mut shown = self.shown.lock().unwrap();
        shown.retain(|n| n.options.tag != notification.options.tag);
        shown.push(notification);
        Ok(())
    }

    async fn close(&self, tag: &str) -> Result<bool, Error> {
        let mut shown = self.shown.lock().unwrap();
        let before = shown.len();
        shown.retain(|n| n.options.tag != tag);
        Ok(shown.len() != before)
    }
}

/// A full set of host doubles over an in-memory cache database.
pub(crate) struct TestHost {
    pub(crate) db: CacheDb,
    pub(crate) network: Arc<StubNetwork>,
    pub(crate) clients: Arc<RecordingClients>,
    pub(crate) notifications: Arc<RecordingNotifications>,
}

impl TestHost {
    /// Host whose network serves every manifest asset.
    pub(crate) async fn new() -> Self {
        let network = Arc::new(StubNetwork::default());
        for path in STATIC_ASSETS {
            network.serve(path, ok_response(&format!("asset {path}")));
        }

        Self {
            db: CacheDb::open_in_memory().await.unwrap(),
            network,
            clients: Arc::new(RecordingClients::default()),
            notifications: Arc::new(RecordingNotifications::default()),
        }
    }

    pub(crate) fn url(path: &str) -> Url {
        Url::parse(TEST_ORIGIN).unwrap().join(path).unwrap()
    }

    pub(crate) fn services(&self) -> HostServices {
        HostServices {
            storage: Arc::new(self.db.clone()),
            network: self.network.clone(),
            clients: self.clients.clone(),
            notifications: self.notifications.clone(),
        }
    }

    pub(crate) fn worker(&self, script: WorkerScript) -> ServiceWorker {
        ServiceWorker::new(script, Url::parse(TEST_ORIGIN).unwrap(), self.services())
    }

    /// The default worker, installed and activated.
    pub(crate) async fn activated_worker(&self) -> ServiceWorker {
        let worker = self.worker(WorkerScript::default());
        worker.dispatch(Event::Install).await.unwrap();
        worker.dispatch(Event::Activate).await.unwrap();
        worker
    }

    /// Put one entry into a store, creating the store if needed.
    pub(crate) async fn seed(&self, store: &str, request: &Request, response: Response) {
        self.db.open_store(store).await.unwrap();
        self.db
            .populate_store(store, vec![(request.clone(), response)])
            .await
            .unwrap();
    }
}
