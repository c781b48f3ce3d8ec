//! Seams between the worker and the platform hosting it.
//!
//! The worker never touches storage, the network, client windows, or the
//! notification tray directly; it goes through these traits so that the
//! same routing and lifecycle code runs against SQLite and reqwest in the
//! server and against stubs in tests.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use super::push::Notification;
use crate::{CacheDb, Error, Request, Response};

/// Versioned cache storage.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the named store, or mark an existing one not ready.
    async fn open(&self, name: &str) -> Result<(), Error>;

    /// Write all entries and commit the store as ready, or write nothing.
    async fn populate(&self, name: &str, entries: Vec<(Request, Response)>) -> Result<usize, Error>;

    /// Look the request up across every store.
    async fn match_request(&self, request: &Request) -> Result<Option<Response>, Error>;

    /// Names of every existing store.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Delete a store; false if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool, Error>;

    /// Whether the store exists and its last population committed.
    async fn is_ready(&self, name: &str) -> Result<bool, Error>;

    /// Store owned by the last activated worker, surviving restarts.
    async fn active(&self) -> Result<Option<String>, Error>;

    async fn set_active(&self, name: &str) -> Result<(), Error>;
}

/// Performs requests against the real network.
#[async_trait]
pub trait Network: Send + Sync {
    /// Resolve with whatever response the server sent, including error
    /// statuses. Fail only when no response could be obtained.
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}

/// A window the host has open for the worker's origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WindowClient {
    pub id: u64,
    pub url: String,
    pub focused: bool,
}

/// The host's client windows.
#[async_trait]
pub trait Clients: Send + Sync {
    /// Take control of every open client. Returns how many were claimed.
    async fn claim(&self) -> Result<usize, Error>;

    /// Focus a client already showing `url`, or open a new one.
    async fn open_window(&self, url: &Url) -> Result<WindowClient, Error>;
}

/// The host's notification tray.
#[async_trait]
pub trait Notifications: Send + Sync {
    /// Show a notification, replacing any shown with the same tag.
    async fn show(&self, notification: Notification) -> Result<(), Error>;

    /// Dismiss the notification with this tag; false if none was shown.
    async fn close(&self, tag: &str) -> Result<bool, Error>;
}

/// Everything a worker needs from its host.
#[derive(Clone)]
pub struct HostServices {
    pub storage: Arc<dyn CacheStorage>,
    pub network: Arc<dyn Network>,
    pub clients: Arc<dyn Clients>,
    pub notifications: Arc<dyn Notifications>,
}

#[async_trait]
impl CacheStorage for CacheDb {
    async fn open(&self, name: &str) -> Result<(), Error> {
        self.open_store(name).await
    }

    async fn populate(&self, name: &str, entries: Vec<(Request, Response)>) -> Result<usize, Error> {
        self.populate_store(name, entries).await
    }

    async fn match_request(&self, request: &Request) -> Result<Option<Response>, Error> {
        CacheDb::match_request(self, request).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.store_names().await
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        self.delete_store(name).await
    }

    async fn is_ready(&self, name: &str) -> Result<bool, Error> {
        CacheDb::is_ready(self, name).await
    }

    async fn active(&self) -> Result<Option<String>, Error> {
        self.active_store().await
    }

    async fn set_active(&self, name: &str) -> Result<(), Error> {
        self.set_active_store(name).await
    }
}
