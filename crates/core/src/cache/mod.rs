//! SQLite-backed versioned cache store.
//!
//! This module provides the persistent store the worker caches into, using
//! SQLite with async access via tokio-rusqlite. It supports:
//!
//! - Named store generations, committed atomically on population
//! - Request identity keyed by method and fragment-less URL
//! - Automatic schema migrations
//! - Push subscription storage

pub mod connection;
pub mod hash;
pub mod migrations;
pub mod stores;
pub mod subscriptions;

pub use crate::Error;

pub use connection::CacheDb;
pub use stores::{EntryInfo, StoreInfo};
pub use subscriptions::PushSubscription;
