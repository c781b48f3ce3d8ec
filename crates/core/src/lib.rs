//! Core types and shared functionality for lifi-sw.
//!
//! This crate provides:
//! - Versioned cache store with SQLite backend
//! - The offline worker: request routing, cache lifecycle, push notifications
//! - Registration host that drives the worker lifecycle
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod worker;

pub use cache::{CacheDb, PushSubscription, StoreInfo};
pub use config::AppConfig;
pub use error::Error;
pub use http::{Destination, Request, Response};
