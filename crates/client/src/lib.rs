//! Client code for lifi-sw.
//!
//! This crate provides the reqwest-backed network the worker fetches
//! through, shared by the server and its tests.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig};
