//! Cache store inspection tools.

pub mod list;
pub mod lookup;

pub use list::{CacheListParams, list_impl};
pub use lookup::{CacheMatchParams, match_impl};
