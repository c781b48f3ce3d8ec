//! Request identity for cache entries.

use sha2::{Digest, Sha256};

/// Compute the cache key for a request: method plus URL with the fragment
/// stripped.
pub fn request_key(method: &str, url: &url::Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);

    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_str().as_bytes());
    hex::encode(hasher.finalize())
}
