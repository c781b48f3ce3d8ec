//! Outbound URL checks.

/// Error type for URLs the client refuses to send.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("missing host: {0}")]
    MissingHost(String),
}

/// Prepare a request URL for the wire.
///
/// 1. Only `http` and `https` are fetched
/// 2. A host is required
/// 3. The fragment is dropped; servers never see it
/// 4. Query string is kept as-is
pub fn canonicalize(input: &url::Url) -> Result<url::Url, UrlError> {
    match input.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if input.host_str().is_none_or(str::is_empty) {
        return Err(UrlError::MissingHost(input.to_string()));
    }

    let mut url = input.clone();
    url.set_fragment(None);
    Ok(url)
}
