//! HTTP network for the worker.
//!
//! ### Semantics
//! - Any response the server sends is a success, whatever its status
//! - Only transport failures (DNS, connect, TLS, timeout) are errors
//! - Redirects followed up to a limit; the final URL is reported
//!
//! ### Safety Gates
//! - Only http(s) URLs with a host are sent
//! - Max body bytes: 5MB (configurable)

pub mod url;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Method, header};

pub use self::url::{UrlError, canonicalize};

use lifi_core::worker::Network;
use lifi_core::{AppConfig, Error, Request, Response};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "lifi-sw/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "lifi-sw/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Default::default()
        }
    }
}

/// reqwest-backed [`Network`].
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn build(&self, request: &Request) -> Result<reqwest::RequestBuilder, Error> {
        let url = canonicalize(&request.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| Error::InvalidInput(format!("invalid method: {}", request.method)))?;

        let mut builder = self.http.request(method, url);
        for (name, value) in &request.headers {
            match (
                header::HeaderName::from_bytes(name.as_bytes()),
                header::HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => builder = builder.header(name, value),
                _ => tracing::debug!(header = %name, "dropping invalid request header"),
            }
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        Ok(builder)
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Bytes, Error> {
        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let bytes = response.bytes().await.map_err(network_error)?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        Ok(bytes)
    }
}

fn network_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Network(format!("timed out: {err}"))
    } else {
        Error::Network(err.to_string())
    }
}

#[async_trait]
impl Network for FetchClient {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let start = Instant::now();
        let builder = self.build(request)?;

        let response = builder.send().await.map_err(network_error)?;

        let status = response.status();
        let final_url = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
            .collect();

        let body = self.read_body(response).await?;

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            final_url = %final_url,
            status = status.as_u16(),
            bytes = body.len(),
            fetch_ms = start.elapsed().as_millis() as u64,
            "fetched"
        );

        Ok(Response {
            url: final_url,
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body: body.to_vec(),
        })
    }
}
