//! Request and response values exchanged between the worker and its host.
//!
//! These are plain data: the host builds a [`Request`] for every outbound
//! request it wants routed, and a [`Response`] is what either the network or
//! the cache store produced for it.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;

/// What the requester intends to do with the response.
///
/// Mirrors the Fetch standard's `RequestDestination` vocabulary; only
/// [`Destination::Document`] changes routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    /// A full navigable page.
    Document,
    Style,
    Script,
    Image,
    Font,
    Manifest,
    Audio,
    Video,
    Track,
    Worker,
    Iframe,
    /// No destination (`fetch()`/XHR calls).
    #[default]
    #[serde(rename = "")]
    Empty,
}

impl Destination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Destination::Document => "document",
            Destination::Style => "style",
            Destination::Script => "script",
            Destination::Image => "image",
            Destination::Font => "font",
            Destination::Manifest => "manifest",
            Destination::Audio => "audio",
            Destination::Video => "video",
            Destination::Track => "track",
            Destination::Worker => "worker",
            Destination::Iframe => "iframe",
            Destination::Empty => "",
        }
    }

    /// Best guess at a destination from a URL path's extension.
    ///
    /// Used when a host has no `Sec-Fetch-Dest` to go on. Paths without an
    /// extension, or ending in `.html`, are treated as documents.
    pub fn infer_from_path(path: &str) -> Self {
        let file = path.rsplit('/').next().unwrap_or_default();
        let Some((_, ext)) = file.rsplit_once('.') else {
            return Destination::Document;
        };

        match ext.to_ascii_lowercase().as_str() {
            "html" | "htm" => Destination::Document,
            "css" => Destination::Style,
            "js" | "mjs" => Destination::Script,
            "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "ico" => Destination::Image,
            "woff" | "woff2" | "ttf" | "otf" => Destination::Font,
            "webmanifest" => Destination::Manifest,
            "mp3" | "ogg" | "wav" => Destination::Audio,
            "mp4" | "webm" => Destination::Video,
            "vtt" => Destination::Track,
            _ => Destination::Empty,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Destination {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let dest = match s.trim().to_ascii_lowercase().as_str() {
            "document" => Destination::Document,
            "style" => Destination::Style,
            "script" => Destination::Script,
            "image" => Destination::Image,
            "font" => Destination::Font,
            "manifest" => Destination::Manifest,
            "audio" => Destination::Audio,
            "video" => Destination::Video,
            "track" => Destination::Track,
            "worker" | "sharedworker" | "serviceworker" => Destination::Worker,
            "iframe" | "frame" => Destination::Iframe,
            "" | "empty" => Destination::Empty,
            other => return Err(Error::InvalidInput(format!("unknown request destination: {other}"))),
        };
        Ok(dest)
    }
}

/// An outbound request as seen by the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Upper-cased HTTP method.
    pub method: String,
    /// Absolute URL.
    pub url: url::Url,
    pub destination: Destination,
    pub headers: Vec<(String, String)>,
    /// Forwarded as-is when the worker lets the request pass through.
    pub body: Vec<u8>,
}

impl Request {
    /// Build a GET request with no headers.
    pub fn get(url: url::Url, destination: Destination) -> Self {
        Self { method: "GET".into(), url, destination, headers: Vec::new(), body: Vec::new() }
    }

    /// Build a request from untrusted parts, validating the URL.
    pub fn from_parts(method: &str, url: &str, destination: Destination) -> Result<Self, Error> {
        let method = method.trim().to_ascii_uppercase();
        if method.is_empty() {
            return Err(Error::InvalidInput("method cannot be empty".into()));
        }
        let url = url::Url::parse(url.trim()).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;
        Ok(Self { method, url, destination, headers: Vec::new(), body: Vec::new() })
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Whether this is a retrieval the worker may answer from its store.
    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }
}

/// A response produced by the network or read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    /// Whether the status is in the 200-299 range.
    pub fn ok(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// First header value with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_parse_and_display() {
        assert_eq!("document".parse::<Destination>().unwrap(), Destination::Document);
        assert_eq!("STYLE".parse::<Destination>().unwrap(), Destination::Style);
        assert_eq!("".parse::<Destination>().unwrap(), Destination::Empty);
        assert_eq!("serviceworker".parse::<Destination>().unwrap(), Destination::Worker);
        assert!("teapot".parse::<Destination>().is_err());
        assert_eq!(Destination::Manifest.to_string(), "manifest");
    }

    #[test]
    fn test_destination_serde() {
        let json = serde_json::to_string(&Destination::Document).unwrap();
        assert_eq!(json, "\"document\"");
        let empty: Destination = serde_json::from_str("\"\"").unwrap();
        assert_eq!(empty, Destination::Empty);
    }

    #[test]
    fn test_infer_destination() {
        assert_eq!(Destination::infer_from_path("/dashboard"), Destination::Document);
        assert_eq!(Destination::infer_from_path("/"), Destination::Document);
        assert_eq!(Destination::infer_from_path("/index.html"), Destination::Document);
        assert_eq!(Destination::infer_from_path("/static/style.css"), Destination::Style);
        assert_eq!(Destination::infer_from_path("/static/lumberjack_logo.png"), Destination::Image);
        assert_eq!(Destination::infer_from_path("/static/manifest.json"), Destination::Empty);
    }

    #[test]
    fn test_request_from_parts() {
        let req = Request::from_parts("post", "https://example.com/api/calls", Destination::Empty).unwrap();
        assert_eq!(req.method, "POST");
        assert!(!req.is_get());

        assert!(matches!(Request::from_parts("GET", "/relative", Destination::Empty), Err(Error::InvalidUrl(_))));
        assert!(matches!(Request::from_parts(" ", "https://example.com", Destination::Empty), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_response_helpers() {
        let resp = Response {
            url: "https://example.com/".into(),
            status: 204,
            status_text: "No Content".into(),
            headers: vec![("Content-Type".into(), "text/html".into())],
            body: Vec::new(),
        };
        assert!(resp.ok());
        assert_eq!(resp.content_type(), Some("text/html"));
        assert_eq!(resp.header("CONTENT-TYPE"), Some("text/html"));

        let missing = Response { status: 404, ..resp };
        assert!(!missing.ok());
    }
}
