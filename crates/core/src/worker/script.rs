//! The values baked into the worker at build time.
//!
//! A [`WorkerScript`] is the equivalent of one deployed worker script: the
//! cache version it owns, the assets it precaches, and the notification
//! defaults it presents with. Shipping a new version means shipping a script
//! with a new `cache_name`.

use url::Url;

use crate::{Destination, Error, Request};

/// Version name of the current cache generation.
pub const CACHE_NAME: &str = "lifi-v1";

/// Assets precached on install, in order.
pub const STATIC_ASSETS: &[&str] = &["/static/style.css", "/static/manifest.json", "/static/lumberjack_logo.png"];

pub const DEFAULT_TITLE: &str = "LIFI Reminder";
pub const DEFAULT_BODY: &str = "You have a follow-up due.";
pub const DEFAULT_ICON: &str = "/static/icons/icon-192.png";
pub const DEFAULT_BADGE: &str = "/static/icons/icon-192.png";
pub const DEFAULT_TAG: &str = "follow-up";
pub const DEFAULT_URL: &str = "/dashboard";

/// Values substituted for missing push payload fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDefaults {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub tag: String,
    pub url: String,
}

impl Default for NotificationDefaults {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.into(),
            body: DEFAULT_BODY.into(),
            icon: DEFAULT_ICON.into(),
            badge: DEFAULT_BADGE.into(),
            tag: DEFAULT_TAG.into(),
            url: DEFAULT_URL.into(),
        }
    }
}

/// One deployable worker version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerScript {
    pub cache_name: String,
    pub static_assets: Vec<String>,
    pub notifications: NotificationDefaults,
    /// Activate as soon as install completes instead of waiting for the
    /// previous version's clients to go away.
    pub skip_waiting: bool,
}

impl Default for WorkerScript {
    fn default() -> Self {
        Self {
            cache_name: CACHE_NAME.into(),
            static_assets: STATIC_ASSETS.iter().map(|s| s.to_string()).collect(),
            notifications: NotificationDefaults::default(),
            skip_waiting: true,
        }
    }
}

impl WorkerScript {
    /// The baked-in script under a different cache version.
    pub fn versioned(cache_name: impl Into<String>) -> Self {
        Self { cache_name: cache_name.into(), ..Default::default() }
    }

    /// GET requests for every manifest asset, resolved against `origin`.
    pub fn manifest_requests(&self, origin: &Url) -> Result<Vec<Request>, Error> {
        self.static_assets
            .iter()
            .map(|path| {
                let url = origin
                    .join(path)
                    .map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))?;
                let destination = Destination::infer_from_path(url.path());
                Ok(Request::get(url, destination))
            })
            .collect()
    }
}
