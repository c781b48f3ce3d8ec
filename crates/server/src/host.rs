//! In-process client windows and notification tray.
//!
//! The server has no browser, so windows and notifications are records the
//! tools can list and act on.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use lifi_core::Error;
use lifi_core::worker::{Clients, Notification, Notifications, WindowClient};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

/// Window records opened on behalf of the worker.
#[derive(Default)]
pub struct HostClients {
    windows: Mutex<Vec<WindowClient>>,
    next_id: AtomicU64,
}

impl HostClients {
    pub fn windows(&self) -> Vec<WindowClient> {
        self.windows.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

#[async_trait]
impl Clients for HostClients {
    async fn claim(&self) -> Result<usize, Error> {
        Ok(self.windows.lock().unwrap_or_else(|p| p.into_inner()).len())
    }

    async fn open_window(&self, url: &Url) -> Result<WindowClient, Error> {
        let mut windows = self.windows.lock().unwrap_or_else(|p| p.into_inner());
        for window in windows.iter_mut() {
            window.focused = false;
        }

        if let Some(window) = windows.iter_mut().find(|w| w.url == url.as_str()) {
            window.focused = true;
            tracing::debug!(id = window.id, url = %url, "focused window");
            return Ok(window.clone());
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let window = WindowClient { id, url: url.to_string(), focused: true };
        windows.push(window.clone());
        tracing::debug!(id, url = %url, "opened window");
        Ok(window)
    }
}

/// A notification currently on display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ShownNotification {
    pub notification: Notification,
    /// RFC 3339 time it was shown.
    pub shown_at: String,
}

/// Notifications on display, at most one per tag.
#[derive(Default)]
pub struct NotificationTray {
    shown: Mutex<Vec<ShownNotification>>,
}

impl NotificationTray {
    pub fn shown(&self) -> Vec<ShownNotification> {
        self.shown.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn get(&self, tag: &str) -> Option<Notification> {
        self.shown
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .find(|s| s.notification.options.tag == tag)
            .map(|s| s.notification.clone())
    }
}

#[async_trait]
impl Notifications for NotificationTray {
    async fn show(&self, notification: Notification) -> Result<(), Error> {
        let mut shown = self.shown.lock().unwrap_or_else(|p| p.into_inner());
        shown.retain(|s| s.notification.options.tag != notification.options.tag);
        shown.push(ShownNotification { notification, shown_at: Utc::now().to_rfc3339() });
        Ok(())
    }

    async fn close(&self, tag: &str) -> Result<bool, Error> {
        let mut shown = self.shown.lock().unwrap_or_else(|p| p.into_inner());
        let before = shown.len();
        shown.retain(|s| s.notification.options.tag != tag);
        Ok(shown.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifi_core::worker::PushPayload;
    use lifi_core::worker::script::NotificationDefaults;

    fn notification(tag: &str, title: &str) -> Notification {
        PushPayload { title: Some(title.into()), tag: Some(tag.into()), ..Default::default() }
            .into_notification(&NotificationDefaults::default())
    }

    #[tokio::test]
    async fn test_open_window_focuses_existing() {
        let clients = HostClients::default();
        let dashboard = Url::parse("http://127.0.0.1:5000/dashboard").unwrap();
        let calls = Url::parse("http://127.0.0.1:5000/calls").unwrap();

        let first = clients.open_window(&dashboard).await.unwrap();
        let second = clients.open_window(&calls).await.unwrap();
        assert_ne!(first.id, second.id);

        let again = clients.open_window(&dashboard).await.unwrap();
        assert_eq!(again.id, first.id);
        assert!(again.focused);

        let windows = clients.windows();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows.iter().filter(|w| w.focused).count(), 1);
        assert_eq!(clients.claim().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_tray_replaces_by_tag() {
        let tray = NotificationTray::default();
        tray.show(notification("follow-up", "first")).await.unwrap();
        tray.show(notification("call-1", "other")).await.unwrap();
        tray.show(notification("follow-up", "second")).await.unwrap();

        assert_eq!(tray.shown().len(), 2);
        assert_eq!(tray.get("follow-up").unwrap().title, "second");

        assert!(tray.close("follow-up").await.unwrap());
        assert!(!tray.close("follow-up").await.unwrap());
        assert!(tray.get("follow-up").is_none());
    }
}
