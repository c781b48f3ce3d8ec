//! Lifecycle and functional events the host delivers to a worker.

use std::fmt;
use std::str::FromStr;

use super::host::WindowClient;
use super::push::Notification;
use super::router::FetchOutcome;
use crate::{Error, Request};

/// Name of an event a worker handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Install,
    Activate,
    Fetch,
    Push,
    NotificationClick,
}

impl EventKind {
    pub const ALL: [EventKind; 5] =
        [EventKind::Install, EventKind::Activate, EventKind::Fetch, EventKind::Push, EventKind::NotificationClick];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Install => "install",
            EventKind::Activate => "activate",
            EventKind::Fetch => "fetch",
            EventKind::Push => "push",
            EventKind::NotificationClick => "notificationclick",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown worker event: {s}")))
    }
}

/// An event together with its payload.
#[derive(Debug, Clone)]
pub enum Event {
    Install,
    Activate,
    Fetch(Request),
    /// Raw push data, if the message carried any.
    Push(Option<Vec<u8>>),
    NotificationClick(Notification),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Install => EventKind::Install,
            Event::Activate => EventKind::Activate,
            Event::Fetch(_) => EventKind::Fetch,
            Event::Push(_) => EventKind::Push,
            Event::NotificationClick(_) => EventKind::NotificationClick,
        }
    }
}

/// What a handled event produced once all its work finished.
#[derive(Debug, Clone)]
pub enum EventOutcome {
    Installed { cached: usize },
    Activated { deleted: Vec<String>, claimed: usize },
    Fetch(FetchOutcome),
    NotificationShown(Notification),
    WindowOpened(WindowClient),
}
