//! Push payload decoding and the notifications built from it.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::script::NotificationDefaults;

/// The structured data a push message may carry.
///
/// Every field is optional; anything missing is filled from
/// [`NotificationDefaults`] when the notification is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PushPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Non-empty string field of a JSON object.
fn text_field(object: &serde_json::Map<String, serde_json::Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl PushPayload {
    /// Decode raw push data.
    ///
    /// Absent data, invalid JSON, and JSON that isn't an object all decode to
    /// the empty payload. Fields that are not non-empty strings are dropped.
    pub fn decode(data: Option<&[u8]>) -> Self {
        let Some(bytes) = data else {
            return Self::default();
        };

        let object = match serde_json::from_slice::<serde_json::Value>(bytes) {
            Ok(serde_json::Value::Object(object)) => object,
            Ok(other) => {
                tracing::debug!(kind = %json_kind(&other), "push data is not an object; using defaults");
                return Self::default();
            }
            Err(e) => {
                tracing::debug!(error = %e, "push data is not valid JSON; using defaults");
                return Self::default();
            }
        };

        Self {
            title: text_field(&object, "title"),
            body: text_field(&object, "body"),
            tag: text_field(&object, "tag"),
            url: text_field(&object, "url"),
        }
    }

    /// JSON bytes suitable for delivery as push data.
    pub fn encode(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_else(|_| b"{}".to_vec())
    }

    /// Build the notification to show, substituting defaults.
    pub fn into_notification(self, defaults: &NotificationDefaults) -> Notification {
        Notification {
            title: self.title.unwrap_or_else(|| defaults.title.clone()),
            options: NotificationOptions {
                body: self.body.unwrap_or_else(|| defaults.body.clone()),
                icon: defaults.icon.clone(),
                badge: defaults.badge.clone(),
                tag: self.tag.unwrap_or_else(|| defaults.tag.clone()),
                data: NotificationData { url: self.url.unwrap_or_else(|| defaults.url.clone()) },
            },
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// A notification as handed to the host's tray.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Notification {
    pub title: String,
    pub options: NotificationOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
    pub badge: String,
    /// Notifications sharing a tag replace one another.
    pub tag: String,
    pub data: NotificationData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NotificationData {
    /// Where activating the notification navigates.
    #[serde(default)]
    pub url: String,
}

impl Notification {
    /// Target to open on activation, falling back to the default when the
    /// notification carries none.
    pub fn target<'a>(&'a self, defaults: &'a NotificationDefaults) -> &'a str {
        if self.options.data.url.is_empty() { &defaults.url } else { &self.options.data.url }
    }
}
