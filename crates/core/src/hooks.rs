//! Push, notification-click and background-sync extension points.
//!
//! The worker never displays anything itself: notifications go to a
//! [`NotificationHost`], sync work to a [`SyncTask`].

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::Error;

/// Action id that opens the notification's target URL.
pub const ACTION_OPEN: &str = "open";
/// Action id that only dismisses the notification.
pub const ACTION_CLOSE: &str = "close";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// Everything the host needs to display a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: Option<String>,
    pub badge: Option<String>,
    pub tag: Option<String>,
    pub actions: Vec<NotificationAction>,
    /// Opaque payload; `url` holds the click target.
    pub data: Value,
}

impl Notification {
    pub fn target_url(&self) -> Option<&str> {
        self.data.get("url").and_then(Value::as_str)
    }
}

/// Push message body. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    pub icon: Option<String>,
    pub badge: Option<String>,
    pub tag: Option<String>,
    pub url: Option<String>,
}

impl PushPayload {
    /// Parse a push message; anything that is not a JSON object becomes the body text.
    pub fn parse(data: Option<&[u8]>) -> Self {
        let Some(bytes) = data.filter(|b| !b.is_empty()) else {
            return Self::default();
        };
        match serde_json::from_slice::<PushPayload>(bytes) {
            Ok(payload) => payload,
            Err(_) => Self { body: Some(String::from_utf8_lossy(bytes).into_owned()), ..Default::default() },
        }
    }

    pub fn into_notification(self, defaults: &NotificationDefaults) -> Notification {
        let url = self.url.unwrap_or_else(|| "/".into());
        Notification {
            title: self.title.unwrap_or_else(|| defaults.title.clone()),
            body: self.body.unwrap_or_else(|| defaults.body.clone()),
            icon: self.icon.or_else(|| defaults.icon.clone()),
            badge: self.badge.or_else(|| defaults.badge.clone()),
            tag: self.tag.or_else(|| defaults.tag.clone()),
            actions: vec![
                NotificationAction { action: ACTION_OPEN.into(), title: "Read now".into() },
                NotificationAction { action: ACTION_CLOSE.into(), title: "Dismiss".into() },
            ],
            data: json!({ "url": url }),
        }
    }
}

/// Fallback values for push messages that omit fields.
#[derive(Debug, Clone)]
pub struct NotificationDefaults {
    pub title: String,
    pub body: String,
    pub icon: Option<String>,
    pub badge: Option<String>,
    pub tag: Option<String>,
}

impl Default for NotificationDefaults {
    fn default() -> Self {
        Self {
            title: "New post".into(),
            body: "A new article has been published.".into(),
            icon: Some("/icons/icon-192.png".into()),
            badge: Some("/icons/badge-72.png".into()),
            tag: Some("new-post".into()),
        }
    }
}

/// A click reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NotificationClick {
    /// Chosen action id, or None for a click on the notification body.
    pub action: Option<String>,
    pub notification: Notification,
}

/// What a click led to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "url")]
pub enum ClickOutcome {
    OpenedWindow(String),
    Dismissed,
}

/// Displays notifications and opens windows on the worker's behalf.
#[async_trait]
pub trait NotificationHost: Send + Sync + 'static {
    async fn show(&self, notification: Notification) -> Result<(), Error>;

    async fn close(&self, notification: &Notification) -> Result<(), Error>;

    /// Focus a client already showing `url`, or open a new window.
    async fn open_window(&self, url: &str) -> Result<(), Error>;
}

/// Work triggered by a background-sync event.
#[async_trait]
pub trait SyncTask: Send + Sync + 'static {
    async fn run(&self, tag: &str) -> Result<(), Error>;
}

/// Sync task that completes immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSync;

#[async_trait]
impl SyncTask for NoopSync {
    async fn run(&self, tag: &str) -> Result<(), Error> {
        tracing::debug!(tag, "background sync: nothing to do");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_payload() {
        let payload = PushPayload::parse(Some(br#"{"title":"Hello","url":"/2024/01/post.html"}"#.as_slice()));
        assert_eq!(payload.title.as_deref(), Some("Hello"));
        assert_eq!(payload.url.as_deref(), Some("/2024/01/post.html"));
    }

    #[test]
    fn test_parse_plain_text_payload() {
        let payload = PushPayload::parse(Some(b"fresh content".as_slice()));
        assert_eq!(payload.body.as_deref(), Some("fresh content"));
        assert!(payload.title.is_none());
    }

    #[test]
    fn test_parse_missing_payload() {
        assert_eq!(PushPayload::parse(None), PushPayload::default());
        assert_eq!(PushPayload::parse(Some(b"".as_slice())), PushPayload::default());
    }

    #[test]
    fn test_notification_defaults_and_actions() {
        let notification = PushPayload::default().into_notification(&NotificationDefaults::default());
        assert_eq!(notification.title, "New post");
        assert_eq!(notification.target_url(), Some("/"));
        let ids: Vec<&str> = notification.actions.iter().map(|a| a.action.as_str()).collect();
        assert_eq!(ids, vec![ACTION_OPEN, ACTION_CLOSE]);
    }

    #[test]
    fn test_notification_keeps_payload_url() {
        let payload = PushPayload { url: Some("/about.html".into()), ..Default::default() };
        let notification = payload.into_notification(&NotificationDefaults::default());
        assert_eq!(notification.data, json!({"url": "/about.html"}));
    }
}
