//! Notification host for a headless deployment.
//!
//! There is no screen to draw on, so notifications and window openings are
//! logged and kept in memory for inspection.

use async_trait::async_trait;
use tokio::sync::Mutex;

use shellcache_core::Error;
use shellcache_core::hooks::{Notification, NotificationHost};

#[derive(Debug, Default)]
pub struct LoggingHost {
    shown: Mutex<Vec<Notification>>,
    opened: Mutex<Vec<String>>,
}

impl LoggingHost {
    pub async fn shown(&self) -> Vec<Notification> {
        self.shown.lock().await.clone()
    }

    pub async fn opened(&self) -> Vec<String> {
        self.opened.lock().await.clone()
    }
}

#[async_trait]
impl NotificationHost for LoggingHost {
    async fn show(&self, notification: Notification) -> Result<(), Error> {
        tracing::info!(
            title = %notification.title,
            body = %notification.body,
            tag = notification.tag.as_deref().unwrap_or(""),
            "show notification"
        );
        self.shown.lock().await.push(notification);
        Ok(())
    }

    async fn close(&self, notification: &Notification) -> Result<(), Error> {
        tracing::debug!(title = %notification.title, "close notification");
        Ok(())
    }

    async fn open_window(&self, url: &str) -> Result<(), Error> {
        let mut opened = self.opened.lock().await;
        if opened.iter().any(|u| u == url) {
            tracing::info!(url, "focus existing window");
        } else {
            tracing::info!(url, "open window");
            opened.push(url.to_string());
        }
        Ok(())
    }
}
