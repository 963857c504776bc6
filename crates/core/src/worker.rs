//! Event dispatcher.
//!
//! One async method per host event. The host awaits each returned future the
//! way a browser waits on `event.waitUntil` / `event.respondWith`.

use std::sync::Arc;

use url::Url;

use crate::Error;
use crate::cache::{Cache, CacheStore};
use crate::config::{AppConfig, ConfigError};
use crate::fetcher::NetworkFetcher;
use crate::hooks::{
    ACTION_OPEN, ClickOutcome, NoopSync, Notification, NotificationClick, NotificationDefaults, NotificationHost,
    PushPayload, SyncTask,
};
use crate::lifecycle::{ActivateReport, InstallReport, LifecycleController, WorkerState};
use crate::request::{FetchRequest, RequestDescriptor, classify};
use crate::strategy::{FetchOutcome, PlaceholderSource, StrategyConfig, StrategyDecision, StrategyEngine};

pub struct Worker<S: CacheStore, F: NetworkFetcher> {
    config: AppConfig,
    origin: Url,
    storage: Arc<S>,
    fetcher: Arc<F>,
    lifecycle: LifecycleController<S, F>,
    engine: StrategyEngine<S, F>,
    notifications: Arc<dyn NotificationHost>,
    sync_task: Arc<dyn SyncTask>,
    notification_defaults: NotificationDefaults,
}

impl<S: CacheStore, F: NetworkFetcher> Worker<S, F> {
    /// Build a worker for the version named by `config`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the origin, shell URLs or fallback URL do not resolve.
    pub fn new(
        config: AppConfig, storage: Arc<S>, fetcher: Arc<F>, notifications: Arc<dyn NotificationHost>,
    ) -> Result<Self, ConfigError> {
        let origin = config.origin_url()?;
        let shell = config
            .shell_urls
            .iter()
            .map(|path| config.resolve(path))
            .collect::<Result<Vec<_>, _>>()?;
        let current = config.current_store_name();

        let lifecycle = LifecycleController::new(Arc::clone(&storage), Arc::clone(&fetcher), current.clone(), shell);
        let engine = StrategyEngine::new(
            Cache::new(Arc::clone(&storage), current),
            Arc::clone(&fetcher),
            StrategyConfig::from_app(&config)?,
        );

        Ok(Self {
            config,
            origin,
            storage,
            fetcher,
            lifecycle,
            engine,
            notifications,
            sync_task: Arc::new(NoopSync),
            notification_defaults: NotificationDefaults::default(),
        })
    }

    pub fn with_sync_task(mut self, sync_task: Arc<dyn SyncTask>) -> Self {
        self.sync_task = sync_task;
        self
    }

    pub fn with_placeholder(mut self, placeholder: Arc<dyn PlaceholderSource>) -> Self {
        self.engine = self.engine.with_placeholder(placeholder);
        self
    }

    pub fn with_notification_defaults(mut self, defaults: NotificationDefaults) -> Self {
        self.notification_defaults = defaults;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    pub fn current_store(&self) -> &str {
        self.lifecycle.current_store()
    }

    pub async fn state(&self) -> WorkerState {
        self.lifecycle.state().await
    }

    pub fn clients_claimed(&self) -> bool {
        self.lifecycle.clients_claimed()
    }

    /// Install event: pre-populate the app shell.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        self.lifecycle.install().await
    }

    /// Activate event: drop stale stores, then claim clients.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        self.lifecycle.activate().await
    }

    pub fn classify(&self, request: &FetchRequest) -> Result<RequestDescriptor, Error> {
        classify(request, &self.origin, &self.config.disallowed_schemes)
    }

    /// The decision the next `fetch` of this request would start from.
    pub async fn decide(&self, request: &FetchRequest) -> Result<StrategyDecision, Error> {
        let descriptor = self.classify(request)?;
        if !self.state().await.can_intercept() {
            return Ok(StrategyDecision::PassThrough);
        }
        Ok(self.engine.decide(&descriptor).await)
    }

    /// Fetch event.
    ///
    /// Until activation the worker controls no client, so requests go to the
    /// network untouched.
    pub async fn fetch(&self, request: &FetchRequest) -> Result<FetchOutcome, Error> {
        let descriptor = self.classify(request)?;

        if !self.state().await.can_intercept() {
            tracing::debug!(url = %descriptor.url(), "worker not active; request not intercepted");
            let response = self.fetcher.fetch(&descriptor).await?;
            return Ok(FetchOutcome { response, decision: StrategyDecision::PassThrough, write_back: false });
        }

        self.engine.handle(&descriptor).await
    }

    /// Sync event. Returns whether the tag matched and the task ran.
    pub async fn sync(&self, tag: &str) -> Result<bool, Error> {
        if tag != self.config.sync_tag {
            tracing::debug!(tag, expected = %self.config.sync_tag, "ignoring sync tag");
            return Ok(false);
        }
        self.sync_task.run(tag).await.map_err(hook_failed("sync task"))?;
        tracing::info!(tag, "background sync complete");
        Ok(true)
    }

    /// Push event: build and show a notification.
    pub async fn push(&self, data: Option<&[u8]>) -> Result<Notification, Error> {
        let notification = PushPayload::parse(data).into_notification(&self.notification_defaults);
        self.notifications.show(notification.clone()).await.map_err(hook_failed("show notification"))?;
        tracing::info!(title = %notification.title, "notification shown");
        Ok(notification)
    }

    /// Notification-click event.
    pub async fn notification_click(&self, click: NotificationClick) -> Result<ClickOutcome, Error> {
        self.notifications.close(&click.notification).await.map_err(hook_failed("close notification"))?;

        if click.action.as_deref() != Some(ACTION_OPEN) {
            return Ok(ClickOutcome::Dismissed);
        }

        let target = click.notification.target_url().unwrap_or("/");
        let url = self
            .origin
            .join(target)
            .map_err(|e| Error::InvalidUrl(format!("{target}: {e}")))?;
        self.notifications.open_window(url.as_str()).await.map_err(hook_failed("open window"))?;
        Ok(ClickOutcome::OpenedWindow(url.to_string()))
    }

    /// Wait for in-flight background write-backs.
    pub async fn settle(&self) {
        self.engine.settle().await;
    }
}

fn hook_failed(hook: &'static str) -> impl FnOnce(Error) -> Error {
    move |e| match e {
        Error::HookFailed(_) => e,
        other => Error::HookFailed(format!("{hook}: {other}")),
    }
}
