//! Install and activate transitions.
//!
//! ```text
//! Uninstalled -> Installing -> Installed -> Activating -> Active
//!      ^             |                          |
//!      +--- failed --+           Installed <-- failed
//! ```
//!
//! Install fetches the whole app shell before writing anything and writes it in
//! one batch, so a single failed URL leaves the store untouched. Activate deletes
//! every store except the current one and only then starts controlling clients.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::future::try_join_all;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use url::Url;

use crate::Error;
use crate::cache::CacheStore;
use crate::fetcher::NetworkFetcher;
use crate::request::{RequestDescriptor, RequestKey};
use crate::response::StoredResponse;

/// Lifecycle state of this worker version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Uninstalled,
    Installing,
    /// Installed and waiting to activate.
    Installed,
    Activating,
    Active,
}

impl WorkerState {
    pub fn can_intercept(&self) -> bool {
        matches!(self, WorkerState::Active)
    }
}

/// Result of a successful install.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InstallReport {
    pub store: String,
    pub cached: Vec<String>,
}

/// Result of a successful activation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ActivateReport {
    pub store: String,
    pub deleted: Vec<String>,
}

pub struct LifecycleController<S: CacheStore, F: NetworkFetcher> {
    storage: Arc<S>,
    fetcher: Arc<F>,
    current: String,
    shell: Vec<Url>,
    state: RwLock<WorkerState>,
    claimed: AtomicBool,
}

impl<S: CacheStore, F: NetworkFetcher> LifecycleController<S, F> {
    pub fn new(storage: Arc<S>, fetcher: Arc<F>, current: impl Into<String>, shell: Vec<Url>) -> Self {
        Self {
            storage,
            fetcher,
            current: current.into(),
            shell,
            state: RwLock::new(WorkerState::Uninstalled),
            claimed: AtomicBool::new(false),
        }
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    pub fn current_store(&self) -> &str {
        &self.current
    }

    /// Whether activation has taken control of already-open clients.
    pub fn clients_claimed(&self) -> bool {
        self.claimed.load(Ordering::SeqCst)
    }

    async fn enter(&self, allowed: &[WorkerState], next: WorkerState) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if !allowed.contains(&*state) {
            return Err(Error::InvalidState(format!("cannot move from {:?} to {next:?}", *state)));
        }
        *state = next;
        Ok(())
    }

    async fn set(&self, next: WorkerState) {
        *self.state.write().await = next;
    }

    /// Pre-populate the current store with the app shell.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless uninstalled; `InstallFailed` if any shell URL fails
    /// to fetch, answers with a status other than 200, or the batch write fails.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        self.enter(&[WorkerState::Uninstalled], WorkerState::Installing).await?;
        tracing::info!(store = %self.current, urls = self.shell.len(), "installing app shell");

        match self.populate().await {
            Ok(cached) => {
                self.set(WorkerState::Installed).await;
                tracing::info!(store = %self.current, "install complete; waiting to activate");
                Ok(InstallReport { store: self.current.clone(), cached })
            }
            Err(e) => {
                self.set(WorkerState::Uninstalled).await;
                tracing::error!(store = %self.current, error = %e, "install failed");
                Err(e)
            }
        }
    }

    async fn populate(&self) -> Result<Vec<String>, Error> {
        let fetches = self.shell.iter().cloned().map(|url| async move {
            let descriptor = RequestDescriptor::shell(url);
            let response = self
                .fetcher
                .fetch(&descriptor)
                .await
                .map_err(|e| Error::InstallFailed(format!("{}: {e}", descriptor.url())))?;
            if response.status() != 200 {
                return Err(Error::InstallFailed(format!("{}: status {}", descriptor.url(), response.status())));
            }
            Ok::<_, Error>((descriptor.key(), StoredResponse::from(response)))
        });

        let entries: Vec<(RequestKey, StoredResponse)> = try_join_all(fetches).await?;
        let cached = entries.iter().map(|(key, _)| key.url.clone()).collect();

        self.storage
            .put_all(&self.current, entries)
            .await
            .map_err(|e| Error::InstallFailed(format!("writing {}: {e}", self.current)))?;

        Ok(cached)
    }

    /// Delete every stale store and take control of all clients.
    ///
    /// Re-activating an active worker repeats the cleanup, which finds nothing.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless installed or already active; store errors otherwise.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        let previous = self.state().await;
        self.enter(&[WorkerState::Installed, WorkerState::Active], WorkerState::Activating)
            .await?;

        match self.remove_stale().await {
            Ok(deleted) => {
                self.set(WorkerState::Active).await;
                self.claimed.store(true, Ordering::SeqCst);
                tracing::info!(store = %self.current, deleted = deleted.len(), "activated; clients claimed");
                Ok(ActivateReport { store: self.current.clone(), deleted })
            }
            Err(e) => {
                self.set(previous).await;
                tracing::error!(store = %self.current, error = %e, "activation failed");
                Err(e)
            }
        }
    }

    async fn remove_stale(&self) -> Result<Vec<String>, Error> {
        self.storage.open(&self.current).await?;

        let mut deleted = Vec::new();
        for name in self.storage.list_names().await? {
            if name == self.current {
                continue;
            }
            if self.storage.delete(&name).await? {
                tracing::debug!(store = %name, "deleted stale store");
                deleted.push(name);
            }
        }
        Ok(deleted)
    }
}
