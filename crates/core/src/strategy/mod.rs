//! Cache strategy engine.
//!
//! Maps each classified request to a [`StrategyDecision`] and executes it.
//!
//! | Classification | Policy | Hit | Miss / network ok | Network failure |
//! |---|---|---|---|---|
//! | pass-through | none | n/a | network verbatim | error propagates |
//! | static asset | cache-first | store | network, write-back | error propagates |
//! | image | cache-first | store | network, write-back | placeholder |
//! | document | cache-first | store | network, write-back | offline fallback entry |
//! | document | network-first | n/a | network, write-back | exact entry, then offline fallback entry |
//!
//! Under [`FallbackMode::Uniform`] the cache-first failure column is replaced by
//! "exact entry, else the error". Write-backs only happen for status 200
//! same-origin responses and always persist a clone taken before the caller
//! can read the body.

pub mod placeholder;

use std::fmt;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio_util::task::TaskTracker;
use url::Url;

use crate::Error;
use crate::cache::{Cache, CacheStore};
use crate::config::{AppConfig, ConfigError};
use crate::fetcher::NetworkFetcher;
use crate::request::{Classification, RequestDescriptor, RequestKey};
use crate::response::Response;

pub use placeholder::{PlaceholderSource, SvgPlaceholder};

/// Policy for document requests. Fixed per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentPolicy {
    CacheFirst,
    #[default]
    NetworkFirst,
}

/// How cache-first network failures are substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackMode {
    /// Documents get the offline page, images a placeholder, everything else the error.
    #[default]
    Classified,
    /// Every request gets its own store entry if one appeared, else the error.
    Uniform,
}

/// What the engine did (or will do) for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyDecision {
    ServeFromStore,
    FetchNetworkThenStore,
    FetchNetworkWithStoreFallback,
    ServeOfflineFallback,
    ServePlaceholder,
    PassThrough,
}

impl fmt::Display for StrategyDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyDecision::ServeFromStore => "serve-from-store",
            StrategyDecision::FetchNetworkThenStore => "fetch-network-then-store",
            StrategyDecision::FetchNetworkWithStoreFallback => "fetch-network-with-store-fallback",
            StrategyDecision::ServeOfflineFallback => "serve-offline-fallback",
            StrategyDecision::ServePlaceholder => "serve-placeholder",
            StrategyDecision::PassThrough => "pass-through",
        };
        f.write_str(name)
    }
}

/// Engine settings derived from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    pub document_policy: DocumentPolicy,
    pub fallback_mode: FallbackMode,
    pub offline_fallback: Url,
    pub background_write_back: bool,
}

impl StrategyConfig {
    pub fn from_app(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            document_policy: config.document_policy,
            fallback_mode: config.fallback_mode,
            offline_fallback: config.resolve(&config.offline_fallback_url)?,
            background_write_back: config.background_write_back,
        })
    }
}

/// Result of handling one request.
#[derive(Debug)]
pub struct FetchOutcome {
    pub response: Response,
    pub decision: StrategyDecision,
    /// A write-back was issued for this response.
    pub write_back: bool,
}

enum Plan {
    PassThrough,
    Serve(Response),
    FetchThenStore,
    FetchWithFallback,
}

/// Applies the configured policies against one store.
pub struct StrategyEngine<S: CacheStore, F: NetworkFetcher> {
    cache: Cache<S>,
    fetcher: Arc<F>,
    config: StrategyConfig,
    placeholder: Arc<dyn PlaceholderSource>,
    write_backs: TaskTracker,
    /// Serializes `settle` so one caller's reopen cannot strand another's wait.
    settling: Mutex<()>,
}

impl<S: CacheStore, F: NetworkFetcher> StrategyEngine<S, F> {
    pub fn new(cache: Cache<S>, fetcher: Arc<F>, config: StrategyConfig) -> Self {
        Self {
            cache,
            fetcher,
            config,
            placeholder: Arc::new(SvgPlaceholder::default()),
            write_backs: TaskTracker::new(),
            settling: Mutex::new(()),
        }
    }

    pub fn with_placeholder(mut self, placeholder: Arc<dyn PlaceholderSource>) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn cache(&self) -> &Cache<S> {
        &self.cache
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Decide how a request would be served right now.
    ///
    /// Reads the store for cache-first classifications; never touches the network.
    pub async fn decide(&self, descriptor: &RequestDescriptor) -> StrategyDecision {
        match self.plan(descriptor).await {
            Plan::PassThrough => StrategyDecision::PassThrough,
            Plan::Serve(_) => StrategyDecision::ServeFromStore,
            Plan::FetchThenStore => StrategyDecision::FetchNetworkThenStore,
            Plan::FetchWithFallback => StrategyDecision::FetchNetworkWithStoreFallback,
        }
    }

    /// Produce the response for a request, updating the store as a side effect.
    ///
    /// # Errors
    ///
    /// Returns the network error when no substitute applies: pass-through
    /// requests, static assets, and documents with no offline entry.
    pub async fn handle(&self, descriptor: &RequestDescriptor) -> Result<FetchOutcome, Error> {
        let outcome = match self.plan(descriptor).await {
            Plan::PassThrough => {
                let response = self.fetcher.fetch(descriptor).await?;
                FetchOutcome { response, decision: StrategyDecision::PassThrough, write_back: false }
            }
            Plan::Serve(response) => {
                FetchOutcome { response, decision: StrategyDecision::ServeFromStore, write_back: false }
            }
            Plan::FetchThenStore => match self.fetcher.fetch(descriptor).await {
                Ok(response) => self.respond_and_store(descriptor, response, StrategyDecision::FetchNetworkThenStore).await,
                Err(err) => self.recover_cache_first(descriptor, err).await?,
            },
            Plan::FetchWithFallback => match self.fetcher.fetch(descriptor).await {
                Ok(response) => {
                    self.respond_and_store(descriptor, response, StrategyDecision::FetchNetworkWithStoreFallback)
                        .await
                }
                Err(err) => self.recover_network_first(descriptor, err).await?,
            },
        };

        tracing::debug!(
            url = %descriptor.url(),
            classification = %descriptor.classification(),
            decision = %outcome.decision,
            status = outcome.response.status(),
            write_back = outcome.write_back,
            "handled fetch"
        );

        Ok(outcome)
    }

    /// Wait for every background write-back issued so far.
    ///
    /// Concurrent callers settle one after another.
    pub async fn settle(&self) {
        let _guard = self.settling.lock().await;
        self.write_backs.close();
        self.write_backs.wait().await;
        self.write_backs.reopen();
    }

    /// Write-backs still running.
    pub fn pending_write_backs(&self) -> usize {
        self.write_backs.len()
    }

    async fn plan(&self, descriptor: &RequestDescriptor) -> Plan {
        match descriptor.classification() {
            Classification::PassThrough => Plan::PassThrough,
            Classification::Document if self.config.document_policy == DocumentPolicy::NetworkFirst => {
                Plan::FetchWithFallback
            }
            Classification::Document | Classification::Image | Classification::StaticAsset => {
                match self.lookup(&descriptor.key()).await {
                    Some(response) => Plan::Serve(response),
                    None => Plan::FetchThenStore,
                }
            }
        }
    }

    /// Store read; a failing read counts as a miss.
    async fn lookup(&self, key: &RequestKey) -> Option<Response> {
        match self.cache.get(key).await {
            Ok(entry) => entry.map(Response::from),
            Err(e) => {
                tracing::warn!(store = self.cache.name(), key = %key, error = %e, "store read failed; treating as miss");
                None
            }
        }
    }

    async fn respond_and_store(
        &self, descriptor: &RequestDescriptor, response: Response, decision: StrategyDecision,
    ) -> FetchOutcome {
        let write_back = response.is_cacheable();
        if write_back {
            self.write_back(descriptor.key(), response.clone()).await;
        } else {
            tracing::debug!(
                url = %descriptor.url(),
                status = response.status(),
                response_type = response.response_type().as_str(),
                "response not stored"
            );
        }
        FetchOutcome { response, decision, write_back }
    }

    async fn write_back(&self, key: RequestKey, copy: Response) {
        let cache = self.cache.clone();
        let task = async move {
            if let Err(e) = cache.put(&key, copy.into()).await {
                let err = Error::StoreWriteFailure(e.to_string());
                tracing::warn!(store = cache.name(), key = %key, error = %err, "write-back dropped");
            }
        };

        if self.config.background_write_back {
            self.write_backs.spawn(task);
        } else {
            task.await;
        }
    }

    async fn recover_cache_first(&self, descriptor: &RequestDescriptor, err: Error) -> Result<FetchOutcome, Error> {
        tracing::debug!(url = %descriptor.url(), error = %err, "network failed for cache-first request");

        if self.config.fallback_mode == FallbackMode::Uniform {
            return match self.lookup(&descriptor.key()).await {
                Some(response) => Ok(served(response, StrategyDecision::ServeFromStore)),
                None => Err(err),
            };
        }

        match descriptor.classification() {
            Classification::Document => self.offline_fallback(err).await,
            Classification::Image => {
                let response = self.placeholder.placeholder(descriptor);
                Ok(served(response, StrategyDecision::ServePlaceholder))
            }
            Classification::StaticAsset | Classification::PassThrough => Err(err),
        }
    }

    async fn recover_network_first(&self, descriptor: &RequestDescriptor, err: Error) -> Result<FetchOutcome, Error> {
        tracing::debug!(url = %descriptor.url(), error = %err, "network failed for network-first request");

        if let Some(response) = self.lookup(&descriptor.key()).await {
            return Ok(served(response, StrategyDecision::ServeFromStore));
        }
        self.offline_fallback(err).await
    }

    async fn offline_fallback(&self, err: Error) -> Result<FetchOutcome, Error> {
        match self.lookup(&RequestKey::get(&self.config.offline_fallback)).await {
            Some(response) => Ok(served(response, StrategyDecision::ServeOfflineFallback)),
            None => {
                tracing::info!(fallback = %self.config.offline_fallback, "no offline fallback stored");
                Err(err)
            }
        }
    }
}

fn served(response: Response, decision: StrategyDecision) -> FetchOutcome {
    FetchOutcome { response, decision, write_back: false }
}
