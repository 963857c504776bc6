//! Core of the shellcache offline worker.
//!
//! This crate provides:
//! - Request classification and the cache/network strategy engine
//! - Named, versioned response stores backed by SQLite
//! - Install/activate lifecycle and the event dispatcher
//! - Push, notification and background-sync extension points
//! - Unified error types and layered configuration

pub mod cache;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod hooks;
pub mod lifecycle;
pub mod request;
pub mod response;
pub mod strategy;
pub mod worker;

#[cfg(test)]
mod testing;

pub use cache::{Cache, CacheDb, CacheStore, StoreSummary};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use fetcher::NetworkFetcher;
pub use lifecycle::WorkerState;
pub use request::{Classification, Destination, FetchRequest, RequestDescriptor, RequestKey};
pub use response::{Response, ResponseType, StoredResponse};
pub use strategy::{DocumentPolicy, FallbackMode, FetchOutcome, StrategyDecision};
pub use worker::Worker;
