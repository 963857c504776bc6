//! Named, versioned response stores.
//!
//! The engine only talks to the `CacheStore` trait. `CacheDb` implements it on
//! SQLite via tokio-rusqlite:
//!
//! - One row per named store; entries cascade on delete
//! - Entry keys are SHA-256 of method and URL
//! - WAL mode for concurrent readers and writers
//! - Atomic single-key upserts and atomic batches

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod stores;

use std::sync::Arc;

use async_trait::async_trait;

pub use crate::Error;
use crate::request::RequestKey;
use crate::response::StoredResponse;

pub use connection::CacheDb;
pub use stores::StoreSummary;

/// Storage seam for named response stores.
///
/// `get` and `put` on a store that was never opened behave as if it had been
/// opened first.
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    async fn open(&self, name: &str) -> Result<(), Error>;

    async fn get(&self, name: &str, key: &RequestKey) -> Result<Option<StoredResponse>, Error>;

    async fn put(&self, name: &str, key: &RequestKey, entry: StoredResponse) -> Result<(), Error>;

    /// All-or-nothing write of several entries.
    async fn put_all(&self, name: &str, entries: Vec<(RequestKey, StoredResponse)>) -> Result<(), Error>;

    /// Returns false if the store did not exist.
    async fn delete(&self, name: &str) -> Result<bool, Error>;

    async fn list_names(&self) -> Result<Vec<String>, Error>;

    async fn keys(&self, name: &str) -> Result<Vec<RequestKey>, Error>;
}

#[async_trait]
impl CacheStore for CacheDb {
    async fn open(&self, name: &str) -> Result<(), Error> {
        self.open_store(name).await
    }

    async fn get(&self, name: &str, key: &RequestKey) -> Result<Option<StoredResponse>, Error> {
        self.get_entry(name, key).await
    }

    async fn put(&self, name: &str, key: &RequestKey, entry: StoredResponse) -> Result<(), Error> {
        self.put_entry(name, key, entry).await
    }

    async fn put_all(&self, name: &str, entries: Vec<(RequestKey, StoredResponse)>) -> Result<(), Error> {
        self.put_entries(name, entries).await
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        self.delete_store(name).await
    }

    async fn list_names(&self) -> Result<Vec<String>, Error> {
        self.store_names().await
    }

    async fn keys(&self, name: &str) -> Result<Vec<RequestKey>, Error> {
        self.entry_keys(name).await
    }
}

/// A backend bound to one store name.
pub struct Cache<S: CacheStore> {
    storage: Arc<S>,
    name: String,
}

impl<S: CacheStore> Clone for Cache<S> {
    fn clone(&self) -> Self {
        Self { storage: Arc::clone(&self.storage), name: self.name.clone() }
    }
}

impl<S: CacheStore> Cache<S> {
    pub fn new(storage: Arc<S>, name: impl Into<String>) -> Self {
        Self { storage, name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn get(&self, key: &RequestKey) -> Result<Option<StoredResponse>, Error> {
        self.storage.get(&self.name, key).await
    }

    pub async fn put(&self, key: &RequestKey, entry: StoredResponse) -> Result<(), Error> {
        self.storage.put(&self.name, key, entry).await
    }

    pub async fn put_all(&self, entries: Vec<(RequestKey, StoredResponse)>) -> Result<(), Error> {
        self.storage.put_all(&self.name, entries).await
    }

    pub async fn keys(&self) -> Result<Vec<RequestKey>, Error> {
        self.storage.keys(&self.name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Response;

    #[tokio::test]
    async fn test_cache_handle_binds_name() {
        let db = Arc::new(CacheDb::open_in_memory().await.unwrap());
        let v1 = Cache::new(Arc::clone(&db), "blog-pwa-v1");
        let key = RequestKey { method: "GET".into(), url: "https://example.com/".into() };

        v1.put(&key, Response::ok("home").into()).await.unwrap();

        assert!(v1.get(&key).await.unwrap().is_some());
        assert!(db.get("blog-pwa-v2", &key).await.unwrap().is_none());
        assert_eq!(db.list_names().await.unwrap(), vec!["blog-pwa-v1".to_string()]);
    }
}
