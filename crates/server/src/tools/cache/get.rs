//! cache_get tool implementation.
//!
//! Reads a stored response by request URL without touching the network.

use std::collections::BTreeMap;

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_core::{CacheStore, Error, FetchRequest, NetworkFetcher, ResponseType, StoredResponse, Worker};

use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Request URL, absolute or relative to the origin.
    pub url: String,

    /// Request method (default: GET).
    #[serde(default)]
    pub method: Option<String>,

    /// Store to read; defaults to the current version's store.
    #[serde(default)]
    pub store: Option<String>,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub store: String,
    pub key: String,
    pub status: u16,
    pub status_text: String,
    pub response_type: ResponseType,
    pub url: Option<String>,
    pub headers: BTreeMap<String, String>,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
    pub stored_at: String,
}

impl CacheGetOutput {
    fn new(store: String, key: String, entry: StoredResponse) -> Self {
        Self {
            store,
            key,
            status: entry.status,
            status_text: entry.status_text,
            response_type: entry.response_type,
            url: entry.url,
            headers: entry.headers,
            body: String::from_utf8_lossy(&entry.body).into_owned(),
            stored_at: entry.stored_at,
        }
    }
}

/// Implementation of the cache_get tool.
pub async fn get_impl<S: CacheStore, F: NetworkFetcher>(
    worker: &Worker<S, F>, params: CacheGetParams,
) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let mut request = FetchRequest::get(params.url);
    if let Some(method) = params.method {
        request = request.with_method(method);
    }
    let key = worker.classify(&request)?.key();
    let store = params.store.unwrap_or_else(|| worker.current_store().to_string());

    let entry = worker
        .storage()
        .get(&store, &key)
        .await?
        .ok_or_else(|| Error::StoreMiss(format!("{key} in {store}")))?;

    json_result(&CacheGetOutput::new(store, key.to_string(), entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{output, worker};

    fn params(url: &str) -> CacheGetParams {
        CacheGetParams { url: url.into(), method: None, store: None }
    }

    #[tokio::test]
    async fn test_get_impl_missing() {
        let (worker, _host) = worker(&[]).await;
        let err = get_impl(&worker, params("/style.css")).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }

    #[tokio::test]
    async fn test_get_impl_found() {
        let (worker, _host) = worker(&[("/", "<h1>home</h1>")]).await;
        worker.install().await.unwrap();

        let out = output(&get_impl(&worker, params("/")).await.unwrap());

        assert_eq!(out["store"], "blog-pwa-v1");
        assert_eq!(out["key"], "GET https://blog.example.com/");
        assert_eq!(out["status"], 200);
        assert_eq!(out["body"], "<h1>home</h1>");
    }

    #[tokio::test]
    async fn test_get_impl_other_store() {
        let (worker, _host) = worker(&[("/", "home")]).await;
        worker.install().await.unwrap();

        let result = get_impl(&worker, CacheGetParams { store: Some("blog-pwa-v0".into()), ..params("/") }).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_impl_empty_url() {
        let (worker, _host) = worker(&[]).await;
        let err = get_impl(&worker, params("  ")).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }
}
