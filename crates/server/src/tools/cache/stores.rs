//! cache_stores tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_core::{CacheDb, StoreSummary};

use crate::tools::json_result;

/// Output from the cache_stores tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStoresOutput {
    /// Stores in creation order.
    pub stores: Vec<StoreSummary>,
}

/// Implementation of the cache_stores tool.
pub async fn stores_impl(cache: &CacheDb) -> Result<CallToolResult, McpError> {
    let stores = cache.store_summaries().await?;
    json_result(&CacheStoresOutput { stores })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{output, worker};

    #[tokio::test]
    async fn test_stores_empty() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let out = output(&stores_impl(&cache).await.unwrap());
        assert_eq!(out["stores"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_stores_after_install() {
        let (worker, _host) = worker(&[("/", "home")]).await;
        worker.install().await.unwrap();

        let out = output(&stores_impl(worker.storage()).await.unwrap());

        assert_eq!(out["stores"][0]["name"], "blog-pwa-v1");
        assert_eq!(out["stores"][0]["entries"], 1);
    }
}
