//! MCP tool implementations.
//!
//! Each `*_impl` is generic over the worker's store and fetcher so it can be
//! driven by an in-memory setup in tests.

pub mod cache;
pub mod events;
pub mod fetch;
pub mod lifecycle;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use shellcache_core::Error;

/// Serialize a tool output as pretty JSON text.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use rmcp::model::CallToolResult;
    use shellcache_core::fetcher::NetworkFetcher;
    use shellcache_core::request::RequestDescriptor;
    use shellcache_core::{AppConfig, CacheDb, Error, Response, Worker};

    use crate::notify::LoggingHost;

    pub const ORIGIN: &str = "https://blog.example.com";

    /// Fetcher serving fixed bodies by path; other paths fail.
    pub struct StaticFetcher {
        routes: HashMap<String, &'static str>,
    }

    #[async_trait]
    impl NetworkFetcher for StaticFetcher {
        async fn fetch(&self, request: &RequestDescriptor) -> Result<Response, Error> {
            self.routes
                .get(request.url().path())
                .map(|body| Response::ok(*body).with_url(request.url().as_str()))
                .ok_or_else(|| Error::NetworkFailure(format!("offline: {}", request.url())))
        }
    }

    pub async fn worker(routes: &[(&str, &'static str)]) -> (Worker<CacheDb, StaticFetcher>, Arc<LoggingHost>) {
        let db = Arc::new(CacheDb::open_in_memory().await.unwrap());
        let fetcher = StaticFetcher { routes: routes.iter().map(|(p, b)| (p.to_string(), *b)).collect() };
        let host = Arc::new(LoggingHost::default());
        let config = AppConfig { origin: ORIGIN.into(), ..Default::default() };
        let worker = Worker::new(config, db, Arc::new(fetcher), host.clone()).unwrap();
        (worker, host)
    }

    /// Parse the JSON text of a tool result.
    pub fn output(result: &CallToolResult) -> serde_json::Value {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }
}
