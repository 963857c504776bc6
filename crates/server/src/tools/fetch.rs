//! sw_fetch tool implementation.
//!
//! Runs one request through the worker and reports the response together with
//! the decision that produced it.

use std::collections::BTreeMap;

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_core::{CacheStore, FetchRequest, NetworkFetcher, ResponseType, StrategyDecision, Worker};

use super::json_result;

/// Output structure for sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchOutput {
    pub decision: StrategyDecision,
    pub status: u16,
    pub status_text: String,
    pub response_type: ResponseType,
    /// Final URL of the response, when known.
    pub url: Option<String>,
    pub headers: BTreeMap<String, String>,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
    /// Whether a copy was handed to the store.
    pub stored: bool,
}

pub async fn fetch_impl<S: CacheStore, F: NetworkFetcher>(
    worker: &Worker<S, F>, request: FetchRequest,
) -> Result<CallToolResult, McpError> {
    let outcome = worker.fetch(&request).await?;
    let response = outcome.response;

    let status = response.status();
    let status_text = response.status_text().to_string();
    let response_type = response.response_type();
    let url = response.url().map(str::to_string);
    let headers = response.headers().clone();
    let body = String::from_utf8_lossy(&response.bytes()).into_owned();

    json_result(&FetchOutput {
        decision: outcome.decision,
        status,
        status_text,
        response_type,
        url,
        headers,
        body,
        stored: outcome.write_back,
    })
}
