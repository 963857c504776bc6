//! sw_install, sw_activate and sw_status tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_core::{CacheStore, NetworkFetcher, Worker, WorkerState};

use super::json_result;

/// Output from the sw_status tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StatusOutput {
    pub state: WorkerState,
    /// Store owned by this worker version.
    pub store: String,
    pub clients_claimed: bool,
}

pub async fn install_impl<S: CacheStore, F: NetworkFetcher>(worker: &Worker<S, F>) -> Result<CallToolResult, McpError> {
    let report = worker.install().await?;
    json_result(&report)
}

pub async fn activate_impl<S: CacheStore, F: NetworkFetcher>(worker: &Worker<S, F>) -> Result<CallToolResult, McpError> {
    let report = worker.activate().await?;
    json_result(&report)
}

pub async fn status_impl<S: CacheStore, F: NetworkFetcher>(worker: &Worker<S, F>) -> Result<CallToolResult, McpError> {
    let output = StatusOutput {
        state: worker.state().await,
        store: worker.current_store().to_string(),
        clients_claimed: worker.clients_claimed(),
    };
    json_result(&output)
}
