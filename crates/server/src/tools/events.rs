//! sw_sync, sw_push and sw_notification_click tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_core::hooks::NotificationClick;
use shellcache_core::{CacheStore, NetworkFetcher, Worker};

use super::json_result;

/// Parameters for the sw_sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SyncParams {
    /// Tag the sync was registered under.
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SyncOutput {
    pub tag: String,
    /// False when the tag is not the configured one.
    pub ran: bool,
}

/// Parameters for the sw_push tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PushParams {
    /// Raw push message data: a JSON object or plain text. Omit for an empty push.
    #[serde(default)]
    pub data: Option<String>,
}

pub async fn sync_impl<S: CacheStore, F: NetworkFetcher>(
    worker: &Worker<S, F>, params: SyncParams,
) -> Result<CallToolResult, McpError> {
    let ran = worker.sync(&params.tag).await?;
    json_result(&SyncOutput { tag: params.tag, ran })
}

pub async fn push_impl<S: CacheStore, F: NetworkFetcher>(
    worker: &Worker<S, F>, params: PushParams,
) -> Result<CallToolResult, McpError> {
    let notification = worker.push(params.data.as_deref().map(str::as_bytes)).await?;
    json_result(&notification)
}

pub async fn click_impl<S: CacheStore, F: NetworkFetcher>(
    worker: &Worker<S, F>, click: NotificationClick,
) -> Result<CallToolResult, McpError> {
    let outcome = worker.notification_click(click).await?;
    json_result(&outcome)
}
