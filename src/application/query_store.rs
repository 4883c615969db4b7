// Store trait for analytical query execution
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait QueryStore: Send + Sync {
    /// Run one query text remotely and return the raw JSON payload.
    async fn fetch(&self, query: &str) -> anyhow::Result<Value>;
}
