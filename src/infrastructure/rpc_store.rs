// Remote store over a PostgREST-style RPC endpoint
use crate::application::query_store::QueryStore;
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("request to store failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("store returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("store returned an undecodable body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct RpcQueryStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    function: String,
}

#[derive(Serialize)]
struct RpcParams<'a> {
    query: &'a str,
}

impl RpcQueryStore {
    pub fn new(
        base_url: String,
        api_key: String,
        function: String,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            function,
        })
    }

    fn build_rpc_url(&self) -> String {
        format!(
            "{}/rest/v1/rpc/{}",
            self.base_url,
            urlencoding::encode(&self.function)
        )
    }

    async fn call(&self, query: &str) -> Result<Value, StoreError> {
        let response = self
            .client
            .post(self.build_rpc_url())
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
            .json(&RpcParams { query })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }

        // An empty body decodes as no payload rather than an error
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl QueryStore for RpcQueryStore {
    async fn fetch(&self, query: &str) -> Result<Value> {
        tracing::debug!("Executing store query via {}", self.function);
        Ok(self.call(query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_rpc_url() {
        let store = RpcQueryStore::new(
            "https://example.supabase.co/".to_string(),
            "key".to_string(),
            "ejecutar sql".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(
            store.build_rpc_url(),
            "https://example.supabase.co/rest/v1/rpc/ejecutar%20sql"
        );
    }
}
