// Query executor - one remote round trip, failures become empty tables
use crate::application::query_store::QueryStore;
use crate::domain::tabular::{NamedQuery, Row, Scalar, TabularResult};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct QueryExecutor {
    store: Arc<dyn QueryStore>,
    timeout: Duration,
}

impl QueryExecutor {
    pub fn new(store: Arc<dyn QueryStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Execute a query. Transport errors, remote errors, timeouts and
    /// malformed payloads all yield an empty table.
    pub async fn execute(&self, query: &NamedQuery) -> TabularResult {
        let payload = match tokio::time::timeout(self.timeout, self.store.fetch(&query.text)).await
        {
            Ok(Ok(payload)) => payload,
            Ok(Err(e)) => {
                tracing::warn!("Query {} failed: {:#}", query.purpose, e);
                return TabularResult::empty();
            }
            Err(_) => {
                tracing::warn!(
                    "Query {} timed out after {}s",
                    query.purpose,
                    self.timeout.as_secs_f64()
                );
                return TabularResult::empty();
            }
        };

        match decode_payload(&payload) {
            Some(result) => {
                tracing::debug!("Query {} returned {} rows", query.purpose, result.len());
                result
            }
            None => {
                tracing::warn!("Query {} returned a non-list payload", query.purpose);
                TabularResult::empty()
            }
        }
    }
}

/// Decode an RPC payload into rows.
///
/// Accepts either the wrapped form `[{"data": [...]}]` or a bare array of
/// row objects. Returns `None` when the payload is not list-shaped.
pub fn decode_payload(payload: &Value) -> Option<TabularResult> {
    let items = payload.as_array()?;

    let rows = match items.first() {
        None => return Some(TabularResult::empty()),
        Some(Value::Object(first)) if first.contains_key("data") => match &first["data"] {
            Value::Array(rows) => rows,
            Value::Null => return Some(TabularResult::empty()),
            _ => return None,
        },
        Some(_) => items,
    };

    let decoded = rows
        .iter()
        .filter_map(|item| match item {
            Value::Object(fields) => Some(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Scalar::from_json(v)))
                    .collect::<Row>(),
            ),
            other => {
                tracing::debug!("Skipping non-object row: {}", other);
                None
            }
        })
        .collect();

    Some(TabularResult::new(decoded))
}
