// Result cache - LRU memoization of query results keyed by exact query text
use crate::application::query_executor::QueryExecutor;
use crate::domain::tabular::{NamedQuery, TabularResult};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const DEFAULT_CAPACITY: NonZeroUsize = NonZeroUsize::new(128).unwrap();

struct CachedResult {
    result: Arc<TabularResult>,
    stored_at: Instant,
}

pub struct ResultCache {
    executor: QueryExecutor,
    entries: Mutex<LruCache<String, CachedResult>>,
    ttl: Option<Duration>,
}

impl ResultCache {
    /// `capacity` of zero falls back to the default of 128 keys.
    pub fn new(executor: QueryExecutor, capacity: usize, ttl: Option<Duration>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(DEFAULT_CAPACITY);
        Self {
            executor,
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Return the cached result for this exact query text, executing it on a
    /// miss. Empty results are cached like any other.
    pub async fn get_or_execute(&self, query: &NamedQuery) -> Arc<TabularResult> {
        if let Some(hit) = self.lookup(&query.text).await {
            tracing::debug!("Result cache hit for {}", query.purpose);
            return hit;
        }

        // Lock is released while the remote call is in flight.
        let result = Arc::new(self.executor.execute(query).await);

        let mut entries = self.entries.lock().await;
        if let Some((evicted, _)) = entries.push(
            query.text.clone(),
            CachedResult {
                result: result.clone(),
                stored_at: Instant::now(),
            },
        ) {
            if evicted != query.text {
                tracing::debug!("Result cache evicted least recently used entry");
            }
        }

        result
    }

    async fn lookup(&self, key: &str) -> Option<Arc<TabularResult>> {
        let mut entries = self.entries.lock().await;
        let expired = match entries.get(key) {
            Some(entry) if !self.is_expired(entry) => return Some(entry.result.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    fn is_expired(&self, entry: &CachedResult) -> bool {
        self.ttl
            .map(|ttl| entry.stored_at.elapsed() >= ttl)
            .unwrap_or(false)
    }
}
