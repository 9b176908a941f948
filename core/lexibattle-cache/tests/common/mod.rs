//! Shared fakes for cache tests.

#![allow(dead_code)]

use async_trait::async_trait;
use lexibattle_cache::{BackendError, BackendResult, CacheConfig, QueryBounds, QueryRequest, VocabularyBackend};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// In-memory backend that records every call.
#[derive(Default)]
pub struct FakeBackend {
    rows: Vec<Value>,
    latency: Duration,
    fail_offsets: HashSet<usize>,
    fail_limit_queries: bool,
    fail_count: bool,
    log: Mutex<Vec<(QueryBounds, Instant)>>,
    count_calls: Mutex<usize>,
}

impl FakeBackend {
    /// Backend holding `n` rows `word{i}` / `translation{i}`.
    pub fn with_words(n: usize) -> Self {
        let rows = (0..n)
            .map(|i| json!({ "term": format!("word{i}"), "translation": format!("translation{i}") }))
            .collect();
        Self::with_rows(rows)
    }

    pub fn with_rows(rows: Vec<Value>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn failing_window_at(mut self, offset: usize) -> Self {
        self.fail_offsets.insert(offset);
        self
    }

    pub fn failing_limit_queries(mut self) -> Self {
        self.fail_limit_queries = true;
        self
    }

    pub fn failing_count(mut self) -> Self {
        self.fail_count = true;
        self
    }

    pub fn queries(&self) -> Vec<QueryBounds> {
        self.log.lock().unwrap().iter().map(|(b, _)| *b).collect()
    }

    pub fn query_times(&self) -> Vec<Instant> {
        self.log.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }

    pub fn limit_queries(&self) -> usize {
        self.queries()
            .iter()
            .filter(|b| matches!(b, QueryBounds::Limit(_)))
            .count()
    }

    pub fn count_calls(&self) -> usize {
        *self.count_calls.lock().unwrap()
    }
}

#[async_trait]
impl VocabularyBackend for FakeBackend {
    async fn query(&self, request: &QueryRequest) -> BackendResult<Vec<Value>> {
        let bounds = request.bounds.unwrap_or(QueryBounds::Limit(usize::MAX));
        self.log.lock().unwrap().push((bounds, Instant::now()));
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let rows: Vec<Value> = self
            .rows
            .iter()
            .filter(|row| request.filters.iter().all(|f| f.matches(row)))
            .cloned()
            .collect();

        match bounds {
            QueryBounds::Limit(_) if self.fail_limit_queries => {
                Err(BackendError::Connection("socket closed".into()))
            }
            QueryBounds::Limit(n) => Ok(rows.into_iter().take(n).collect()),
            QueryBounds::Range(w) if self.fail_offsets.contains(&w.offset) => {
                Err(BackendError::Query(format!("window {} rejected", w.offset)))
            }
            QueryBounds::Range(w) => Ok(rows.into_iter().skip(w.offset).take(w.size).collect()),
        }
    }

    async fn count(&self, _table: &str) -> BackendResult<usize> {
        *self.count_calls.lock().unwrap() += 1;
        if self.fail_count {
            return Err(BackendError::Query("count not permitted".into()));
        }
        Ok(self.rows.len())
    }
}

/// Small, fast config for tests.
pub fn test_config() -> CacheConfig {
    CacheConfig {
        sample_size: 5,
        batch_size: 10,
        batch_delay_step_ms: 100,
        ready_wait_attempts: 5,
        ready_wait_interval_ms: 20,
        connect_attempts: 5,
        connect_interval_ms: 20,
        count_retry_attempts: 3,
        count_retry_backoff_ms: 10,
        blind_batch_limit: 3,
        ..CacheConfig::default()
    }
}
