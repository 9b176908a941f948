//! Cache configuration.

use crate::backend::Filter;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning knobs for the vocabulary cache.
///
/// Every field has a default, so a partial `[cache]` table in the engine
/// config is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Backend table holding the vocabulary.
    pub table: String,
    /// Column carrying the term.
    pub term_field: String,
    /// Column carrying the translation.
    pub translation_field: String,
    /// Extra equality filters applied to every query.
    pub filters: Vec<Filter>,
    /// Rows fetched by `bootstrap`.
    pub sample_size: usize,
    /// Rows per background window.
    pub batch_size: usize,
    /// Window `i` starts `batch_delay_step_ms * (i + 1)` after window `i - 1`.
    pub batch_delay_step_ms: u64,
    /// Polls of the readiness state inside `ensure`.
    pub ready_wait_attempts: u32,
    pub ready_wait_interval_ms: u64,
    /// Polls of the backend handle inside `bootstrap`.
    pub connect_attempts: u32,
    pub connect_interval_ms: u64,
    /// Attempts at reading the total row count before paging blind.
    pub count_retry_attempts: u32,
    /// First backoff between count attempts; doubles each time.
    pub count_retry_backoff_ms: u64,
    /// Windows scheduled when the total row count is unknown.
    pub blind_batch_limit: usize,
    /// Drop entries whose normalized key is already cached.
    pub deduplicate: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            table: "vocabulary".to_string(),
            term_field: "term".to_string(),
            translation_field: "translation".to_string(),
            filters: Vec::new(),
            sample_size: 500,
            batch_size: 1000,
            batch_delay_step_ms: 1500,
            ready_wait_attempts: 30,
            ready_wait_interval_ms: 100,
            connect_attempts: 50,
            connect_interval_ms: 100,
            count_retry_attempts: 3,
            count_retry_backoff_ms: 500,
            blind_batch_limit: 5,
            deduplicate: false,
        }
    }
}

impl CacheConfig {
    /// Delay before background window `index` (zero-based).
    pub fn batch_delay(&self, index: usize) -> Duration {
        let factor = u64::try_from(index).unwrap_or(u64::MAX).saturating_add(1);
        Duration::from_millis(self.batch_delay_step_ms.saturating_mul(factor))
    }

    /// Backoff before count retry `attempt` (zero-based).
    pub fn count_backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(self.count_retry_backoff_ms.saturating_mul(factor))
    }

    pub fn ready_wait_interval(&self) -> Duration {
        Duration::from_millis(self.ready_wait_interval_ms)
    }

    pub fn connect_interval(&self) -> Duration {
        Duration::from_millis(self.connect_interval_ms)
    }
}
