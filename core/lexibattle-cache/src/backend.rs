//! Backend capability and the handle it is installed into.
//!
//! The remote data service is not assumed to exist at startup. Whoever
//! establishes the connection calls `BackendHandle::install`; the cache only
//! ever polls `BackendHandle::current`.

use crate::config::CacheConfig;
use crate::error::{BackendResult, CacheError, CacheResult};
use async_trait::async_trait;
use lexibattle_types::{LoadWindow, VocabularyEntry};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::warn;

/// Equality filter applied to a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Returns true if `row` carries `value` under `field`.
    pub fn matches(&self, row: &Value) -> bool {
        row.get(&self.field) == Some(&self.value)
    }
}

/// How many rows a query should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryBounds {
    /// The first `n` rows.
    Limit(usize),
    /// Rows `offset..offset + size`.
    Range(LoadWindow),
}

/// A select against one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub table: String,
    pub fields: Vec<String>,
    pub filters: Vec<Filter>,
    pub bounds: Option<QueryBounds>,
}

impl QueryRequest {
    /// Builds the vocabulary select described by `config`.
    pub fn vocabulary(config: &CacheConfig, bounds: QueryBounds) -> Self {
        Self {
            table: config.table.clone(),
            fields: vec![config.term_field.clone(), config.translation_field.clone()],
            filters: config.filters.clone(),
            bounds: Some(bounds),
        }
    }
}

/// The remote data service.
#[async_trait]
pub trait VocabularyBackend: Send + Sync {
    /// Runs a select and returns the raw JSON rows.
    async fn query(&self, request: &QueryRequest) -> BackendResult<Vec<Value>>;

    /// Returns the total number of rows in `table`.
    async fn count(&self, table: &str) -> BackendResult<usize>;
}

/// Shared slot holding the backend once it becomes available.
#[derive(Clone, Default)]
pub struct BackendHandle {
    slot: Arc<RwLock<Option<Arc<dyn VocabularyBackend>>>>,
}

impl BackendHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a handle that already holds `backend`.
    pub fn with_backend(backend: Arc<dyn VocabularyBackend>) -> Self {
        let handle = Self::new();
        handle.install(backend);
        handle
    }

    /// Makes `backend` visible to every clone of this handle.
    pub fn install(&self, backend: Arc<dyn VocabularyBackend>) {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(backend);
    }

    /// Removes the backend, e.g. after the connection was closed.
    pub fn clear(&self) {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }

    /// Returns the backend if one is installed.
    pub fn current(&self) -> Option<Arc<dyn VocabularyBackend>> {
        self.slot.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_available(&self) -> bool {
        self.current().is_some()
    }
}

impl fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendHandle")
            .field("available", &self.is_available())
            .finish()
    }
}

/// Decoded result of one backend query.
#[derive(Debug)]
pub(crate) struct Fetched {
    pub(crate) entries: Vec<VocabularyEntry>,
    /// Rows the backend returned, decodable or not.
    pub(crate) rows: usize,
}

/// Runs `request` and decodes the rows into entries.
///
/// An empty row set is not an error here (background paging uses it to
/// detect the end of the table). A non-empty row set where nothing decodes
/// is reported as `FetchFailed`.
pub(crate) async fn fetch_entries(
    backend: &dyn VocabularyBackend,
    request: &QueryRequest,
    config: &CacheConfig,
) -> CacheResult<Fetched> {
    let rows = backend.query(request).await?;
    let row_count = rows.len();
    let entries = decode_rows(&rows, config);

    if row_count > 0 && entries.is_empty() {
        return Err(CacheError::FetchFailed(format!(
            "none of {row_count} rows from '{}' carried '{}'/'{}'",
            config.table, config.term_field, config.translation_field
        )));
    }
    if entries.len() < row_count {
        warn!(
            table = %config.table,
            skipped = row_count - entries.len(),
            "Skipped undecodable vocabulary rows"
        );
    }
    Ok(Fetched {
        entries,
        rows: row_count,
    })
}

fn decode_rows(rows: &[Value], config: &CacheConfig) -> Vec<VocabularyEntry> {
    rows.iter()
        .filter_map(|row| {
            let term = row.get(&config.term_field)?.as_str()?;
            let translation = row.get(&config.translation_field)?.as_str()?;
            let entry = VocabularyEntry::new(term, translation);
            entry.validate().ok().map(|_| entry)
        })
        .collect()
}
