//! Background continuation of the vocabulary cache.
//!
//! After the first sample lands, a single task pages through the rest of
//! the table. Windows are planned up front (from the backend's row count, or
//! a bounded number of blind windows when the count is unavailable) and
//! spaced out with a delay that grows with the window index. A failing
//! window is logged and skipped. The task stops as soon as its
//! `CancellationToken` fires.

use crate::backend::{fetch_entries, QueryBounds, QueryRequest, VocabularyBackend};
use crate::config::CacheConfig;
use crate::store::EntryStore;
use lexibattle_types::LoadWindow;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Summary of one background run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderReport {
    /// Total rows reported by the backend, if the count succeeded.
    pub total: Option<usize>,
    pub windows_planned: usize,
    pub windows_loaded: usize,
    pub windows_failed: usize,
    pub entries_added: usize,
    pub cancelled: bool,
}

/// Handle to the running background task.
pub struct BackgroundLoader {
    cancel: CancellationToken,
    handle: JoinHandle<LoaderReport>,
}

impl BackgroundLoader {
    pub(crate) fn spawn(
        backend: Arc<dyn VocabularyBackend>,
        store: Arc<RwLock<EntryStore>>,
        config: CacheConfig,
    ) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move { run(backend, store, config, token).await });
        Self { cancel, handle }
    }

    /// Asks the task to stop before its next window.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the task and returns its report.
    pub async fn join(self) -> Option<LoaderReport> {
        match self.handle.await {
            Ok(report) => Some(report),
            Err(e) => {
                warn!("Background loader task failed: {}", e);
                None
            }
        }
    }
}

async fn run(
    backend: Arc<dyn VocabularyBackend>,
    store: Arc<RwLock<EntryStore>>,
    config: CacheConfig,
    cancel: CancellationToken,
) -> LoaderReport {
    let mut report = LoaderReport::default();

    let Some(total) = count_with_retry(backend.as_ref(), &config, &cancel).await else {
        report.cancelled = cancel.is_cancelled();
        if report.cancelled {
            return report;
        }
        return page(backend, store, config, cancel, report, None).await;
    };
    report.total = Some(total);
    page(backend, store, config, cancel, report, Some(total)).await
}

async fn page(
    backend: Arc<dyn VocabularyBackend>,
    store: Arc<RwLock<EntryStore>>,
    config: CacheConfig,
    cancel: CancellationToken,
    mut report: LoaderReport,
    total: Option<usize>,
) -> LoaderReport {
    let start = store.read().await.consumed();
    let windows = match total {
        Some(total) => LoadWindow::plan_until(start, total, config.batch_size),
        None => {
            warn!(
                limit = config.blind_batch_limit,
                "Row count unavailable, paging a bounded number of windows"
            );
            LoadWindow::plan_blind(start, config.batch_size, config.blind_batch_limit)
        }
    };
    report.windows_planned = windows.len();
    info!(start, windows = windows.len(), ?total, "Background vocabulary load scheduled");

    for (index, window) in windows.into_iter().enumerate() {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(index, "Background load cancelled");
                report.cancelled = true;
                break;
            }
            _ = tokio::time::sleep(config.batch_delay(index)) => {}
        }

        let request = QueryRequest::vocabulary(&config, QueryBounds::Range(window));
        match fetch_entries(backend.as_ref(), &request, &config).await {
            Ok(fetched) => {
                let received = fetched.rows;
                let added = {
                    let mut store = store.write().await;
                    store.mark_consumed(window.offset + received);
                    store.append(fetched.entries)
                };
                report.windows_loaded += 1;
                report.entries_added += added;
                debug!(offset = window.offset, size = window.size, received, added, "Window loaded");

                if total.is_none() && received < window.size {
                    debug!(offset = window.offset, "Reached end of table");
                    break;
                }
            }
            Err(e) => {
                report.windows_failed += 1;
                warn!(offset = window.offset, size = window.size, "Background window failed: {}", e);
            }
        }
    }

    info!(
        loaded = report.windows_loaded,
        failed = report.windows_failed,
        added = report.entries_added,
        cancelled = report.cancelled,
        "Background vocabulary load finished"
    );
    report
}

async fn count_with_retry(
    backend: &dyn VocabularyBackend,
    config: &CacheConfig,
    cancel: &CancellationToken,
) -> Option<usize> {
    for attempt in 0..config.count_retry_attempts {
        match backend.count(&config.table).await {
            Ok(total) => return Some(total),
            Err(e) => {
                warn!(attempt, table = %config.table, "Row count failed: {}", e);
            }
        }
        if attempt + 1 == config.count_retry_attempts {
            break;
        }
        tokio::select! {
            _ = cancel.cancelled() => return None,
            _ = tokio::time::sleep(config.count_backoff(attempt)) => {}
        }
    }
    None
}
