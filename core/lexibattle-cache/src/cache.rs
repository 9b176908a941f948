//! The vocabulary cache service.

use crate::backend::{fetch_entries, BackendHandle, Fetched, QueryBounds, QueryRequest, VocabularyBackend};
use crate::config::CacheConfig;
use crate::error::{CacheError, CacheResult};
use crate::loader::{BackgroundLoader, LoaderReport};
use crate::store::EntryStore;
use lexibattle_types::{CacheState, VocabPool};
use std::sync::{Arc, Mutex};
use tokio::sync::{watch, OnceCell, RwLock};
use tracing::{debug, info, warn};

/// In-memory vocabulary for one session.
///
/// Construct one per session with the backend handle it should poll, then
/// call `bootstrap` once the UI starts. `ensure` may be called at any time
/// and never waits longer than the configured ready-wait budget.
pub struct VocabularyCache {
    config: CacheConfig,
    handle: BackendHandle,
    store: Arc<RwLock<EntryStore>>,
    state: watch::Sender<CacheState>,
    last_error: Mutex<Option<CacheError>>,
    /// Shared outcome of the single bootstrap attempt.
    bootstrap: OnceCell<CacheResult<usize>>,
    loader: Mutex<Option<BackgroundLoader>>,
}

impl VocabularyCache {
    pub fn new(config: CacheConfig, handle: BackendHandle) -> Self {
        let (state, _) = watch::channel(CacheState::Loading);
        Self {
            store: Arc::new(RwLock::new(EntryStore::new(config.deduplicate))),
            config,
            handle,
            state,
            last_error: Mutex::new(None),
            bootstrap: OnceCell::new(),
            loader: Mutex::new(None),
        }
    }

    // ── State ────────────────────────────────────────────────────

    /// Current readiness state.
    pub fn state(&self) -> CacheState {
        *self.state.borrow()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<CacheState> {
        self.state.subscribe()
    }

    /// Reason behind the most recent failure, if any.
    pub fn last_error(&self) -> Option<CacheError> {
        self.last_error
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    /// True once at least one entry is cached.
    pub async fn is_usable(&self) -> bool {
        !self.is_empty().await
    }

    /// Copy of everything cached so far.
    pub async fn snapshot(&self) -> VocabPool {
        self.store.read().await.snapshot()
    }

    fn transition(&self, next: CacheState) {
        let changed = self.state.send_if_modified(|current| {
            if current.can_transition_to(next) {
                *current = next;
                true
            } else {
                false
            }
        });
        if changed {
            info!(state = %next, "Vocabulary cache state changed");
        }
    }

    fn record_error(&self, err: &CacheError) {
        *self.last_error.lock().unwrap_or_else(|e| e.into_inner()) = Some(err.clone());
    }

    // ── Bootstrap ────────────────────────────────────────────────

    /// Fetches the initial sample once.
    ///
    /// Concurrent and repeated calls share the first attempt's outcome;
    /// only one sample query is ever issued. Returns the number of entries
    /// the sample added.
    pub async fn bootstrap(&self) -> CacheResult<usize> {
        self.bootstrap
            .get_or_init(|| self.run_bootstrap())
            .await
            .clone()
    }

    async fn run_bootstrap(&self) -> CacheResult<usize> {
        info!(table = %self.config.table, "Bootstrapping vocabulary cache");
        match self.load_sample().await {
            Ok((added, backend)) => {
                self.transition(CacheState::Ready);
                self.start_background(backend);
                info!(added, "Vocabulary bootstrap complete");
                Ok(added)
            }
            Err(e) => {
                warn!("Vocabulary bootstrap failed: {}", e);
                self.record_error(&e);
                self.transition(CacheState::Error);
                Err(e)
            }
        }
    }

    async fn load_sample(&self) -> CacheResult<(usize, Arc<dyn VocabularyBackend>)> {
        let backend = self.wait_for_backend().await?;
        let request = QueryRequest::vocabulary(&self.config, QueryBounds::Limit(self.config.sample_size));
        let fetched = fetch_entries(backend.as_ref(), &request, &self.config).await?;
        if fetched.entries.is_empty() {
            return Err(CacheError::FetchFailed(format!(
                "initial sample from '{}' was empty",
                self.config.table
            )));
        }
        let added = self.store_fetched(fetched).await;
        Ok((added, backend))
    }

    /// Polls the handle at fixed intervals until a backend is installed.
    async fn wait_for_backend(&self) -> CacheResult<Arc<dyn VocabularyBackend>> {
        let attempts = self.config.connect_attempts;
        for attempt in 0..attempts {
            if let Some(backend) = self.handle.current() {
                if attempt > 0 {
                    debug!(attempt, "Backend became available");
                }
                return Ok(backend);
            }
            tokio::time::sleep(self.config.connect_interval()).await;
        }
        // One last look so a zero budget still sees an installed backend.
        self.handle
            .current()
            .ok_or(CacheError::BackendUnavailable { attempts })
    }

    fn start_background(&self, backend: Arc<dyn VocabularyBackend>) {
        let mut slot = self.loader.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_some() {
            return;
        }
        *slot = Some(BackgroundLoader::spawn(
            backend,
            Arc::clone(&self.store),
            self.config.clone(),
        ));
    }

    // ── Ensure ───────────────────────────────────────────────────

    /// Returns a non-empty pool of entries.
    ///
    /// Anything already cached is returned immediately, even when fewer
    /// than `min_count`. While `Loading`, polls the state for the configured
    /// budget; after that falls back to a direct fetch of `min_count` rows.
    /// Fails with `CacheUnavailable` only when every path came up empty.
    pub async fn ensure(&self, min_count: usize) -> CacheResult<VocabPool> {
        if let Some(pool) = self.available().await {
            return Ok(pool);
        }

        if self.state() == CacheState::Loading {
            let settled = self.wait_until_settled().await;
            if let Some(pool) = self.available().await {
                return Ok(pool);
            }
            debug!(settled, state = %self.state(), "Ready wait ended without entries");
        }

        let reason = match self.fetch_direct(min_count).await {
            Ok(added) if added > 0 => {
                debug!(added, "Direct fetch filled the cache");
                self.transition(CacheState::Ready);
                None
            }
            Ok(_) => Some("direct fetch returned no entries".to_string()),
            Err(e) => {
                warn!(min_count, "Direct vocabulary fetch failed: {}", e);
                Some(e.to_string())
            }
        };

        // A slower background path may have landed entries meanwhile.
        if let Some(pool) = self.available().await {
            return Ok(pool);
        }

        let reason = reason.unwrap_or_else(|| "no entries cached".to_string());
        let reason = match self.last_error() {
            None | Some(CacheError::CacheUnavailable(_)) => reason,
            Some(prior) => format!("{reason}; bootstrap: {prior}"),
        };
        let err = CacheError::CacheUnavailable(reason);
        self.record_error(&err);
        Err(err)
    }

    async fn available(&self) -> Option<VocabPool> {
        let store = self.store.read().await;
        (!store.is_empty()).then(|| store.snapshot())
    }

    /// Returns true if the state left `Loading` within the budget.
    async fn wait_until_settled(&self) -> bool {
        for _ in 0..self.config.ready_wait_attempts {
            if self.state().is_settled() || !self.store.read().await.is_empty() {
                return true;
            }
            tokio::time::sleep(self.config.ready_wait_interval()).await;
        }
        self.state().is_settled()
    }

    async fn fetch_direct(&self, min_count: usize) -> CacheResult<usize> {
        let backend = self
            .handle
            .current()
            .ok_or(CacheError::BackendUnavailable { attempts: 1 })?;
        let request = QueryRequest::vocabulary(&self.config, QueryBounds::Limit(min_count.max(1)));
        let fetched = fetch_entries(backend.as_ref(), &request, &self.config).await?;
        Ok(self.store_fetched(fetched).await)
    }

    /// Appends the result of a `Limit` fetch. Those always read from the
    /// first row, so the consumed mark becomes at least the row count.
    async fn store_fetched(&self, fetched: Fetched) -> usize {
        let mut store = self.store.write().await;
        store.mark_consumed(fetched.rows);
        store.append(fetched.entries)
    }

    // ── Background control ───────────────────────────────────────

    /// True while background windows are still being fetched.
    pub fn is_loading_in_background(&self) -> bool {
        self.loader
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|l| !l.is_finished())
    }

    /// Waits for the background loader to finish and returns its report.
    /// Returns `None` if no loader was started.
    pub async fn wait_background(&self) -> Option<LoaderReport> {
        let loader = self.loader.lock().unwrap_or_else(|e| e.into_inner()).take()?;
        loader.join().await
    }

    /// Stops background paging. Entries already cached stay available.
    pub fn shutdown(&self) {
        if let Some(loader) = self.loader.lock().unwrap_or_else(|e| e.into_inner()).as_ref() {
            loader.stop();
            debug!("Background vocabulary loader stopped");
        }
    }
}

impl Drop for VocabularyCache {
    fn drop(&mut self) {
        let slot = self.loader.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(loader) = slot.as_ref() {
            loader.stop();
        }
    }
}
