//! Progressive vocabulary cache for Lexibattle.
//!
//! The cache owns the in-memory list of vocabulary entries for a session and
//! a readiness state machine (`Loading -> Ready | Error`). It is fed by a
//! remote backend that may not exist yet when the client starts.
//!
//! ## Components
//!
//! - **Backend**: the `VocabularyBackend` capability and the `BackendHandle`
//!   slot it is installed into once the connection exists
//! - **Cache**: `VocabularyCache::bootstrap` fetches the first sample,
//!   `VocabularyCache::ensure` hands out whatever is usable right now
//! - **Loader**: a cancellable background task that pages through the rest
//!   of the table in spaced-out windows
//!
//! # Example
//!
//! ```no_run
//! use lexibattle_cache::{BackendHandle, CacheConfig, VocabularyCache};
//!
//! # async fn demo() -> lexibattle_cache::CacheResult<()> {
//! let handle = BackendHandle::new();
//! let cache = VocabularyCache::new(CacheConfig::default(), handle.clone());
//! // handle.install(Arc::new(MyBackend)) happens once the connection is up
//! cache.bootstrap().await?;
//! let pool = cache.ensure(500).await?;
//! assert!(!pool.is_empty());
//! # Ok(())
//! # }
//! ```

mod backend;
mod cache;
mod config;
mod error;
mod loader;
mod store;

pub use backend::{BackendHandle, Filter, QueryBounds, QueryRequest, VocabularyBackend};
pub use cache::VocabularyCache;
pub use config::CacheConfig;
pub use error::{BackendError, BackendResult, CacheError, CacheResult};
pub use loader::{BackgroundLoader, LoaderReport};
