//! Question orchestration for Lexibattle.
//!
//! The engine ties the vocabulary cache and the plugin registry together.
//! One `QuestionOrchestrator` owns the single live question instance and
//! the shared render target; one `AnswerRouter` turns plugin reports into
//! battle rounds and history ledger lines.
//!
//! ## Round lifecycle
//!
//! 1. **Acquire**: `VocabularyCache::ensure` supplies a vocabulary pool
//! 2. **Teardown**: the previous instance is destroyed
//! 3. **Construct**: the registry resolves the module, which is instantiated
//!    according to its shape
//! 4. **Wire**: the instance receives an `AnswerReporter`
//! 5. **Activate**: `init` or `load` runs in the background
//!
//! Any failure replaces the render target with a failure view carrying a
//! reload affordance.

mod config;
mod error;
mod orchestrator;
mod render;
mod router;

pub use config::{EngineConfig, RouterConfig};
pub use error::{EngineError, EngineResult};
pub use orchestrator::{MountedQuestion, QuestionOrchestrator};
pub use render::{MemoryRenderTarget, ReloadAffordance, RenderTarget, RenderView};
pub use router::{entry_from_data, AnswerRouter, BattleSink, HistoryLedger, MemoryLedger};
