//! Question-type plugin host for Lexibattle.
//!
//! Defines the lifecycle contract every question-type plugin implements,
//! the two module shapes a plugin can ship as (a constructor or a ready-made
//! singleton), the loader table that maps type ids to modules, and the
//! registry that memoizes resolved modules for the rest of the session.
//!
//! Plugins never see the orchestrator directly. They receive an
//! `AnswerReporter` on `attach` and report through it.

mod error;
mod loader;
mod module;
mod plugin;
mod registry;
mod reporter;

pub use error::{PluginHostError, PluginResult};
pub use loader::{ModuleSource, PluginLoader, PluginTable};
pub use module::{ModuleShape, PluginContext, PluginFactory, PluginModule};
pub use plugin::{ActivationHook, PluginCapabilities, QuestionPlugin};
pub use registry::PluginRegistry;
pub use reporter::{AnswerListener, AnswerReporter};
