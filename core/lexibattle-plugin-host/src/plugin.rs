//! The question-type plugin lifecycle contract.

use crate::error::{PluginHostError, PluginResult};
use crate::reporter::AnswerReporter;
use async_trait::async_trait;
use lexibattle_types::{Difficulty, VocabPool, VocabularyEntry};
use serde_json::Value;

/// Which activation hook a plugin exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationHook {
    Init,
    Load,
}

impl ActivationHook {
    pub fn name(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Load => "load",
        }
    }
}

/// Lifecycle capabilities a plugin declares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PluginCapabilities {
    pub init: bool,
    pub load: bool,
    pub destroy: bool,
}

impl PluginCapabilities {
    /// Plugin activated through `init`.
    pub fn with_init() -> Self {
        Self {
            init: true,
            ..Self::default()
        }
    }

    /// Plugin activated through `load`.
    pub fn with_load() -> Self {
        Self {
            load: true,
            ..Self::default()
        }
    }

    pub fn and_destroy(mut self) -> Self {
        self.destroy = true;
        self
    }

    /// Returns the single declared activation hook.
    ///
    /// Declaring neither or both is a shape error.
    pub fn activation_hook(&self, plugin: &str) -> PluginResult<ActivationHook> {
        match (self.init, self.load) {
            (true, false) => Ok(ActivationHook::Init),
            (false, true) => Ok(ActivationHook::Load),
            (false, false) => Err(PluginHostError::PluginShapeInvalid {
                plugin: plugin.to_string(),
                detail: "exposes neither init nor load".into(),
            }),
            (true, true) => Err(PluginHostError::PluginShapeInvalid {
                plugin: plugin.to_string(),
                detail: "exposes both init and load".into(),
            }),
        }
    }
}

/// A question-type plugin instance.
///
/// Methods take `&self`; plugins keep their round state behind their own
/// locks. Reporter calls re-enter the plugin (`answered_entry`,
/// `current_data`) so no internal lock may be held while reporting.
///
/// After `destroy` a plugin must ignore any activation that resolves late
/// and must not report again.
#[async_trait]
pub trait QuestionPlugin: Send + Sync {
    /// Stable name used in logs and errors.
    fn name(&self) -> &str;

    fn capabilities(&self) -> PluginCapabilities;

    /// Hands the plugin the reporter for its current mount.
    fn attach(&self, reporter: AnswerReporter);

    /// Replaces the vocabulary of a singleton plugin before it is reused.
    fn inject_vocabulary(&self, pool: VocabPool) {
        let _ = pool;
    }

    async fn init(&self, difficulty: Difficulty) -> PluginResult<()> {
        let _ = difficulty;
        Err(PluginHostError::CapabilityNotSupported {
            plugin: self.name().to_string(),
            capability: "init".into(),
        })
    }

    async fn load(&self, difficulty: Difficulty) -> PluginResult<()> {
        let _ = difficulty;
        Err(PluginHostError::CapabilityNotSupported {
            plugin: self.name().to_string(),
            capability: "load".into(),
        })
    }

    /// Releases timers, listeners and visual state. Optional.
    fn destroy(&self) {}

    /// Quiz payload of the current round.
    fn current_data(&self) -> Option<Value> {
        None
    }

    /// The entry the player just answered, when the plugin tracks it.
    fn answered_entry(&self) -> Option<VocabularyEntry> {
        None
    }
}
