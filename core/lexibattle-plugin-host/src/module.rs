//! Plugin module shapes and instantiation.

use crate::error::{PluginHostError, PluginResult};
use crate::plugin::QuestionPlugin;
use lexibattle_types::{QuestionTypeId, VocabPool};
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Everything a constructible plugin receives.
#[derive(Debug, Clone)]
pub struct PluginContext {
    pub vocab_pool: VocabPool,
    /// Id of the shared render target the plugin draws into.
    pub container_id: String,
    /// Per-type settings from the engine config.
    pub config: Value,
}

/// Builds a fresh plugin instance per round.
pub trait PluginFactory: Send + Sync {
    fn construct(&self, context: PluginContext) -> PluginResult<Arc<dyn QuestionPlugin>>;
}

impl<F> PluginFactory for F
where
    F: Fn(PluginContext) -> PluginResult<Arc<dyn QuestionPlugin>> + Send + Sync,
{
    fn construct(&self, context: PluginContext) -> PluginResult<Arc<dyn QuestionPlugin>> {
        self(context)
    }
}

/// The shape a resolved module ships in, fixed when it is registered.
#[derive(Clone)]
pub enum PluginModule {
    /// A constructor invoked once per round.
    Constructible(Arc<dyn PluginFactory>),
    /// One instance reused across rounds; vocabulary is injected in place.
    Singleton(Arc<dyn QuestionPlugin>),
}

/// Shape tag without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleShape {
    Constructible,
    Singleton,
}

impl PluginModule {
    /// Wraps a constructor closure.
    pub fn constructible<F>(construct: F) -> Self
    where
        F: Fn(PluginContext) -> PluginResult<Arc<dyn QuestionPlugin>> + Send + Sync + 'static,
    {
        Self::Constructible(Arc::new(construct))
    }

    pub fn from_factory(factory: impl PluginFactory + 'static) -> Self {
        Self::Constructible(Arc::new(factory))
    }

    pub fn singleton(plugin: impl QuestionPlugin + 'static) -> Self {
        Self::Singleton(Arc::new(plugin))
    }

    pub fn shape(&self) -> ModuleShape {
        match self {
            Self::Constructible(_) => ModuleShape::Constructible,
            Self::Singleton(_) => ModuleShape::Singleton,
        }
    }

    /// Produces the instance to mount for this round.
    ///
    /// Factory errors and panics surface as `ConstructionFailed`.
    pub fn instantiate(
        &self,
        type_id: &QuestionTypeId,
        context: PluginContext,
    ) -> PluginResult<Arc<dyn QuestionPlugin>> {
        let outcome = catch_unwind(AssertUnwindSafe(|| match self {
            Self::Constructible(factory) => factory.construct(context),
            Self::Singleton(plugin) => {
                plugin.inject_vocabulary(context.vocab_pool);
                Ok(Arc::clone(plugin))
            }
        }));

        match outcome {
            Ok(Ok(instance)) => Ok(instance),
            Ok(Err(err @ PluginHostError::ConstructionFailed { .. })) => Err(err),
            Ok(Err(err)) => Err(PluginHostError::ConstructionFailed {
                type_id: type_id.to_string(),
                message: err.to_string(),
            }),
            Err(payload) => Err(PluginHostError::ConstructionFailed {
                type_id: type_id.to_string(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

impl fmt::Debug for PluginModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constructible(_) => f.write_str("PluginModule::Constructible"),
            Self::Singleton(plugin) => write!(f, "PluginModule::Singleton({})", plugin.name()),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
