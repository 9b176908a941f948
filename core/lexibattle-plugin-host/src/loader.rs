//! Resolving question-type ids to plugin modules.

use crate::error::{PluginHostError, PluginResult};
use crate::module::PluginModule;
use async_trait::async_trait;
use lexibattle_types::{QuestionTypeDescriptor, QuestionTypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Loads the module behind a question-type id.
///
/// Implementations may do I/O (fetching code-split assets, reading plugin
/// manifests); the registry memoizes successes and retries failures.
#[async_trait]
pub trait PluginLoader: Send + Sync {
    async fn load(&self, type_id: &QuestionTypeId) -> PluginResult<PluginModule>;

    /// Question types this loader knows about.
    fn descriptors(&self) -> Vec<QuestionTypeDescriptor> {
        Vec::new()
    }
}

/// Produces a module on demand.
pub type ModuleSource = Arc<dyn Fn() -> PluginResult<PluginModule> + Send + Sync>;

/// A table of registered module constructors.
///
/// Descriptors map type ids to module names; a type id without a descriptor
/// is looked up as a module name directly.
#[derive(Default)]
pub struct PluginTable {
    modules: HashMap<String, ModuleSource>,
    descriptors: HashMap<QuestionTypeId, QuestionTypeDescriptor>,
}

impl PluginTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module constructor under `name`.
    pub fn module<F>(mut self, name: impl Into<String>, source: F) -> Self
    where
        F: Fn() -> PluginResult<PluginModule> + Send + Sync + 'static,
    {
        self.modules.insert(name.into(), Arc::new(source));
        self
    }

    /// Registers an already-built module under `name`.
    pub fn with_module(self, name: impl Into<String>, module: PluginModule) -> Self {
        self.module(name, move || Ok(module.clone()))
    }

    /// Maps a type id onto a registered module.
    pub fn describe(mut self, descriptor: QuestionTypeDescriptor) -> Self {
        self.descriptors.insert(descriptor.id.clone(), descriptor);
        self
    }

    fn module_name<'a>(&'a self, type_id: &'a QuestionTypeId) -> &'a str {
        self.descriptors
            .get(type_id)
            .map(|d| d.module.as_str())
            .unwrap_or(type_id.as_str())
    }
}

#[async_trait]
impl PluginLoader for PluginTable {
    async fn load(&self, type_id: &QuestionTypeId) -> PluginResult<PluginModule> {
        let name = self.module_name(type_id);
        let source = self.modules.get(name).ok_or_else(|| PluginHostError::PluginLoadFailed {
            type_id: type_id.to_string(),
            reason: format!("no module registered as '{name}'"),
        })?;
        debug!(type_id = %type_id, module = name, "Loading plugin module");
        source().map_err(|e| match e {
            err @ PluginHostError::PluginLoadFailed { .. } => err,
            other => PluginHostError::PluginLoadFailed {
                type_id: type_id.to_string(),
                reason: other.to_string(),
            },
        })
    }

    fn descriptors(&self) -> Vec<QuestionTypeDescriptor> {
        let mut descriptors: Vec<_> = self.descriptors.values().cloned().collect();
        descriptors.sort_by(|a, b| a.id.cmp(&b.id));
        descriptors
    }
}
