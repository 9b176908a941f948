//! Memoizing plugin registry.

use crate::error::PluginResult;
use crate::loader::PluginLoader;
use crate::module::PluginModule;
use lexibattle_types::{QuestionTypeDescriptor, QuestionTypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::{info, warn};

type ModuleSlot = Arc<OnceCell<PluginModule>>;

/// Resolves question-type ids to modules, loading each at most once.
///
/// Successful loads are kept for the lifetime of the registry. Failures are
/// not cached, so a later `resolve` retries the loader.
pub struct PluginRegistry {
    loader: Arc<dyn PluginLoader>,
    /// One slot per requested id. The map lock is never held across a load.
    slots: Mutex<HashMap<QuestionTypeId, ModuleSlot>>,
}

impl PluginRegistry {
    pub fn new(loader: Arc<dyn PluginLoader>) -> Self {
        Self {
            loader,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, type_id: &QuestionTypeId) -> ModuleSlot {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(slots.entry(type_id.clone()).or_default())
    }

    /// Returns the module for `type_id`, loading it on first use.
    ///
    /// Concurrent resolves of the same id wait for one another so the
    /// loader runs once. Loads of different ids proceed independently.
    pub async fn resolve(&self, type_id: &QuestionTypeId) -> PluginResult<PluginModule> {
        let slot = self.slot(type_id);
        slot.get_or_try_init(|| async {
            match self.loader.load(type_id).await {
                Ok(module) => {
                    info!(type_id = %type_id, shape = ?module.shape(), "Plugin module loaded");
                    Ok(module)
                }
                Err(e) => {
                    warn!(type_id = %type_id, "Plugin module load failed: {}", e);
                    Err(e)
                }
            }
        })
        .await
        .cloned()
    }

    pub fn is_loaded(&self, type_id: &QuestionTypeId) -> bool {
        self.slots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(type_id)
            .is_some_and(|slot| slot.initialized())
    }

    pub fn loaded_count(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    /// Question types the loader advertises.
    pub fn descriptors(&self) -> Vec<QuestionTypeDescriptor> {
        self.loader.descriptors()
    }
}
