//! Drives one question round at a time through the shared render target.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::render::{ReloadAffordance, RenderTarget, RenderView};
use crate::router::AnswerRouter;
use lexibattle_cache::VocabularyCache;
use lexibattle_plugin_host::{
    ActivationHook, AnswerListener, AnswerReporter, ModuleShape, PluginContext, PluginRegistry,
    QuestionPlugin,
};
use lexibattle_types::{Difficulty, InstanceId, QuestionTypeId};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Summary of a successfully mounted round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedQuestion {
    pub instance: InstanceId,
    pub type_id: QuestionTypeId,
    pub plugin: String,
    pub shape: ModuleShape,
    pub hook: ActivationHook,
    /// Entries handed to the plugin.
    pub pool_size: usize,
}

struct ActiveQuestion {
    instance: InstanceId,
    type_id: QuestionTypeId,
    plugin: Arc<dyn QuestionPlugin>,
    activation: Option<JoinHandle<EngineResult<()>>>,
}

/// Owns the live question instance.
///
/// At most one instance exists at a time. `load_type` calls are serialized
/// and the previous instance is always torn down before the next one is
/// constructed.
pub struct QuestionOrchestrator {
    config: EngineConfig,
    cache: Arc<VocabularyCache>,
    registry: Arc<PluginRegistry>,
    render: Arc<dyn RenderTarget>,
    router: Arc<AnswerRouter>,
    active: Mutex<Option<ActiveQuestion>>,
}

impl QuestionOrchestrator {
    pub fn new(
        config: EngineConfig,
        cache: Arc<VocabularyCache>,
        registry: Arc<PluginRegistry>,
        render: Arc<dyn RenderTarget>,
        router: Arc<AnswerRouter>,
    ) -> Self {
        Self {
            config,
            cache,
            registry,
            render,
            router,
            active: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<VocabularyCache> {
        &self.cache
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    pub fn router(&self) -> &Arc<AnswerRouter> {
        &self.router
    }

    /// Fetches the initial vocabulary sample.
    pub async fn bootstrap_cache(&self) -> EngineResult<usize> {
        Ok(self.cache.bootstrap().await?)
    }

    pub async fn active_instance(&self) -> Option<InstanceId> {
        self.active.lock().await.as_ref().map(|q| q.instance)
    }

    pub async fn active_type(&self) -> Option<QuestionTypeId> {
        self.active.lock().await.as_ref().map(|q| q.type_id.clone())
    }

    /// Mounts a fresh round of `type_id`.
    ///
    /// On failure the render target shows the failure view, no instance is
    /// left mounted and the error is returned.
    pub async fn load_type(
        &self,
        type_id: impl Into<QuestionTypeId>,
        difficulty: Difficulty,
    ) -> EngineResult<MountedQuestion> {
        let type_id = type_id.into();
        let mut active = self.active.lock().await;

        match self.mount(&mut active, &type_id, difficulty).await {
            Ok(mounted) => {
                info!(
                    type_id = %mounted.type_id,
                    plugin = %mounted.plugin,
                    instance = %mounted.instance,
                    pool = mounted.pool_size,
                    "Question mounted"
                );
                Ok(mounted)
            }
            Err(e) => {
                warn!(type_id = %type_id, "Failed to load question type: {}", e);
                self.teardown_locked(&mut active);
                self.render_failure(&e, type_id, difficulty);
                Err(e)
            }
        }
    }

    async fn mount(
        &self,
        active: &mut Option<ActiveQuestion>,
        type_id: &QuestionTypeId,
        difficulty: Difficulty,
    ) -> EngineResult<MountedQuestion> {
        let pool = self.cache.ensure(self.config.min_pool_size).await?;

        self.teardown_locked(active);

        let module = self.registry.resolve(type_id).await?;
        let shape = module.shape();
        let context = PluginContext {
            vocab_pool: Arc::clone(&pool),
            container_id: self.config.container_id.clone(),
            config: self.config.plugin_config(type_id),
        };
        let plugin = module.instantiate(type_id, context)?;

        let capabilities = plugin.capabilities();
        let hook = match capabilities.activation_hook(plugin.name()) {
            Ok(hook) => hook,
            Err(e) => {
                if capabilities.destroy {
                    plugin.destroy();
                }
                return Err(e.into());
            }
        };

        let instance = InstanceId::new();
        self.router.activate(instance, Arc::clone(&plugin));
        let listener: Arc<dyn AnswerListener> = self.router.clone();
        plugin.attach(AnswerReporter::new(instance, listener));

        self.render.show(
            &self.config.container_id,
            RenderView::Question {
                instance,
                type_id: type_id.clone(),
                plugin: plugin.name().to_string(),
            },
        );

        let activation = self.spawn_activation(instance, type_id, &plugin, hook, difficulty);
        let mounted = MountedQuestion {
            instance,
            type_id: type_id.clone(),
            plugin: plugin.name().to_string(),
            shape,
            hook,
            pool_size: pool.len(),
        };
        *active = Some(ActiveQuestion {
            instance,
            type_id: type_id.clone(),
            plugin,
            activation: Some(activation),
        });
        Ok(mounted)
    }

    fn spawn_activation(
        &self,
        instance: InstanceId,
        type_id: &QuestionTypeId,
        plugin: &Arc<dyn QuestionPlugin>,
        hook: ActivationHook,
        difficulty: Difficulty,
    ) -> JoinHandle<EngineResult<()>> {
        let plugin = Arc::clone(plugin);
        let router = Arc::clone(&self.router);
        let render = Arc::clone(&self.render);
        let container_id = self.config.container_id.clone();
        let type_id = type_id.clone();

        tokio::spawn(async move {
            let activation = async {
                match hook {
                    ActivationHook::Init => plugin.init(difficulty).await,
                    ActivationHook::Load => plugin.load(difficulty).await,
                }
            };
            let result = match AssertUnwindSafe(activation).catch_unwind().await {
                Ok(result) => result.map_err(EngineError::from),
                Err(payload) => Err(EngineError::ActivationFailed {
                    plugin: plugin.name().to_string(),
                    message: panic_message(payload.as_ref()),
                }),
            };
            match result {
                Ok(()) => {
                    debug!(instance = %instance, hook = hook.name(), "Question activated");
                    Ok(())
                }
                Err(err) => {
                    if router.retire(instance) {
                        warn!(instance = %instance, "Question activation failed: {}", err);
                        render.show(
                            &container_id,
                            failure_view(&err, type_id, difficulty),
                        );
                    } else {
                        debug!(instance = %instance, "Late activation failure ignored: {}", err);
                    }
                    Err(err)
                }
            }
        })
    }

    /// Waits for the current instance's activation to finish.
    pub async fn settle(&self) -> EngineResult<()> {
        let pending = {
            let mut active = self.active.lock().await;
            active.as_mut().and_then(|q| {
                q.activation
                    .take()
                    .map(|handle| (q.plugin.name().to_string(), handle))
            })
        };
        match pending {
            Some((plugin, handle)) => handle.await.unwrap_or_else(|e| {
                Err(EngineError::ActivationFailed {
                    plugin,
                    message: e.to_string(),
                })
            }),
            None => Ok(()),
        }
    }

    /// Destroys the active instance and clears the render target.
    pub async fn teardown(&self) {
        let mut active = self.active.lock().await;
        self.teardown_locked(&mut active);
        self.render.show(&self.config.container_id, RenderView::Empty);
    }

    fn teardown_locked(&self, active: &mut Option<ActiveQuestion>) {
        let Some(question) = active.take() else {
            return;
        };
        self.router.retire(question.instance);
        if question.plugin.capabilities().destroy {
            question.plugin.destroy();
        }
        debug!(
            instance = %question.instance,
            plugin = question.plugin.name(),
            "Question torn down"
        );
    }

    fn render_failure(&self, err: &EngineError, type_id: QuestionTypeId, difficulty: Difficulty) {
        self.render
            .show(&self.config.container_id, failure_view(err, type_id, difficulty));
    }
}

fn failure_view(err: &EngineError, type_id: QuestionTypeId, difficulty: Difficulty) -> RenderView {
    RenderView::Failure {
        message: err.user_message().to_string(),
        detail: err.to_string(),
        reload: ReloadAffordance {
            type_id,
            difficulty,
        },
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
