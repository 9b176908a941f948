//! Shared plugin fakes for plugin-host tests.

#![allow(dead_code)]

use async_trait::async_trait;
use lexibattle_plugin_host::*;
use lexibattle_types::{Difficulty, QuestionTypeId, VocabPool, VocabularyEntry};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Minimal plugin that records what the host did to it.
pub struct StubPlugin {
    pub name: String,
    pub caps: PluginCapabilities,
    pub pool_len: AtomicUsize,
    pub destroyed: AtomicBool,
    pub activated_with: Mutex<Option<Difficulty>>,
    pub reporter: Mutex<Option<AnswerReporter>>,
}

impl StubPlugin {
    pub fn new(name: &str, caps: PluginCapabilities) -> Self {
        Self {
            name: name.to_string(),
            caps,
            pool_len: AtomicUsize::new(0),
            destroyed: AtomicBool::new(false),
            activated_with: Mutex::new(None),
            reporter: Mutex::new(None),
        }
    }

    pub fn with_pool(name: &str, caps: PluginCapabilities, pool: &VocabPool) -> Self {
        let plugin = Self::new(name, caps);
        plugin.pool_len.store(pool.len(), Ordering::SeqCst);
        plugin
    }
}

#[async_trait]
impl QuestionPlugin for StubPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> PluginCapabilities {
        self.caps
    }

    fn attach(&self, reporter: AnswerReporter) {
        *self.reporter.lock().unwrap() = Some(reporter);
    }

    fn inject_vocabulary(&self, pool: VocabPool) {
        self.pool_len.store(pool.len(), Ordering::SeqCst);
    }

    async fn init(&self, difficulty: Difficulty) -> PluginResult<()> {
        *self.activated_with.lock().unwrap() = Some(difficulty);
        Ok(())
    }

    fn destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
    }

    fn answered_entry(&self) -> Option<VocabularyEntry> {
        Some(VocabularyEntry::new("Hund", "dog"))
    }
}

/// Loader that fails a fixed number of times before succeeding.
pub struct FlakyLoader {
    failures_left: AtomicUsize,
    pub loads: AtomicUsize,
}

impl FlakyLoader {
    pub fn failing(times: usize) -> Self {
        Self {
            failures_left: AtomicUsize::new(times),
            loads: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PluginLoader for FlakyLoader {
    async fn load(&self, type_id: &QuestionTypeId) -> PluginResult<PluginModule> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(PluginHostError::PluginLoadFailed {
                type_id: type_id.to_string(),
                reason: "asset fetch interrupted".into(),
            });
        }
        Ok(PluginModule::singleton(StubPlugin::new(
            type_id.as_str(),
            PluginCapabilities::with_init(),
        )))
    }
}

/// Loader that takes `delay` for one id and answers every other id at once.
pub struct SlowLoader {
    pub slow: QuestionTypeId,
    pub delay: std::time::Duration,
}

#[async_trait]
impl PluginLoader for SlowLoader {
    async fn load(&self, type_id: &QuestionTypeId) -> PluginResult<PluginModule> {
        if *type_id == self.slow {
            tokio::time::sleep(self.delay).await;
        }
        Ok(PluginModule::singleton(StubPlugin::new(
            type_id.as_str(),
            PluginCapabilities::with_load(),
        )))
    }
}

pub fn pool(n: usize) -> VocabPool {
    Arc::new(
        (0..n)
            .map(|i| VocabularyEntry::new(format!("w{i}"), format!("t{i}")))
            .collect(),
    )
}

pub fn context(n: usize) -> PluginContext {
    PluginContext {
        vocab_pool: pool(n),
        container_id: "question-container".into(),
        config: serde_json::json!({ "choices": 4 }),
    }
}
