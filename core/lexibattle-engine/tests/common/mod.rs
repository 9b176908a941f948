#![allow(dead_code)]

use async_trait::async_trait;
use lexibattle_cache::{
    BackendHandle, BackendResult, CacheConfig, QueryBounds, QueryRequest, VocabularyBackend,
    VocabularyCache,
};
use lexibattle_engine::{
    AnswerRouter, BattleSink, EngineConfig, MemoryLedger, MemoryRenderTarget, QuestionOrchestrator,
    RouterConfig,
};
use lexibattle_plugin_host::{
    AnswerReporter, PluginCapabilities, PluginContext, PluginHostError, PluginModule,
    PluginRegistry, PluginResult, PluginTable, QuestionPlugin,
};
use lexibattle_types::{Difficulty, RoundOutcome, VocabPool, VocabularyEntry};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

// ── Backend ───────────────────────────────────────────────────────

pub struct WordsBackend {
    rows: Vec<Value>,
}

impl WordsBackend {
    pub fn with_words(n: usize) -> Self {
        let rows = (0..n)
            .map(|i| json!({ "term": format!("Wort{i}"), "translation": format!("word{i}") }))
            .collect();
        Self { rows }
    }
}

#[async_trait]
impl VocabularyBackend for WordsBackend {
    async fn query(&self, request: &QueryRequest) -> BackendResult<Vec<Value>> {
        let rows = match request.bounds {
            Some(QueryBounds::Limit(n)) => self.rows.iter().take(n).cloned().collect(),
            Some(QueryBounds::Range(window)) => self
                .rows
                .iter()
                .skip(window.offset)
                .take(window.size)
                .cloned()
                .collect(),
            None => self.rows.clone(),
        };
        Ok(rows)
    }

    async fn count(&self, _table: &str) -> BackendResult<usize> {
        Ok(self.rows.len())
    }
}

// ── Event log ─────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

// ── Plugin ────────────────────────────────────────────────────────

/// How the plugin exposes the entry just answered.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum AnswerStyle {
    /// Through `answered_entry`.
    Entry,
    /// Through `current_data` as `{"target": {"word", "meaning"}}`.
    Data,
}

pub struct RecordingPlugin {
    name: String,
    caps: PluginCapabilities,
    style: AnswerStyle,
    log: EventLog,
    fail_activation: bool,
    panic_activation: bool,
    pool: Mutex<VocabPool>,
    answer: Mutex<Option<VocabularyEntry>>,
    reporter: Mutex<Option<AnswerReporter>>,
    destroyed: Mutex<bool>,
}

impl RecordingPlugin {
    pub fn new(name: &str, caps: PluginCapabilities, log: EventLog) -> Self {
        Self {
            name: name.to_string(),
            caps,
            style: AnswerStyle::Entry,
            log,
            fail_activation: false,
            panic_activation: false,
            pool: Mutex::new(Arc::new(Vec::new())),
            answer: Mutex::new(None),
            reporter: Mutex::new(None),
            destroyed: Mutex::new(false),
        }
    }

    pub fn style(mut self, style: AnswerStyle) -> Self {
        self.style = style;
        self
    }

    pub fn failing_activation(mut self) -> Self {
        self.fail_activation = true;
        self
    }

    pub fn panicking_activation(mut self) -> Self {
        self.panic_activation = true;
        self
    }

    pub fn with_pool(self, pool: VocabPool) -> Self {
        *self.answer.lock().unwrap() = pool.first().cloned();
        *self.pool.lock().unwrap() = pool;
        self
    }

    pub fn pool_len(&self) -> usize {
        self.pool.lock().unwrap().len()
    }

    pub fn is_destroyed(&self) -> bool {
        *self.destroyed.lock().unwrap()
    }

    pub fn set_answer(&self, term: &str, translation: &str) {
        *self.answer.lock().unwrap() = Some(VocabularyEntry::new(term, translation));
    }

    pub fn report_correct(&self, hits: u32, advance_next: bool) {
        let reporter = self.reporter.lock().unwrap().clone();
        if let Some(reporter) = reporter {
            reporter.correct(hits, advance_next);
        }
    }

    pub fn report_wrong(&self) {
        let reporter = self.reporter.lock().unwrap().clone();
        if let Some(reporter) = reporter {
            reporter.wrong();
        }
    }

    async fn activate(&self, hook: &str, difficulty: Difficulty) -> PluginResult<()> {
        self.log
            .push(format!("{hook}:{}:{}", self.name, difficulty.level()));
        if self.panic_activation {
            panic!("{} has no prompts", self.name);
        }
        if self.fail_activation {
            return Err(PluginHostError::ActivationFailed {
                plugin: self.name.clone(),
                message: "no prompts for this difficulty".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl QuestionPlugin for RecordingPlugin {
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
        self.log.push(format!("inject:{}:{}", self.name, pool.len()));
        *self.answer.lock().unwrap() = pool.first().cloned();
        *self.pool.lock().unwrap() = pool;
        *self.destroyed.lock().unwrap() = false;
    }

    async fn init(&self, difficulty: Difficulty) -> PluginResult<()> {
        self.activate("init", difficulty).await
    }

    async fn load(&self, difficulty: Difficulty) -> PluginResult<()> {
        self.activate("load", difficulty).await
    }

    fn destroy(&self) {
        self.log.push(format!("destroy:{}", self.name));
        *self.destroyed.lock().unwrap() = true;
        *self.reporter.lock().unwrap() = None;
    }

    fn current_data(&self) -> Option<Value> {
        if self.style != AnswerStyle::Data {
            return None;
        }
        let answer = self.answer.lock().unwrap().clone()?;
        Some(json!({
            "prompt": "Choose the meaning",
            "target": { "word": answer.term, "meaning": answer.translation },
        }))
    }

    fn answered_entry(&self) -> Option<VocabularyEntry> {
        if self.style != AnswerStyle::Entry {
            return None;
        }
        self.answer.lock().unwrap().clone()
    }
}

/// Keeps every plugin a factory constructs so tests can drive it.
#[derive(Clone, Default)]
pub struct Built(Arc<Mutex<Vec<Arc<RecordingPlugin>>>>);

impl Built {
    pub fn last(&self) -> Arc<RecordingPlugin> {
        self.0.lock().unwrap().last().cloned().expect("no plugin built")
    }

    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

/// A constructible module building `RecordingPlugin`s named `name`.
pub fn recording_module(
    name: &'static str,
    caps: PluginCapabilities,
    style: AnswerStyle,
    log: EventLog,
    built: Built,
) -> PluginModule {
    PluginModule::constructible(move |ctx: PluginContext| {
        log.push(format!("construct:{name}"));
        let plugin = Arc::new(
            RecordingPlugin::new(name, caps, log.clone())
                .style(style)
                .with_pool(ctx.vocab_pool),
        );
        built.0.lock().unwrap().push(Arc::clone(&plugin));
        Ok(plugin as Arc<dyn QuestionPlugin>)
    })
}

// ── Battle sink ───────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingBattle {
    rounds: Mutex<Vec<RoundOutcome>>,
}

impl RecordingBattle {
    pub fn rounds(&self) -> Vec<RoundOutcome> {
        self.rounds.lock().unwrap().clone()
    }
}

impl BattleSink for RecordingBattle {
    fn process_battle_round(&self, outcome: RoundOutcome) {
        self.rounds.lock().unwrap().push(outcome);
    }
}

// ── Harness ───────────────────────────────────────────────────────

pub fn test_config() -> EngineConfig {
    EngineConfig {
        min_pool_size: 8,
        cache: CacheConfig {
            sample_size: 5,
            batch_size: 10,
            batch_delay_step_ms: 10,
            ready_wait_attempts: 3,
            ready_wait_interval_ms: 10,
            connect_attempts: 3,
            connect_interval_ms: 10,
            count_retry_attempts: 2,
            count_retry_backoff_ms: 10,
            ..CacheConfig::default()
        },
        ..EngineConfig::default()
    }
}

pub struct Harness {
    pub orchestrator: QuestionOrchestrator,
    pub render: Arc<MemoryRenderTarget>,
    pub battle: Arc<RecordingBattle>,
    pub ledger: Arc<MemoryLedger>,
    pub handle: BackendHandle,
}

impl Harness {
    pub fn new(config: EngineConfig, backend: Option<WordsBackend>, table: PluginTable) -> Self {
        Self::with_router(config.router.clone(), config, backend, table)
    }

    pub fn with_router(
        router_config: RouterConfig,
        config: EngineConfig,
        backend: Option<WordsBackend>,
        table: PluginTable,
    ) -> Self {
        let handle = BackendHandle::new();
        if let Some(backend) = backend {
            handle.install(Arc::new(backend));
        }
        let cache = Arc::new(VocabularyCache::new(config.cache.clone(), handle.clone()));
        let registry = Arc::new(PluginRegistry::new(Arc::new(table)));
        let render = Arc::new(MemoryRenderTarget::new());
        let battle = Arc::new(RecordingBattle::default());
        let ledger = Arc::new(MemoryLedger::new());
        let router = Arc::new(
            AnswerRouter::new(router_config)
                .with_battle(battle.clone())
                .with_ledger(ledger.clone()),
        );
        let orchestrator =
            QuestionOrchestrator::new(config, cache, registry, render.clone(), router);
        Self {
            orchestrator,
            render,
            battle,
            ledger,
            handle,
        }
    }
}
