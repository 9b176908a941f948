//! Question types bundled with the terminal game.

use crate::stage::{Answerable, Stage, Verdict};
use async_trait::async_trait;
use lexibattle_engine::EngineConfig;
use lexibattle_plugin_host::{
    AnswerReporter, PluginCapabilities, PluginContext, PluginHostError, PluginModule,
    PluginResult, PluginTable, QuestionPlugin,
};
use lexibattle_types::{Difficulty, QuestionTypeDescriptor, VocabPool, VocabularyEntry};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tracing::debug;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Builds the plugin table for the bundled question types.
///
/// Question types listed in the config are used as descriptors; without
/// any, `1`/`choice` map to multiple choice and `2`/`spell` to spelling.
pub fn plugin_table(config: &EngineConfig, stage: Arc<Stage>) -> PluginTable {
    let choice_stage = Arc::clone(&stage);
    let mut table = PluginTable::new()
        .with_module(
            MultipleChoice::MODULE,
            PluginModule::constructible(move |ctx| {
                let plugin = MultipleChoice::new(ctx, Arc::clone(&choice_stage))?;
                Ok(plugin as Arc<dyn QuestionPlugin>)
            }),
        )
        .with_module(Spelling::MODULE, PluginModule::Singleton(Spelling::new(stage)));

    let descriptors = if config.question_types.is_empty() {
        vec![
            QuestionTypeDescriptor::new(1u32, MultipleChoice::MODULE).with_label("Multiple choice"),
            QuestionTypeDescriptor::new(2u32, Spelling::MODULE).with_label("Spelling"),
            QuestionTypeDescriptor::new("choice", MultipleChoice::MODULE)
                .with_label("Multiple choice"),
            QuestionTypeDescriptor::new("spell", Spelling::MODULE).with_label("Spelling"),
        ]
    } else {
        config.question_types.clone()
    };
    for descriptor in descriptors {
        table = table.describe(descriptor);
    }
    table
}

// ── Multiple choice ───────────────────────────────────────────────

struct ChoiceRound {
    target: VocabularyEntry,
    options: Vec<String>,
}

/// Shows a term and lets the player pick its translation.
///
/// Constructed fresh every round. The `choices` setting (default 4) is the
/// option count at difficulty 1; each level above adds one.
pub struct MultipleChoice {
    me: Weak<MultipleChoice>,
    stage: Arc<Stage>,
    pool: VocabPool,
    choices: usize,
    option_count: Mutex<usize>,
    round: Mutex<Option<ChoiceRound>>,
    reporter: Mutex<Option<AnswerReporter>>,
    destroyed: AtomicBool,
    rng: Mutex<StdRng>,
}

impl MultipleChoice {
    pub const MODULE: &'static str = "multiple_choice";

    pub fn new(context: PluginContext, stage: Arc<Stage>) -> PluginResult<Arc<Self>> {
        if context.vocab_pool.len() < 2 {
            return Err(PluginHostError::ConstructionFailed {
                type_id: Self::MODULE.to_string(),
                message: format!(
                    "needs at least two entries, got {}",
                    context.vocab_pool.len()
                ),
            });
        }
        let choices = match context.config.get("choices") {
            None | Some(Value::Null) => 4,
            Some(value) => {
                let n: u64 = serde_json::from_value(value.clone())?;
                usize::try_from(n).unwrap_or(usize::MAX)
            }
        }
        .max(2);

        Ok(Arc::new_cyclic(|me| Self {
            me: me.clone(),
            stage,
            pool: context.vocab_pool,
            choices,
            option_count: Mutex::new(choices),
            round: Mutex::new(None),
            reporter: Mutex::new(None),
            destroyed: AtomicBool::new(false),
            rng: Mutex::new(StdRng::from_entropy()),
        }))
    }

    fn next_round(&self) {
        let count = (*lock(&self.option_count)).min(self.pool.len());
        let mut rng = lock(&self.rng);
        let Some(target) = self.pool.choose(&mut *rng).cloned() else {
            return;
        };

        let mut distractors: Vec<&str> = Vec::new();
        for entry in self.pool.iter() {
            let translation = entry.translation.as_str();
            if normalize(translation) != normalize(&target.translation)
                && !distractors.contains(&translation)
            {
                distractors.push(translation);
            }
        }
        let mut options: Vec<String> = distractors
            .choose_multiple(&mut *rng, count.saturating_sub(1))
            .map(|s| s.to_string())
            .collect();
        options.push(target.translation.clone());
        options.shuffle(&mut *rng);
        drop(rng);

        *lock(&self.round) = Some(ChoiceRound { target, options });
    }

    fn reporter(&self) -> Option<AnswerReporter> {
        lock(&self.reporter).clone()
    }

    /// Options of the current round, in display order.
    pub fn options(&self) -> Vec<String> {
        lock(&self.round)
            .as_ref()
            .map(|r| r.options.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl QuestionPlugin for MultipleChoice {
    fn name(&self) -> &str {
        Self::MODULE
    }

    fn capabilities(&self) -> PluginCapabilities {
        PluginCapabilities::with_init().and_destroy()
    }

    fn attach(&self, reporter: AnswerReporter) {
        *lock(&self.reporter) = Some(reporter);
    }

    async fn init(&self, difficulty: Difficulty) -> PluginResult<()> {
        if self.destroyed.load(Ordering::Acquire) {
            return Ok(());
        }
        *lock(&self.option_count) = self
            .choices
            .saturating_add(usize::from(difficulty.level().saturating_sub(1)));
        self.next_round();
        if let Some(me) = self.me.upgrade() {
            self.stage.mount(me);
        }
        Ok(())
    }

    fn destroy(&self) {
        self.destroyed.store(true, Ordering::Release);
        *lock(&self.reporter) = None;
        if let Some(me) = self.me.upgrade() {
            let me: Arc<dyn Answerable> = me;
            self.stage.unmount(&me);
        }
    }

    fn current_data(&self) -> Option<Value> {
        let round = lock(&self.round);
        let round = round.as_ref()?;
        Some(json!({
            "term": round.target.term,
            "translation": round.target.translation,
            "options": round.options,
        }))
    }

    fn answered_entry(&self) -> Option<VocabularyEntry> {
        lock(&self.round).as_ref().map(|r| r.target.clone())
    }
}

impl Answerable for MultipleChoice {
    fn prompt(&self) -> Option<String> {
        let round = lock(&self.round);
        let round = round.as_ref()?;
        let mut prompt = format!("Translate '{}':", round.target.term);
        for (i, option) in round.options.iter().enumerate() {
            prompt.push_str(&format!("\n  {}) {}", i + 1, option));
        }
        Some(prompt)
    }

    fn submit(&self, input: &str) -> Verdict {
        if self.destroyed.load(Ordering::Acquire) {
            return Verdict::Idle;
        }
        let judged = {
            let round = lock(&self.round);
            round.as_ref().map(|round| {
                let input = input.trim();
                let picked = input
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| round.options.get(i))
                    .map_or(input, String::as_str);
                (
                    normalize(picked) == normalize(&round.target.translation),
                    round.target.translation.clone(),
                )
            })
        };
        let Some((correct, expected)) = judged else {
            return Verdict::Idle;
        };

        let reporter = self.reporter();
        if correct {
            if let Some(reporter) = reporter {
                reporter.correct(1, true);
            }
            self.next_round();
            Verdict::Correct
        } else {
            if let Some(reporter) = reporter {
                reporter.wrong();
            }
            Verdict::Wrong { expected }
        }
    }
}

// ── Spelling ──────────────────────────────────────────────────────

/// Shows a translation and asks for the term to be typed.
///
/// One instance serves every round; the vocabulary is swapped in before
/// each round. Lower difficulties reveal the first letters.
pub struct Spelling {
    me: Weak<Spelling>,
    stage: Arc<Stage>,
    pool: Mutex<VocabPool>,
    current: Mutex<Option<VocabularyEntry>>,
    reveal: Mutex<usize>,
    reporter: Mutex<Option<AnswerReporter>>,
    destroyed: AtomicBool,
    rng: Mutex<StdRng>,
}

impl Spelling {
    pub const MODULE: &'static str = "spelling";

    pub fn new(stage: Arc<Stage>) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            stage,
            pool: Mutex::new(Arc::new(Vec::new())),
            current: Mutex::new(None),
            reveal: Mutex::new(0),
            reporter: Mutex::new(None),
            destroyed: AtomicBool::new(false),
            rng: Mutex::new(StdRng::from_entropy()),
        })
    }

    fn next_word(&self) -> bool {
        let pool = Arc::clone(&lock(&self.pool));
        let next = pool.choose(&mut *lock(&self.rng)).cloned();
        let found = next.is_some();
        *lock(&self.current) = next;
        found
    }

    fn hint(&self, term: &str) -> String {
        let reveal = *lock(&self.reveal);
        term.chars()
            .enumerate()
            .map(|(i, c)| if i < reveal || c == ' ' { c } else { '_' })
            .collect()
    }
}

#[async_trait]
impl QuestionPlugin for Spelling {
    fn name(&self) -> &str {
        Self::MODULE
    }

    fn capabilities(&self) -> PluginCapabilities {
        PluginCapabilities::with_load().and_destroy()
    }

    fn attach(&self, reporter: AnswerReporter) {
        *lock(&self.reporter) = Some(reporter);
    }

    fn inject_vocabulary(&self, pool: VocabPool) {
        debug!(entries = pool.len(), "Spelling vocabulary replaced");
        *lock(&self.pool) = pool;
        self.destroyed.store(false, Ordering::Release);
    }

    async fn load(&self, difficulty: Difficulty) -> PluginResult<()> {
        if self.destroyed.load(Ordering::Acquire) {
            return Ok(());
        }
        *lock(&self.reveal) = usize::from(4u8.saturating_sub(difficulty.level()));
        if !self.next_word() {
            return Err(PluginHostError::ActivationFailed {
                plugin: Self::MODULE.to_string(),
                message: "no vocabulary to spell".into(),
            });
        }
        if let Some(me) = self.me.upgrade() {
            self.stage.mount(me);
        }
        Ok(())
    }

    fn destroy(&self) {
        self.destroyed.store(true, Ordering::Release);
        *lock(&self.reporter) = None;
        if let Some(me) = self.me.upgrade() {
            let me: Arc<dyn Answerable> = me;
            self.stage.unmount(&me);
        }
    }

    fn current_data(&self) -> Option<Value> {
        let current = lock(&self.current).clone()?;
        Some(json!({
            "prompt": self.hint(&current.term),
            "target": { "word": current.term, "meaning": current.translation },
        }))
    }
}

impl Answerable for Spelling {
    fn prompt(&self) -> Option<String> {
        let current = lock(&self.current).clone()?;
        Some(format!(
            "Spell the word for '{}': {}",
            current.translation,
            self.hint(&current.term)
        ))
    }

    fn submit(&self, input: &str) -> Verdict {
        if self.destroyed.load(Ordering::Acquire) {
            return Verdict::Idle;
        }
        let Some(current) = lock(&self.current).clone() else {
            return Verdict::Idle;
        };

        let reporter = lock(&self.reporter).clone();
        if normalize(input) == normalize(&current.term) {
            if let Some(reporter) = reporter {
                reporter.correct(1, true);
            }
            self.next_word();
            Verdict::Correct
        } else {
            if let Some(reporter) = reporter {
                reporter.wrong();
            }
            Verdict::Wrong {
                expected: current.term,
            }
        }
    }
}
