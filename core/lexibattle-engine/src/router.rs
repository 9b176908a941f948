//! Routes plugin answer reports to the battle subsystem and the history
//! ledger.

use crate::config::RouterConfig;
use lexibattle_plugin_host::{AnswerListener, QuestionPlugin};
use lexibattle_types::{AnswerHistoryEntry, InstanceId, RoundOutcome};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::time::Instant;
use tracing::{debug, trace, warn};

/// The battle/progression subsystem.
pub trait BattleSink: Send + Sync {
    fn process_battle_round(&self, outcome: RoundOutcome);
}

/// Append-only list of answered entries shown to the player.
pub trait HistoryLedger: Send + Sync {
    fn append(&self, entry: &AnswerHistoryEntry);
}

/// Ledger kept in memory.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: Mutex<Vec<AnswerHistoryEntry>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AnswerHistoryEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl HistoryLedger for MemoryLedger {
    fn append(&self, entry: &AnswerHistoryEntry) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry.clone());
    }
}

#[derive(Default)]
struct RouterState {
    active: Option<(InstanceId, Arc<dyn QuestionPlugin>)>,
    last_accepted: Option<Instant>,
    keys: HashSet<String>,
    history: Vec<AnswerHistoryEntry>,
}

/// Receives every `AnswerReporter` call.
///
/// Only the instance marked active is heard; reports from retired instances
/// are dropped. Correct reports inside the debounce window of the previous
/// accepted one are dropped as well.
pub struct AnswerRouter {
    config: RouterConfig,
    battle: Option<Arc<dyn BattleSink>>,
    ledger: Option<Arc<dyn HistoryLedger>>,
    state: Mutex<RouterState>,
}

impl AnswerRouter {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            battle: None,
            ledger: None,
            state: Mutex::new(RouterState::default()),
        }
    }

    pub fn with_battle(mut self, battle: Arc<dyn BattleSink>) -> Self {
        self.battle = Some(battle);
        self
    }

    pub fn with_ledger(mut self, ledger: Arc<dyn HistoryLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    fn state(&self) -> MutexGuard<'_, RouterState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Makes `instance` the only instance whose reports are heard.
    ///
    /// The debounce window restarts, so the first correct report of a new
    /// round is never dropped because of the previous round.
    pub(crate) fn activate(&self, instance: InstanceId, plugin: Arc<dyn QuestionPlugin>) {
        let mut state = self.state();
        state.active = Some((instance, plugin));
        state.last_accepted = None;
    }

    /// Stops hearing `instance`. Returns whether it was the active one.
    pub(crate) fn retire(&self, instance: InstanceId) -> bool {
        let mut state = self.state();
        if state.active.as_ref().is_some_and(|(id, _)| *id == instance) {
            state.active = None;
            true
        } else {
            false
        }
    }

    pub fn is_current(&self, instance: InstanceId) -> bool {
        matches!(&self.state().active, Some((id, _)) if *id == instance)
    }

    pub fn current_instance(&self) -> Option<InstanceId> {
        self.state().active.as_ref().map(|(id, _)| *id)
    }

    /// Ledger entries recorded by this router, in answer order.
    pub fn history(&self) -> Vec<AnswerHistoryEntry> {
        self.state().history.clone()
    }

    fn record(&self, entry: AnswerHistoryEntry) {
        let fresh = {
            let mut state = self.state();
            if state.keys.insert(entry.key()) {
                state.history.push(entry.clone());
                true
            } else {
                false
            }
        };
        if !fresh {
            trace!(term = %entry.term, "Entry already in history");
            return;
        }
        if let Some(ledger) = &self.ledger {
            ledger.append(&entry);
        }
    }

    fn forward(&self, outcome: RoundOutcome) {
        match &self.battle {
            Some(battle) => battle.process_battle_round(outcome),
            None => trace!(?outcome, "No battle subsystem; outcome not forwarded"),
        }
    }
}

impl AnswerListener for AnswerRouter {
    fn on_correct(&self, instance: InstanceId, hits: u32, advance_next: bool) {
        let plugin = {
            let mut state = self.state();
            let plugin = match &state.active {
                Some((id, plugin)) if *id == instance => Arc::clone(plugin),
                _ => {
                    debug!(instance = %instance, "Dropping report from retired instance");
                    return;
                }
            };
            let now = Instant::now();
            if let Some(last) = state.last_accepted {
                if now.duration_since(last) < self.config.debounce() {
                    debug!(instance = %instance, "Correct report debounced");
                    return;
                }
            }
            state.last_accepted = Some(now);
            plugin
        };

        match answered_entry(plugin.as_ref()) {
            Some(entry) => self.record(entry),
            None => warn!(
                plugin = plugin.name(),
                "Correct answer reported without an identifiable entry"
            ),
        }
        self.forward(RoundOutcome::correct(hits, advance_next));
    }

    fn on_wrong(&self, instance: InstanceId) {
        if !self.is_current(instance) {
            debug!(instance = %instance, "Dropping report from retired instance");
            return;
        }
        self.forward(RoundOutcome::wrong());
    }
}

fn answered_entry(plugin: &dyn QuestionPlugin) -> Option<AnswerHistoryEntry> {
    plugin
        .answered_entry()
        .map(AnswerHistoryEntry::from)
        .or_else(|| plugin.current_data().and_then(|data| entry_from_data(&data)))
}

const TERM_FIELDS: &[&str] = &["term", "word"];
const TRANSLATION_FIELDS: &[&str] = &["translation", "meaning"];
const ENTRY_CONTAINERS: &[&str] = &["entry", "target", "correct", "current"];

/// Extracts the answered entry from a plugin's round payload.
///
/// Accepts `{term, translation}` and `{word, meaning}` either at the top
/// level or nested under `entry`, `target`, `correct` or `current`.
pub fn entry_from_data(data: &Value) -> Option<AnswerHistoryEntry> {
    pair_at(data).or_else(|| {
        ENTRY_CONTAINERS
            .iter()
            .filter_map(|key| data.get(*key))
            .find_map(pair_at)
    })
}

fn pair_at(value: &Value) -> Option<AnswerHistoryEntry> {
    let field = |names: &[&str]| {
        names
            .iter()
            .filter_map(|name| value.get(*name).and_then(Value::as_str))
            .find(|s| !s.trim().is_empty())
            .map(str::to_string)
    };
    Some(AnswerHistoryEntry {
        term: field(TERM_FIELDS)?,
        translation: field(TRANSLATION_FIELDS)?,
    })
}
