//! Answer history entries and battle round outcomes.

use crate::vocabulary::{normalized_key, VocabularyEntry};
use serde::{Deserialize, Serialize};

/// One line of the answer-history ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnswerHistoryEntry {
    pub term: String,
    pub translation: String,
}

impl AnswerHistoryEntry {
    /// Normalized `"term — translation"` key; the ledger holds each key once.
    pub fn key(&self) -> String {
        normalized_key(&self.term, &self.translation)
    }
}

impl From<VocabularyEntry> for AnswerHistoryEntry {
    fn from(entry: VocabularyEntry) -> Self {
        Self {
            term: entry.term,
            translation: entry.translation,
        }
    }
}

impl From<&VocabularyEntry> for AnswerHistoryEntry {
    fn from(entry: &VocabularyEntry) -> Self {
        Self {
            term: entry.term.clone(),
            translation: entry.translation.clone(),
        }
    }
}

/// The normalized signal forwarded to the battle subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub hits: u32,
    pub misses: u32,
    pub advance_next: bool,
}

impl RoundOutcome {
    pub fn correct(hits: u32, advance_next: bool) -> Self {
        Self {
            hits,
            misses: 0,
            advance_next,
        }
    }

    pub fn wrong() -> Self {
        Self {
            hits: 0,
            misses: 1,
            advance_next: false,
        }
    }
}
