//! Append-only entry storage shared by the cache and its background loader.

use lexibattle_types::{VocabPool, VocabularyEntry};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Default)]
pub(crate) struct EntryStore {
    entries: Vec<VocabularyEntry>,
    /// Normalized keys, only tracked when deduplicating.
    keys: HashSet<String>,
    deduplicate: bool,
    /// Backend rows read so far, counted from the start of the table.
    consumed: usize,
}

impl EntryStore {
    pub(crate) fn new(deduplicate: bool) -> Self {
        Self {
            deduplicate,
            ..Self::default()
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends a batch and returns how many entries were kept.
    pub(crate) fn append(&mut self, batch: Vec<VocabularyEntry>) -> usize {
        if !self.deduplicate {
            let added = batch.len();
            self.entries.extend(batch);
            return added;
        }

        let before = self.entries.len();
        for entry in batch {
            if self.keys.insert(entry.key()) {
                self.entries.push(entry);
            }
        }
        self.entries.len() - before
    }

    /// Raises the consumed-rows mark to `through`. Never lowers it.
    pub(crate) fn mark_consumed(&mut self, through: usize) {
        self.consumed = self.consumed.max(through);
    }

    /// Offset of the first backend row not read yet. Differs from `len`
    /// when rows were skipped or deduplicated, or read more than once.
    pub(crate) fn consumed(&self) -> usize {
        self.consumed
    }

    pub(crate) fn snapshot(&self) -> VocabPool {
        Arc::new(self.entries.clone())
    }
}
