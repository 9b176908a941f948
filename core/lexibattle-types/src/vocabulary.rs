//! Vocabulary entries, cache readiness and background load windows.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A term/translation pair used to build quiz prompts.
///
/// Entries are immutable once fetched. The cache does not enforce
/// uniqueness unless deduplication is switched on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub term: String,
    pub translation: String,
}

impl VocabularyEntry {
    pub fn new(term: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            translation: translation.into(),
        }
    }

    /// Rejects entries whose term or translation is blank.
    pub fn validate(&self) -> crate::Result<()> {
        if self.term.trim().is_empty() {
            return Err(crate::Error::InvalidEntry("empty term".into()));
        }
        if self.translation.trim().is_empty() {
            return Err(crate::Error::InvalidEntry(format!(
                "empty translation for '{}'",
                self.term
            )));
        }
        Ok(())
    }

    /// Normalized `"term — translation"` key used for deduplication.
    pub fn key(&self) -> String {
        normalized_key(&self.term, &self.translation)
    }
}

impl fmt::Display for VocabularyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} — {}", self.term, self.translation)
    }
}

/// Immutable snapshot of cached entries handed to plugins.
pub type VocabPool = Arc<Vec<VocabularyEntry>>;

/// Builds the normalized `"term — translation"` key.
///
/// Whitespace runs collapse to one space, ends are trimmed and both halves
/// are lowercased, so `" Haus "` and `"haus"` produce the same key.
pub fn normalized_key(term: &str, translation: &str) -> String {
    format!("{} — {}", normalize_part(term), normalize_part(translation))
}

fn normalize_part(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Readiness of the vocabulary cache.
///
/// Starts as `Loading` and settles exactly once into `Ready` or `Error`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    #[default]
    Loading,
    Ready,
    Error,
}

impl CacheState {
    /// Returns true once the state can no longer change.
    pub fn is_settled(self) -> bool {
        !matches!(self, Self::Loading)
    }

    /// Only `Loading -> Ready` and `Loading -> Error` are legal.
    pub fn can_transition_to(self, next: CacheState) -> bool {
        matches!(
            (self, next),
            (Self::Loading, Self::Ready) | (Self::Loading, Self::Error)
        )
    }
}

impl fmt::Display for CacheState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// One background fetch: `size` records starting at `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadWindow {
    pub offset: usize,
    pub size: usize,
}

impl LoadWindow {
    pub fn new(offset: usize, size: usize) -> Self {
        Self { offset, size }
    }

    /// Exclusive end of the window.
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.size)
    }

    /// Plans contiguous windows covering `start..total`.
    ///
    /// The last window is clipped to `total`. Returns nothing when the
    /// cache already covers the total or when `batch_size` is zero.
    pub fn plan_until(start: usize, total: usize, batch_size: usize) -> Vec<LoadWindow> {
        if batch_size == 0 {
            return Vec::new();
        }
        let mut windows = Vec::new();
        let mut offset = start;
        while offset < total {
            let size = batch_size.min(total - offset);
            windows.push(LoadWindow::new(offset, size));
            offset += size;
        }
        windows
    }

    /// Plans at most `limit` full-size windows from `start` when the total
    /// record count is unknown.
    pub fn plan_blind(start: usize, batch_size: usize, limit: usize) -> Vec<LoadWindow> {
        if batch_size == 0 {
            return Vec::new();
        }
        (0..limit)
            .map(|i| LoadWindow::new(start + i * batch_size, batch_size))
            .collect()
    }
}
