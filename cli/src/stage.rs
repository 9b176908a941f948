//! The console stage: the single place a question shows its prompt and
//! takes typed answers.

use std::sync::{Arc, Mutex, MutexGuard};

/// Result of a submitted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    /// Wrong, with the expected answer.
    Wrong { expected: String },
    /// Nothing is mounted.
    Idle,
}

/// A question that can be answered from the terminal.
pub trait Answerable: Send + Sync {
    fn prompt(&self) -> Option<String>;
    fn submit(&self, input: &str) -> Verdict;
}

/// Holds the question currently mounted on the console.
#[derive(Default)]
pub struct Stage {
    mounted: Mutex<Option<Arc<dyn Answerable>>>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<Arc<dyn Answerable>>> {
        self.mounted.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn mount(&self, question: Arc<dyn Answerable>) {
        *self.slot() = Some(question);
    }

    /// Clears the stage if `question` is the one mounted.
    pub fn unmount(&self, question: &Arc<dyn Answerable>) {
        let mut slot = self.slot();
        if slot
            .as_ref()
            .is_some_and(|m| std::ptr::addr_eq(Arc::as_ptr(m), Arc::as_ptr(question)))
        {
            *slot = None;
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.slot().is_some()
    }

    pub fn prompt(&self) -> Option<String> {
        let mounted = self.slot().clone()?;
        mounted.prompt()
    }

    pub fn submit(&self, input: &str) -> Verdict {
        let mounted = self.slot().clone();
        match mounted {
            Some(question) => question.submit(input),
            None => Verdict::Idle,
        }
    }
}
