//! Core type definitions for Lexibattle.
//!
//! This crate defines the plain value types shared by the cache, the plugin
//! host and the question engine:
//! - Vocabulary entries and the shared vocabulary pool
//! - Cache readiness state and background load windows
//! - Question-type identifiers, descriptors and difficulty levels
//! - Question instance identifiers (UUID v7)
//! - Answer history entries and battle round outcomes
//!
//! Nothing here performs I/O.

mod ids;
mod outcome;
mod question;
mod vocabulary;

pub use ids::InstanceId;
pub use outcome::{AnswerHistoryEntry, RoundOutcome};
pub use question::{Difficulty, QuestionTypeDescriptor, QuestionTypeId};
pub use vocabulary::{normalized_key, CacheState, LoadWindow, VocabPool, VocabularyEntry};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid difficulty: {0}")]
    InvalidDifficulty(String),

    #[error("invalid vocabulary entry: {0}")]
    InvalidEntry(String),
}
