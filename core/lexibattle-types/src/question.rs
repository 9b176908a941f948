//! Question-type identifiers, descriptors and difficulty.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a question-type plugin.
///
/// Accepts both the numeric ids used by older menus (`3`) and named ids
/// (`"spelling"`); numbers are stored in their decimal form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionTypeId(String);

impl QuestionTypeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the numeric form when the id is an integer.
    pub fn as_number(&self) -> Option<u32> {
        self.0.parse().ok()
    }
}

impl From<u32> for QuestionTypeId {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for QuestionTypeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for QuestionTypeId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for QuestionTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps a question-type id to the module that implements it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionTypeDescriptor {
    pub id: QuestionTypeId,
    /// Name of the module the loader resolves.
    pub module: String,
    /// Human-readable label for menus.
    #[serde(default)]
    pub label: Option<String>,
}

impl QuestionTypeDescriptor {
    pub fn new(id: impl Into<QuestionTypeId>, module: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            module: module.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.module)
    }
}

/// Difficulty level passed to a plugin's activation hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(level: u8) -> crate::Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(Self(level))
        } else {
            Err(crate::Error::InvalidDifficulty(format!(
                "{level} is outside {}..={}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn level(self) -> u8 {
        self.0
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Difficulty {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let level = match trimmed.to_ascii_lowercase().as_str() {
            "easy" => 1,
            "medium" => 2,
            "hard" => 3,
            other => other
                .parse::<u8>()
                .map_err(|_| crate::Error::InvalidDifficulty(trimmed.to_string()))?,
        };
        Self::new(level)
    }
}
