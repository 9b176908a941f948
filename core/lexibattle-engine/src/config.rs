//! Engine configuration, read from `lexibattle.toml`.

use crate::error::EngineResult;
use lexibattle_cache::CacheConfig;
use lexibattle_types::{QuestionTypeDescriptor, QuestionTypeId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Answer routing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Correct reports closer together than this are dropped.
    pub debounce_ms: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self { debounce_ms: 600 }
    }
}

impl RouterConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Top-level engine configuration.
///
/// ```toml
/// container_id = "question-container"
/// min_pool_size = 500
///
/// [cache]
/// table = "vocabulary"
/// sample_size = 500
///
/// [router]
/// debounce_ms = 600
///
/// [[question_types]]
/// id = "1"
/// module = "multiple_choice"
/// label = "Multiple choice"
///
/// [plugins.1]
/// choices = 4
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Render target handed to every plugin.
    pub container_id: String,
    /// Pool size requested from the cache on every `load_type`.
    pub min_pool_size: usize,
    pub cache: CacheConfig,
    pub router: RouterConfig,
    /// Question types offered to players.
    pub question_types: Vec<QuestionTypeDescriptor>,
    /// Per-type plugin settings keyed by question-type id.
    pub plugins: HashMap<String, Value>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            container_id: "question-container".to_string(),
            min_pool_size: 500,
            cache: CacheConfig::default(),
            router: RouterConfig::default(),
            question_types: Vec::new(),
            plugins: HashMap::new(),
        }
    }
}

impl EngineConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(contents: &str) -> EngineResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Loads config from `path`.
    ///
    /// A missing or unreadable file yields the defaults, as does a file
    /// that fails to parse.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config file found at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    info!("Loaded engine config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!(
                        "Failed to parse config file {:?}: {}. Falling back to defaults.",
                        path, e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Settings for one question type, `Value::Null` when none are set.
    pub fn plugin_config(&self, type_id: &QuestionTypeId) -> Value {
        self.plugins
            .get(type_id.as_str())
            .cloned()
            .unwrap_or(Value::Null)
    }

    pub fn descriptor(&self, type_id: &QuestionTypeId) -> Option<&QuestionTypeDescriptor> {
        self.question_types.iter().find(|d| &d.id == type_id)
    }
}
