//! Error taxonomy surfaced at the `load_type` boundary.

use lexibattle_cache::CacheError;
use lexibattle_plugin_host::PluginHostError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The backend handle never appeared within the attempt budget.
    #[error("backend unavailable after {attempts} attempts")]
    BackendUnavailable { attempts: u32 },

    /// A backend query failed or returned nothing usable.
    #[error("fetch failed: {0}")]
    FetchFailed(String),

    /// No vocabulary could be obtained for the round.
    #[error("vocabulary unavailable: {0}")]
    CacheUnavailable(String),

    #[error("could not load question type '{type_id}': {reason}")]
    PluginLoadFailed { type_id: String, reason: String },

    /// The plugin declares neither (or both) of `init` and `load`.
    #[error("question plugin '{plugin}' is malformed: {detail}")]
    PluginShapeInvalid { plugin: String, detail: String },

    #[error("could not construct question type '{type_id}': {message}")]
    ConstructionFailed { type_id: String, message: String },

    #[error("question plugin '{plugin}' failed to activate: {message}")]
    ActivationFailed { plugin: String, message: String },

    #[error("config error: {0}")]
    Config(String),
}

impl EngineError {
    /// Short text for the failure view.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BackendUnavailable { .. } | Self::FetchFailed(_) | Self::CacheUnavailable(_) => {
                "Could not load vocabulary. Check your connection and reload."
            }
            Self::PluginLoadFailed { .. } => "This question type could not be loaded.",
            Self::PluginShapeInvalid { .. }
            | Self::ConstructionFailed { .. }
            | Self::ActivationFailed { .. } => "This question type failed to start.",
            Self::Config(_) => "The game configuration is invalid.",
        }
    }
}

impl From<CacheError> for EngineError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::BackendUnavailable { attempts } => Self::BackendUnavailable { attempts },
            CacheError::FetchFailed(reason) => Self::FetchFailed(reason),
            CacheError::CacheUnavailable(reason) => Self::CacheUnavailable(reason),
        }
    }
}

impl From<PluginHostError> for EngineError {
    fn from(err: PluginHostError) -> Self {
        match err {
            PluginHostError::PluginLoadFailed { type_id, reason } => {
                Self::PluginLoadFailed { type_id, reason }
            }
            PluginHostError::PluginShapeInvalid { plugin, detail } => {
                Self::PluginShapeInvalid { plugin, detail }
            }
            PluginHostError::ConstructionFailed { type_id, message } => {
                Self::ConstructionFailed { type_id, message }
            }
            PluginHostError::CapabilityNotSupported { plugin, capability } => {
                Self::ActivationFailed {
                    plugin,
                    message: format!("'{capability}' is not supported"),
                }
            }
            PluginHostError::ActivationFailed { plugin, message } => {
                Self::ActivationFailed { plugin, message }
            }
            PluginHostError::Config(e) => Self::Config(e.to_string()),
        }
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
