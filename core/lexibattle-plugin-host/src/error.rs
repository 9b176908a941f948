//! Error types for the plugin host.

use thiserror::Error;

/// Result type for plugin host operations.
pub type PluginResult<T> = Result<T, PluginHostError>;

#[derive(Debug, Error)]
pub enum PluginHostError {
    #[error("failed to load plugin for question type '{type_id}': {reason}")]
    PluginLoadFailed { type_id: String, reason: String },

    #[error("plugin '{plugin}' has an invalid shape: {detail}")]
    PluginShapeInvalid { plugin: String, detail: String },

    #[error("constructing plugin for question type '{type_id}' failed: {message}")]
    ConstructionFailed { type_id: String, message: String },

    #[error("capability '{capability}' not supported by plugin '{plugin}'")]
    CapabilityNotSupported { plugin: String, capability: String },

    #[error("plugin '{plugin}' failed to activate: {message}")]
    ActivationFailed { plugin: String, message: String },

    #[error("plugin config error: {0}")]
    Config(#[from] serde_json::Error),
}
