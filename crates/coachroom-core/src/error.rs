//! Core error types for coachroom-core.
//!
//! Almost nothing in the cue pipeline is fatal: phrase-store and playback
//! failures are caught at the component boundary, logged, and degrade to a
//! skipped cue. These types exist for the few surfaces that do report errors
//! (configuration loading, store adapters, CLI plumbing).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for coachroom-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Phrase-pool errors
    #[error("Phrase pool error: {0}")]
    Phrase(#[from] PhraseError),

    /// Audio sink errors
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Errors from a phrase-pool store.
///
/// The response selector catches these, logs them, and treats the query as
/// "no candidates" -- they never reach the timeline.
#[derive(Error, Debug)]
pub enum PhraseError {
    /// The backing store could not be reached
    #[error("Phrase store unavailable: {0}")]
    StoreUnavailable(String),

    /// A query against the store failed
    #[error("Phrase query failed: {0}")]
    QueryFailed(String),

    /// Recording a phrase as used failed
    #[error("Failed to mark phrase '{id}' used: {message}")]
    MarkUsedFailed { id: String, message: String },
}

/// Errors from tone or speech sinks.
///
/// Swallowed and logged at the primitive level: a missed cue must never halt
/// the timeline.
#[derive(Error, Debug)]
pub enum AudioError {
    /// No output device available
    #[error("Audio device not available: {0}")]
    DeviceNotAvailable(String),

    /// Playback failed mid-flight
    #[error("Playback failed: {0}")]
    PlaybackFailed(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A duration that must be positive was not
    #[error("Invalid duration for '{field}': {value_sec}s")]
    InvalidDuration { field: String, value_sec: i64 },

    /// Empty collection
    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
