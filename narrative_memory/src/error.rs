//! Error types for the memory engine.
//!
//! Missing entities, malformed directives and malformed emotion codes are not
//! errors anywhere in this crate; only the outside collaborators can fail.

use thiserror::Error;

use crate::session::SessionId;

/// Failure of the external session store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown session: {0}")]
    UnknownSession(SessionId),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Failure of the language-model collaborator.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Language model unavailable: {0}")]
    Unavailable(String),

    #[error("Language model returned an empty completion")]
    EmptyCompletion,
}

/// Failure to load engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Failure of a narrative turn. State is never mutated when this is returned.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("No active session")]
    NoActiveSession,
}
