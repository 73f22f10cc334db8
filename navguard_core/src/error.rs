//! Error types for NavGuard

use thiserror::Error;

/// Main error type for the NavGuard runtime and library
#[derive(Debug, Error)]
pub enum NavGuardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The environment model could not answer a collision query.
    /// Callers must treat this as "cannot verify", never as "clear".
    #[error("Collision query failed: {0}")]
    QueryFailure(String),

    /// Robot or environment model could not be constructed
    #[error("Model load failure: {0}")]
    ModelLoad(String),

    #[error("Communication error: {0}")]
    Communication(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl NavGuardError {
    pub fn config(msg: impl Into<String>) -> Self {
        NavGuardError::Config(msg.into())
    }

    pub fn query_failure(msg: impl Into<String>) -> Self {
        NavGuardError::QueryFailure(msg.into())
    }

    pub fn model_load(msg: impl Into<String>) -> Self {
        NavGuardError::ModelLoad(msg.into())
    }

    /// Whether the error is recoverable at runtime (rollout keeps serving commands)
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, NavGuardError::ModelLoad(_))
    }
}

impl From<toml::de::Error> for NavGuardError {
    fn from(e: toml::de::Error) -> Self {
        NavGuardError::Config(e.to_string())
    }
}

/// Result type alias for NavGuard operations
pub type NavGuardResult<T> = Result<T, NavGuardError>;
