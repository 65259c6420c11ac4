use crate::storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum EngineError {
    /// The snapshot references a tournament, course, or tier it does not contain.
    #[error("missing reference: {0}")]
    MissingReference(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("a run for tournament {0} is already in progress")]
    RunInProgress(i64),
    #[error("{0}")]
    Other(String),
}

impl EngineError {
    /// Fatal errors abort the run; the orchestrator may retry the whole run.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::RunInProgress(_))
    }
}

impl From<StorageError> for EngineError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for EngineError {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}

impl From<&str> for EngineError {
    fn from(err: &str) -> Self {
        Self::Other(err.to_string())
    }
}
