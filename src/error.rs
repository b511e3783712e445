use thiserror::Error;

/// Errors that can surface from a callback computation. Startup load errors
/// go through `anyhow` instead and abort the process.
#[derive(Debug, Error)]
pub enum DashError {
    #[error("unknown dataset variant: {0}")]
    UnknownDatasetVariant(String),

    #[error("{kind} not found: {key}")]
    KeyNotFound { kind: &'static str, key: String },

    #[error("unknown page: {0}")]
    UnknownPage(String),

    #[error("unknown control: {0}")]
    UnknownControl(String),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DashError {
    pub fn key_not_found(kind: &'static str, key: impl Into<String>) -> Self {
        DashError::KeyNotFound { kind, key: key.into() }
    }
}
