//! Error types for datajob.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("the entry '{0}' already exists in the execution input")]
    DuplicateExecutionInput(String),

    #[error("no role provided for '{0}' and the default admin role is not enabled")]
    RoleRequired(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
