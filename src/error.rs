use crate::aggregator::RegistryError;
use crate::config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LureError {
    #[error("Failed to read input: {path}")]
    ReadInput {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse analysis context from {path}: {source}")]
    ParseInput {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid module registry: {0}")]
    Registry(#[from] RegistryError),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LureError>;
