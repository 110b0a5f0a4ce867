use super::config::ConfigError;
use crate::core::io::sdf::SdfError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read input: {0}")]
    Input(#[from] SdfError),

    #[error("Failed to finalize output: {0}")]
    Output(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl EngineError {
    /// Whether the run was rejected before any molecule was read.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
