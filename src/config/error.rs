//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid grounding mode: {0}")]
    InvalidGroundingMode(String),

    #[error("Relevance threshold for '{search_type}' must be within [0, 1], got {value}")]
    ThresholdOutOfRange {
        search_type: &'static str,
        value: f64,
    },

    #[error("max_results for '{0}' must be at least 1")]
    ZeroMaxResults(&'static str),

    #[error("max_iterations must be at least 1")]
    ZeroMaxIterations,

    #[error("Credential pool for '{0}' is empty")]
    EmptyCredentialPool(&'static str),
}
