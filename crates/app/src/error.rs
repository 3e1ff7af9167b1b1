//! Application error types.

use domain::DomainError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by the shop binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A domain operation failed.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// The tracing subscriber could not be installed.
    #[error("Tracing setup failed: {0}")]
    Tracing(#[from] tracing_subscriber::util::TryInitError),

    /// The metrics recorder could not be installed.
    #[error("Metrics setup failed: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    /// Output could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
