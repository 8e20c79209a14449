//! Error types for rendergrid

use thiserror::Error;

/// Main error type for rendergrid
#[derive(Error, Debug)]
pub enum RendergridError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Telemetry error
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    /// Scheduler error
    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// Failed to launch a render process
    #[error("Launch error: {0}")]
    Launch(String),

    /// GPU error
    #[error("GPU error: {0}")]
    Gpu(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for rendergrid operations
pub type RendergridResult<T> = Result<T, RendergridError>;

impl From<toml::de::Error> for RendergridError {
    fn from(err: toml::de::Error) -> Self {
        RendergridError::Config(err.to_string())
    }
}
