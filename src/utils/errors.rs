use thiserror::Error;

/// Main error type for crab
#[derive(Error, Debug)]
pub enum CrabError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("History error: {0}")]
    HistoryError(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
