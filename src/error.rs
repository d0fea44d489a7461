//! Error types for the TradingPal dispatcher

use thiserror::Error;

/// Result type alias for dispatcher operations
pub type Result<T> = std::result::Result<T, DispatchError>;

#[derive(Error, Debug)]
pub enum DispatchError {

    // =============================
    // Core Dispatch Errors
    // =============================

    #[error("No pending suspension for thread: {0}")]
    NoPendingSuspension(String),

    #[error("Expert execution fault: {0}")]
    ExpertExecutionFault(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
