//! Error types for gaslight-core

use thiserror::Error;

/// Main error type for the gaslight-core library
///
/// Delivery problems are not represented here: they end a replay pass
/// through [`crate::PassOutcome::Halted`] instead of failing the call.
#[derive(Error, Debug)]
pub enum Error {
    /// The queue could not durably commit or read an operation
    #[error("storage fault: {0}")]
    Storage(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP client or runtime could not be constructed
    #[error("transport error: {0}")]
    Transport(String),
}

/// Result type alias for gaslight-core
pub type Result<T> = std::result::Result<T, Error>;
