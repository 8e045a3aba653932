use std::sync::Arc;
use thiserror::Error;

/// Main error type for the desk client
#[derive(Error, Debug)]
pub enum DeskError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    // Token / amount errors
    #[error("Unknown token: {0}")]
    UnknownToken(String),

    #[error("Invalid amount: {0}")]
    Amount(String),

    // Crypto/signing errors
    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Signature error: {0}")]
    Signature(String),

    // Transaction store errors
    #[error("Transaction hash {hash} already recorded for a different action")]
    HashReassigned { hash: String },

    #[error("Invalid status transition for {hash}: from {from} to {to}")]
    InvalidTransition {
        hash: String,
        from: String,
        to: String,
    },

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for DeskError
pub type Result<T> = std::result::Result<T, DeskError>;

/// Cloneable error handed out by the query layer.
///
/// Shared in-flight futures need a `Clone` output, so the underlying
/// error is kept behind an `Arc`.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct QueryError(pub Arc<DeskError>);

impl QueryError {
    pub fn inner(&self) -> &DeskError {
        &self.0
    }
}

impl From<DeskError> for QueryError {
    fn from(err: DeskError) -> Self {
        QueryError(Arc::new(err))
    }
}
