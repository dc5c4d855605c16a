//! Client error types

use thiserror::Error;

/// Relay channel error
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Connect or transport failure
    #[error("connection error: {0}")]
    Connection(String),

    /// No open confirmation inside the configured window
    #[error("connection timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Outbound frame serialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Catalog lookup error
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with an error envelope
    #[error("catalog rejected query: {code} {message}")]
    Rejected { code: String, message: String },

    /// Response did not match the documented shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
