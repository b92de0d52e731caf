//! Error types for the catalog loader.

use thiserror::Error;

/// Errors that can occur while loading the catalog.
///
/// None of these are fatal to the application: the registry is emptied and the UI
/// shows its empty state.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned a non-success status
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The response decoded but reported `success: false`
    #[error("Catalog rejected the request")]
    Rejected,

    /// Invalid catalog URL
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse the response body
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Server is offline or unreachable
    #[error("Catalog unreachable: {0}")]
    Unreachable(String),
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
