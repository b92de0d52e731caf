//! Error types for audio engines

use std::time::Duration;
use thiserror::Error;

/// Engine errors
///
/// Raised by backends and engines. The coordinator never hands these to callers: an
/// acquire failure turns into simulated playback and a rejected seek is logged.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Bundled asset is missing
    #[error("Audio asset not found: {0}")]
    AssetNotFound(String),

    /// Remote audio could not be fetched
    #[error("Network error: {0}")]
    Network(String),

    /// Audio data could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Output device could not be opened or driven
    #[error("Output error: {0}")]
    Output(String),

    /// Acquire took longer than allowed
    #[error("Acquire timed out after {0:?}")]
    Timeout(Duration),

    /// Operation on an engine that was already released
    #[error("Engine released")]
    Released,

    /// Engine rejected a seek
    #[error("Seek failed: {0}")]
    Seek(String),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
