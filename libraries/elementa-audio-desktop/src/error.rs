//! Error types for desktop audio

use elementa_playback::EngineError;
use thiserror::Error;

/// Desktop audio errors
#[derive(Debug, Error)]
pub enum AudioError {
    /// No output device is available
    #[error("Audio device not found")]
    DeviceNotFound,

    /// Device configuration could not be queried
    #[error("Device error: {0}")]
    DeviceError(String),

    /// Output stream could not be built
    #[error("Failed to build audio stream: {0}")]
    StreamBuildError(String),

    /// Output stream could not be started
    #[error("Failed to play audio stream: {0}")]
    PlayError(String),

    /// Output stream could not be paused
    #[error("Failed to pause audio stream: {0}")]
    PauseError(String),

    /// The audio thread is gone
    #[error("Audio thread stopped: {0}")]
    ThreadStopped(String),

    /// Sample rate conversion failed
    #[error("Resampling error: {0}")]
    ResampleError(String),

    /// The data is not a format symphonia can read
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// Packets could not be decoded
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Remote audio could not be downloaded
    #[error("Network error: {0}")]
    Network(String),

    /// Nobody is waiting for the engine any more
    #[error("Audio load cancelled")]
    Cancelled,
}

/// Result type for desktop audio operations
pub type Result<T> = std::result::Result<T, AudioError>;

impl From<cpal::BuildStreamError> for AudioError {
    fn from(err: cpal::BuildStreamError) -> Self {
        AudioError::StreamBuildError(err.to_string())
    }
}

impl From<cpal::PlayStreamError> for AudioError {
    fn from(err: cpal::PlayStreamError) -> Self {
        AudioError::PlayError(err.to_string())
    }
}

impl From<cpal::PauseStreamError> for AudioError {
    fn from(err: cpal::PauseStreamError) -> Self {
        AudioError::PauseError(err.to_string())
    }
}

impl From<cpal::DefaultStreamConfigError> for AudioError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        AudioError::DeviceError(err.to_string())
    }
}

impl From<symphonia::core::errors::Error> for AudioError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        use symphonia::core::errors::Error;

        match err {
            Error::Unsupported(what) => AudioError::UnsupportedFormat(what.to_string()),
            other => AudioError::DecodeError(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for AudioError {
    fn from(err: reqwest::Error) -> Self {
        AudioError::Network(err.to_string())
    }
}

impl From<AudioError> for EngineError {
    fn from(err: AudioError) -> Self {
        match err {
            AudioError::Network(message) => EngineError::Network(message),
            AudioError::ResampleError(_)
            | AudioError::UnsupportedFormat(_)
            | AudioError::DecodeError(_) => EngineError::Decode(err.to_string()),
            AudioError::DeviceNotFound
            | AudioError::DeviceError(_)
            | AudioError::StreamBuildError(_)
            | AudioError::PlayError(_)
            | AudioError::PauseError(_)
            | AudioError::ThreadStopped(_)
            | AudioError::Cancelled => EngineError::Output(err.to_string()),
        }
    }
}
