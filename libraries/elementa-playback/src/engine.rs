//! Platform-agnostic audio engine traits
//!
//! Abstracts the audio engine so the session drives real and simulated playback through
//! the same interface (cpal + symphonia on desktop, a synthetic ticker otherwise).

use crate::error::Result;
use async_trait::async_trait;
use elementa_core::AudioReference;
use serde::{Deserialize, Serialize};

/// Live status reported by an engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatus {
    /// Current playback position
    pub position_ms: u64,

    /// Total duration, 0 if unknown
    pub duration_ms: u64,

    /// Whether audio is advancing
    pub is_playing: bool,

    /// Whether the end was reached
    pub finished: bool,
}

/// One loaded audio stream
///
/// Engines are positioned at 0 and paused when handed out by a backend. They are owned
/// by exactly one session and never shared.
pub trait AudioEngine: Send {
    /// Start or resume playback
    ///
    /// Has no effect once the engine has finished.
    fn play(&mut self) -> Result<()>;

    /// Pause playback, keeping the position
    fn pause(&mut self) -> Result<()>;

    /// Move to a position
    ///
    /// The target is clamped to `[0, duration]`; returns the position actually applied.
    fn seek(&mut self, position_ms: u64) -> Result<u64>;

    /// Current status
    fn status(&mut self) -> EngineStatus;

    /// Stop and free every resource
    ///
    /// Safe to call more than once. Other operations fail with
    /// [`EngineError::Released`](crate::EngineError::Released) afterwards.
    fn release(&mut self);
}

/// Source of real audio engines
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Resolve a reference and load it into a new, paused engine
    ///
    /// This is the only suspending engine operation (file read, network fetch, decode).
    async fn acquire(&self, reference: &AudioReference) -> Result<Box<dyn AudioEngine>>;
}

/// Backend with no real audio
///
/// Every acquire fails, so playback always falls back to simulated mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentBackend;

#[async_trait]
impl AudioBackend for SilentBackend {
    async fn acquire(&self, reference: &AudioReference) -> Result<Box<dyn AudioEngine>> {
        Err(crate::EngineError::Output(format!(
            "no audio output available for {}",
            reference
        )))
    }
}
