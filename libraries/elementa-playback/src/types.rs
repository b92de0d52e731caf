//! Core types for the playback session

use elementa_core::{Item, ItemId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Synthetic duration used when no real audio is available (3 minutes)
pub const DEFAULT_SIMULATED_DURATION_MS: u64 = 180_000;

/// Coordinator state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Nothing loaded
    #[default]
    Stopped,

    /// Acquiring an engine for the active item
    Loading,

    /// Currently playing
    Playing,

    /// Paused, or finished
    Paused,
}

/// What is producing the position updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackMode {
    /// A real audio engine
    Real,

    /// A synthetic ticker standing in for missing or broken audio
    Simulated,
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real => f.write_str("real"),
            Self::Simulated => f.write_str("simulated"),
        }
    }
}

/// Playback configuration
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// How often the active engine is polled (default: 500ms)
    pub status_interval: Duration,

    /// Upper bound on acquiring an engine (default: 10s)
    pub acquire_timeout: Duration,

    /// Duration of simulated playback in milliseconds (default: 180000)
    pub simulated_duration_ms: u64,

    /// Maximum history size (default: 50)
    pub history_size: usize,

    /// Event channel capacity (default: 64)
    pub event_capacity: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            status_interval: Duration::from_millis(500),
            acquire_timeout: Duration::from_secs(10),
            simulated_duration_ms: DEFAULT_SIMULATED_DURATION_MS,
            history_size: 50,
            event_capacity: 64,
        }
    }
}

/// What every observer sees
///
/// Published through a watch channel; observers never touch the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Current playback attempt; bumped on every play and stop
    pub generation: u64,

    /// Item being played or displayed
    pub active_item: Option<Item>,

    /// Coordinator state
    pub state: PlaybackState,

    /// Engine kind, `None` while stopped or loading
    pub mode: Option<PlaybackMode>,

    /// Playback position
    pub position_ms: u64,

    /// Total duration, 0 while unknown
    pub duration_ms: u64,

    /// Whether the item played to its end
    pub finished: bool,
}

impl SessionSnapshot {
    /// Id of the active item
    pub fn active_item_id(&self) -> Option<ItemId> {
        self.active_item.as_ref().map(|item| item.id)
    }

    /// Whether audio (real or simulated) is advancing
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Position as a fraction of the duration, in `[0, 1]`
    pub fn progress(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        (self.position_ms as f64 / self.duration_ms as f64).clamp(0.0, 1.0)
    }
}

/// Format milliseconds as `m:ss` for progress displays
///
/// Zero renders as `00:00`.
pub fn format_millis(ms: u64) -> String {
    if ms == 0 {
        return "00:00".to_string();
    }
    let total_seconds = ms / 1000;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}
