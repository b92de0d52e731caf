//! Playback Events
//!
//! Broadcast to any number of observers alongside the snapshot channel. Events are
//! emitted at key points:
//! - Active item changes (play, stop, display-only selection)
//! - State changes (loading/playing/paused/stopped)
//! - Position updates from the status pump
//! - Fallback to simulated playback
//! - Favorites changes

use crate::types::{PlaybackMode, PlaybackState};
use elementa_core::ItemId;
use serde::{Deserialize, Serialize};

/// Events emitted by the session coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// The active item changed
    ItemChanged {
        /// New active item, `None` after stop
        item_id: Option<ItemId>,
        /// Previously active item
        previous_item_id: Option<ItemId>,
    },

    /// Coordinator state changed
    StateChanged {
        /// The new state
        state: PlaybackState,
        /// Engine kind behind the state
        mode: Option<PlaybackMode>,
    },

    /// Position update (periodic, every status interval)
    PositionUpdate {
        /// Current playback position
        position_ms: u64,
        /// Total duration
        duration_ms: u64,
    },

    /// No real audio could be played; a synthetic ticker took over
    SimulatedFallback {
        /// Item that fell back
        item_id: ItemId,
        /// Why real playback was not possible
        reason: String,
    },

    /// Item played to its end
    PlaybackFinished {
        /// ID of the finished item
        item_id: ItemId,
    },

    /// Favorite membership flipped
    FavoriteToggled {
        /// Item that was toggled
        item_id: ItemId,
        /// Membership after the toggle
        is_favorite: bool,
    },
}
