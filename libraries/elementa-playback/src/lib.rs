//! Elementa - Playback
//!
//! Session management for narrated catalog items.
//!
//! This crate provides:
//! - One shared playback session, with at most one live audio engine at a time
//! - A coordinator that any number of views can clone, drive and observe
//! - Simulated playback when an item has no audio or its audio fails to load
//! - Generation fencing so status from a replaced engine never reaches observers
//! - Favorites and a bounded, deduplicated play history
//!
//! # Architecture
//!
//! `elementa-playback` knows nothing about audio devices or decoders. Real engines come
//! from an [`AudioBackend`] supplied by the platform (see `elementa-audio-desktop`);
//! simulated playback is just another [`AudioEngine`], so the coordinator drives both
//! the same way.
//!
//! # Example: Observing Playback
//!
//! ```rust,no_run
//! use elementa_core::{Item, ItemId};
//! use elementa_playback::{format_millis, PlaybackConfig, SessionCoordinator, SilentBackend};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let coordinator = SessionCoordinator::new(Arc::new(SilentBackend), PlaybackConfig::default());
//! let mut snapshots = coordinator.subscribe();
//!
//! coordinator.play(Item::new(ItemId::new(2), "Helium", "He")).await;
//!
//! while snapshots.changed().await.is_ok() {
//!     let snapshot = snapshots.borrow_and_update().clone();
//!     println!(
//!         "{} / {}",
//!         format_millis(snapshot.position_ms),
//!         format_millis(snapshot.duration_ms)
//!     );
//!     if snapshot.finished {
//!         break;
//!     }
//! }
//! # }
//! ```

mod coordinator;
mod engine;
mod error;
mod events;
mod history;
mod library;
mod session;
mod simulated;
pub mod types;

// Public exports
pub use coordinator::{SessionCoordinator, StatusUpdate};
pub use engine::{AudioBackend, AudioEngine, EngineStatus, SilentBackend};
pub use error::{EngineError, Result};
pub use events::PlaybackEvent;
pub use history::History;
pub use library::{Favorites, Library};
pub use session::{PlaybackSession, SessionStats};
pub use simulated::SimulatedEngine;
pub use types::{
    format_millis, PlaybackConfig, PlaybackMode, PlaybackState, SessionSnapshot,
    DEFAULT_SIMULATED_DURATION_MS,
};
