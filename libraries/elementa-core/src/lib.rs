//! Elementa Core
//!
//! Platform-agnostic data model for Elementa.
//!
//! This crate provides the types every other Elementa crate agrees on:
//! - **Items**: one playable catalog entry (an element of the periodic table)
//! - **Identity**: `ItemId`, the only key items are looked up by
//! - **Audio references**: where an item's narration lives, resolved once at load time
//!
//! # Example
//!
//! ```rust
//! use elementa_core::{AssetId, AudioReference, Item, ItemId};
//!
//! let mut item = Item::new(ItemId::new(1), "Hydrogen", "H");
//! item.audio = AudioReference::parse("local:introduction");
//!
//! assert_eq!(item.audio, Some(AudioReference::Local(AssetId::Introduction)));
//! assert!(item.has_audio());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod types;

pub use types::{AssetId, AudioReference, GridPosition, Item, ItemId};
