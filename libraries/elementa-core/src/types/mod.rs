//! Domain types

mod audio;
mod ids;
mod item;

pub use audio::{AssetId, AudioReference};
pub use ids::ItemId;
pub use item::{GridPosition, Item};
