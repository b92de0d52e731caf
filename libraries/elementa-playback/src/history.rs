//! Playback history tracking
//!
//! Maintains a bounded, deduplicated list of recently played items

use elementa_core::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Playback history with bounded size
///
/// Most recent first. Playing an item already in the history moves it to the front
/// instead of adding a second entry; the oldest entries fall off past `max_size`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    /// History buffer (most recent = front)
    items: VecDeque<ItemId>,

    /// Maximum history size
    max_size: usize,
}

impl History {
    /// Create new history with specified maximum size
    pub fn new(max_size: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(max_size.min(64)),
            max_size,
        }
    }

    /// Record a play
    ///
    /// Moves the item to the front, then trims to the maximum size.
    pub fn push(&mut self, id: ItemId) {
        if let Some(existing) = self.items.iter().position(|&i| i == id) {
            self.items.remove(existing);
        }
        self.items.push_front(id);
        self.items.truncate(self.max_size);
    }

    /// Most recently played item
    pub fn peek(&self) -> Option<ItemId> {
        self.items.front().copied()
    }

    /// All entries, most recent first
    pub fn get_all(&self) -> Vec<ItemId> {
        self.items.iter().copied().collect()
    }

    /// Whether the item was played recently
    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains(&id)
    }

    /// Get number of entries
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if history is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Get maximum history size
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Set maximum history size
    ///
    /// If new size is smaller than current, oldest entries are discarded
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        self.items.truncate(max_size);
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(50)
    }
}
