//! Favorites and history
//!
//! Small per-user state read by many views. Held in memory only; it derives serde so a
//! host can persist it if it wants to.

use crate::history::History;
use elementa_core::ItemId;
use serde::{Deserialize, Serialize};

/// Insertion-ordered set of favorited items
///
/// Equality compares membership only; the add order is kept for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Favorites {
    items: Vec<ItemId>,
}

impl Favorites {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership, returning whether the item is now a favorite
    pub fn toggle(&mut self, id: ItemId) -> bool {
        if let Some(index) = self.items.iter().position(|&i| i == id) {
            self.items.remove(index);
            false
        } else {
            self.items.push(id);
            true
        }
    }

    /// Check membership
    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains(&id)
    }

    /// All favorites in the order they were added
    pub fn get_all(&self) -> Vec<ItemId> {
        self.items.clone()
    }

    /// Number of favorites
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if there are no favorites
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl PartialEq for Favorites {
    fn eq(&self, other: &Self) -> bool {
        self.items.len() == other.items.len() && self.items.iter().all(|id| other.contains(*id))
    }
}

impl Eq for Favorites {}

/// Favorites and history for one user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    /// Favorited items
    pub favorites: Favorites,

    /// Recently played items
    pub history: History,
}

impl Library {
    /// Create an empty library with the given history size
    pub fn new(history_size: usize) -> Self {
        Self {
            favorites: Favorites::new(),
            history: History::new(history_size),
        }
    }
}
