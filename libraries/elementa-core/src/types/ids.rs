/// ID types for Elementa entities
use serde::{Deserialize, Serialize};
use std::fmt;

/// Item identifier
///
/// The atomic number for elements. Unique across a registry and stable across reloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u32);

impl ItemId {
    /// Create a new item ID
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the inner value
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for ItemId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_plain_number() {
        assert_eq!(ItemId::new(26).to_string(), "26");
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&ItemId::new(8)).unwrap();
        assert_eq!(json, "8");

        let id: ItemId = serde_json::from_str("92").unwrap();
        assert_eq!(id, ItemId::from(92));
    }
}
