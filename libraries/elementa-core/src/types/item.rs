/// Item domain type
use crate::types::{AudioReference, ItemId};
use serde::{Deserialize, Serialize};

/// Placement in the periodic table grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    /// Column (1-based in catalog data)
    pub x: i32,
    /// Row (1-based in catalog data)
    pub y: i32,
}

impl GridPosition {
    /// Create a new grid position
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One playable catalog entry
///
/// Created once when the catalog is loaded and never mutated afterwards; a reload
/// replaces the whole registry instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique item identifier (the atomic number)
    pub id: ItemId,

    /// Display name
    pub name: String,

    /// Chemical symbol
    pub symbol: String,

    /// Category, `"unknown"` when the catalog has none
    pub category: String,

    /// Phase at room temperature
    pub phase: String,

    /// Short description
    pub summary: String,

    /// Discoverer(s)
    pub discovered_by: String,

    /// Electron configuration
    pub electron_configuration: String,

    /// Atomic mass
    pub atomic_mass: f64,

    /// Density
    pub density: f64,

    /// Grid placement
    pub position: GridPosition,

    /// Narration, if the catalog provides any
    pub audio: Option<AudioReference>,

    /// Name in the localized (Malayalam) edition
    pub localized_name: Option<String>,
}

impl Item {
    /// Create a new item with minimal metadata
    pub fn new(id: ItemId, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            symbol: symbol.into(),
            category: "unknown".to_string(),
            phase: String::new(),
            summary: String::new(),
            discovered_by: String::new(),
            electron_configuration: String::new(),
            atomic_mass: 0.0,
            density: 0.0,
            position: GridPosition::default(),
            audio: None,
            localized_name: None,
        }
    }

    /// Whether the item has narration to acquire
    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    /// Text fields matched by search, in a fixed order
    ///
    /// The id is included as its decimal string.
    pub fn search_fields(&self) -> [std::borrow::Cow<'_, str>; 9] {
        use std::borrow::Cow;

        [
            Cow::Borrowed(self.name.as_str()),
            Cow::Borrowed(self.symbol.as_str()),
            Cow::Owned(self.id.to_string()),
            Cow::Borrowed(self.category.as_str()),
            Cow::Borrowed(self.discovered_by.as_str()),
            Cow::Borrowed(self.phase.as_str()),
            Cow::Borrowed(self.summary.as_str()),
            Cow::Borrowed(self.electron_configuration.as_str()),
            Cow::Borrowed(self.localized_name.as_deref().unwrap_or("")),
        ]
    }
}
