//! Audio references
//!
//! The catalog describes narration as a single string: either a marker for an asset
//! bundled with the application (`local:introduction`) or a URL the engine streams.
//! That string is parsed exactly once, when the catalog is normalized, so playback code
//! only ever matches on [`AudioReference`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker prefix for bundled assets. `local://name` is accepted too.
const LOCAL_PREFIX: &str = "local:";

/// Narration assets shipped with the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetId {
    /// Book introduction
    Introduction,
    /// Book conclusion
    Conclusion,
}

impl AssetId {
    /// All bundled assets
    pub const ALL: [AssetId; 2] = [AssetId::Introduction, AssetId::Conclusion];

    /// Resolve the name that follows a `local:` marker
    pub fn from_marker(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "introduction" => Some(Self::Introduction),
            "conclusion" => Some(Self::Conclusion),
            _ => None,
        }
    }

    /// Marker name (the part after `local:`)
    pub fn marker(self) -> &'static str {
        match self {
            Self::Introduction => "introduction",
            Self::Conclusion => "conclusion",
        }
    }

    /// File name of the bundled asset inside the assets directory
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Introduction => "introduction.mp3",
            Self::Conclusion => "conclusion.mp3",
        }
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// Where an item's audio comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum AudioReference {
    /// Asset bundled with the application
    Local(AssetId),
    /// Streamable URL, kept exactly as the catalog sent it
    Remote(String),
}

impl AudioReference {
    /// Parse a raw catalog value
    ///
    /// Returns `None` for an absent (empty or blank) value. A `local:` marker naming an
    /// asset that is not bundled falls back to `Remote` with the raw value, which the engine
    /// then fails to open and the session degrades to simulated playback.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some(rest) = trimmed.strip_prefix(LOCAL_PREFIX) {
            let name = rest.trim_start_matches('/');
            if let Some(asset) = AssetId::from_marker(name) {
                return Some(Self::Local(asset));
            }
        }

        Some(Self::Remote(raw.to_string()))
    }

    /// Whether this reference points at a bundled asset
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}

impl fmt::Display for AudioReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(asset) => write!(f, "{}{}", LOCAL_PREFIX, asset),
            Self::Remote(url) => f.write_str(url),
        }
    }
}
