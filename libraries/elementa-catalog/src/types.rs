//! Types for the catalog API and their normalization into [`Item`]s.

use elementa_core::{AudioReference, GridPosition, Item, ItemId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for reaching the catalog service.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the service (e.g., "https://catalog.example.org")
    pub base_url: String,
    /// Static application key sent as `X-APP-KEY`
    pub app_key: String,
    /// Whole-request timeout
    pub timeout: Duration,
}

impl CatalogConfig {
    /// Create a config with the default timeout.
    pub fn new(base_url: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            app_key: app_key.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// =============================================================================
// Wire Types
// =============================================================================

/// Envelope returned by `GET /api/elements`.
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    /// Whether the service produced the list
    pub success: bool,
    /// Elements, absent on failure
    #[serde(default)]
    pub data: Vec<ApiElement>,
}

/// A number that the service sometimes sends as a string.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FlexNumber {
    /// Proper JSON number
    Number(f64),
    /// Number encoded as a string, possibly with trailing junk
    Text(String),
}

impl FlexNumber {
    /// Floating point value; unparsable text is 0.
    pub fn to_f64(&self) -> f64 {
        match self {
            Self::Number(n) if n.is_finite() => *n,
            Self::Number(_) => 0.0,
            Self::Text(text) => parse_float_prefix(text).unwrap_or(0.0),
        }
    }

    /// Integer value, truncated; unparsable text is 0.
    pub fn to_i64(&self) -> i64 {
        match self {
            Self::Number(n) if n.is_finite() => n.trunc() as i64,
            Self::Number(_) => 0,
            Self::Text(text) => parse_int_prefix(text).unwrap_or(0),
        }
    }
}

/// An element as returned by the service.
///
/// Field names follow the wire format; every field is optional on the wire.
#[allow(missing_docs)]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiElement {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub number: Option<FlexNumber>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub atomic_mass: Option<FlexNumber>,
    #[serde(default)]
    pub electron_configuration: Option<String>,
    #[serde(default)]
    pub discovered_by: Option<String>,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub density: Option<FlexNumber>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub xpos: Option<FlexNumber>,
    #[serde(default)]
    pub ypos: Option<FlexNumber>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub malayalam_name: Option<String>,
}

impl ApiElement {
    /// Normalize into the strict item shape.
    pub fn into_item(self) -> Item {
        let number = self.number.as_ref().map_or(0, FlexNumber::to_i64);
        let id = u32::try_from(number).unwrap_or(0);

        Item {
            id: ItemId::new(id),
            name: self.name,
            symbol: self.symbol,
            category: non_empty(self.category).unwrap_or_else(|| "unknown".to_string()),
            phase: self.phase.unwrap_or_default(),
            summary: self.summary.unwrap_or_default(),
            discovered_by: self.discovered_by.unwrap_or_default(),
            electron_configuration: self.electron_configuration.unwrap_or_default(),
            atomic_mass: self.atomic_mass.as_ref().map_or(0.0, FlexNumber::to_f64),
            density: self.density.as_ref().map_or(0.0, FlexNumber::to_f64),
            position: GridPosition::new(
                grid_coordinate(self.xpos.as_ref()),
                grid_coordinate(self.ypos.as_ref()),
            ),
            audio: self.audio_url.as_deref().and_then(AudioReference::parse),
            localized_name: non_empty(self.malayalam_name),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn grid_coordinate(value: Option<&FlexNumber>) -> i32 {
    value
        .map_or(0, FlexNumber::to_i64)
        .try_into()
        .unwrap_or(0)
}

/// Longest leading integer (`[+-]digits`) of a trimmed string.
fn parse_int_prefix(text: &str) -> Option<i64> {
    let text = text.trim();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    text[..end].parse().ok()
}

/// Longest leading decimal number (`[+-]digits[.digits][e[+-]digits]`) of a trimmed string.
fn parse_float_prefix(text: &str) -> Option<f64> {
    let text = text.trim();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let mut mantissa_digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        mantissa_digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
            mantissa_digits += 1;
        }
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    text[..end].trim_end_matches('.').parse().ok()
}
