//! Text normalization for item search
//!
//! Matching is a plain substring test on normalized text: lower-cased, decomposed to NFD,
//! combining diacritical marks (U+0300..=U+036F) removed and trimmed. "Café", "CAFÉ"
//! and "cafe" all normalize to "cafe".

use elementa_core::Item;
use unicode_normalization::UnicodeNormalization;

/// Combining Diacritical Marks block
const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036f}';

/// Normalize text for comparison
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !COMBINING_MARKS.contains(c))
        .collect();
    stripped.trim().to_string()
}

/// A prepared search query
///
/// `None` from [`Query::parse`] means the query is blank and matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    /// Normalize a raw query; blank queries yield `None`
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize(raw);
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    /// The normalized needle
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether any searchable field of the item contains the query
    pub fn matches(&self, item: &Item) -> bool {
        item.search_fields()
            .iter()
            .any(|field| normalize(field).contains(self.0.as_str()))
    }
}
