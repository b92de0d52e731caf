//! Catalog source trait
//!
//! Abstracts where items come from so the registry can be refreshed from the HTTP
//! service in production and from fixtures in tests.

use crate::error::Result;
use async_trait::async_trait;
use elementa_core::Item;

/// Anything that can produce the full list of items
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch and normalize every item
    ///
    /// Implementations return errors rather than empty lists; the registry decides how
    /// to degrade.
    async fn load(&self) -> Result<Vec<Item>>;
}

/// Fixed list of items, useful for tests and offline demos
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    items: Vec<Item>,
}

impl StaticCatalog {
    /// Create a source that always yields `items`
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn load(&self) -> Result<Vec<Item>> {
        Ok(self.items.clone())
    }
}
