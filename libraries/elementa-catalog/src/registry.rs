//! In-memory item registry
//!
//! Holds the loaded items in load order and answers identity, category and text
//! queries. The collection is only ever replaced wholesale.

use crate::error::Result;
use crate::search::Query;
use crate::source::CatalogSource;
use elementa_core::{Item, ItemId};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Loaded catalog items
#[derive(Debug, Clone, Default)]
pub struct ItemRegistry {
    /// Items in load order
    items: Vec<Item>,

    /// Id -> position in `items`
    index: HashMap<ItemId, usize>,

    /// Whether a load attempt has completed
    loaded: bool,
}

impl ItemRegistry {
    /// Create an empty, not yet loaded registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from items
    pub fn from_items(items: Vec<Item>) -> Self {
        let mut registry = Self::new();
        registry.replace(items);
        registry
    }

    /// Replace every item
    ///
    /// Ids must be unique; later duplicates are dropped.
    pub fn replace(&mut self, items: Vec<Item>) {
        self.items.clear();
        self.index.clear();

        for item in items {
            if self.index.contains_key(&item.id) {
                warn!(id = %item.id, name = %item.name, "Duplicate item id, keeping first");
                continue;
            }
            self.index.insert(item.id, self.items.len());
            self.items.push(item);
        }

        self.loaded = true;
        debug!(items = self.items.len(), "Registry replaced");
    }

    /// Drop every item (the state after a failed load)
    pub fn clear(&mut self) {
        self.replace(Vec::new());
    }

    /// Reload from a source
    ///
    /// On failure the registry is emptied and the error handed back so callers can show
    /// an empty state; it is never fatal.
    pub async fn refresh(&mut self, source: &dyn CatalogSource) -> Result<usize> {
        match source.load().await {
            Ok(items) => {
                self.replace(items);
                info!(items = self.items.len(), "Catalog loaded");
                Ok(self.items.len())
            }
            Err(e) => {
                warn!(error = %e, "Catalog load failed, registry is empty");
                self.clear();
                Err(e)
            }
        }
    }

    /// Whether a load attempt has completed (successfully or not)
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Look up an item by id
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.index.get(&id).map(|&i| &self.items[i])
    }

    /// Whether an item with this id exists
    pub fn contains(&self, id: ItemId) -> bool {
        self.index.contains_key(&id)
    }

    /// All items in load order
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Case- and diacritic-insensitive substring search
    ///
    /// A blank query returns nothing rather than everything. Results keep load order.
    pub fn search(&self, query: &str) -> Vec<&Item> {
        let Some(query) = Query::parse(query) else {
            return Vec::new();
        };

        self.items.iter().filter(|item| query.matches(item)).collect()
    }

    /// Items in a category (case-insensitive), in load order
    pub fn by_category(&self, category: &str) -> Vec<&Item> {
        let category = category.trim();
        self.items
            .iter()
            .filter(|item| item.category.eq_ignore_ascii_case(category))
            .collect()
    }

    /// Distinct categories in first-seen order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for item in &self.items {
            if !seen.contains(&item.category.as_str()) {
                seen.push(item.category.as_str());
            }
        }
        seen
    }

    /// Resolve ids to items, in the order given, skipping unknown ids
    pub fn resolve<'a>(&'a self, ids: impl IntoIterator<Item = &'a ItemId>) -> Vec<&'a Item> {
        ids.into_iter().filter_map(|&id| self.get(id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::source::StaticCatalog;
    use async_trait::async_trait;

    fn item(id: u32, name: &str, symbol: &str, category: &str) -> Item {
        let mut item = Item::new(ItemId::new(id), name, symbol);
        item.category = category.to_string();
        item
    }

    fn sample() -> ItemRegistry {
        ItemRegistry::from_items(vec![
            item(1, "Hydrogen", "H", "diatomic nonmetal"),
            item(2, "Helium", "He", "noble gas"),
            item(10, "Neon", "Ne", "noble gas"),
            item(26, "Iron", "Fe", "transition metal"),
        ])
    }

    struct FailingCatalog;

    #[async_trait]
    impl CatalogSource for FailingCatalog {
        async fn load(&self) -> Result<Vec<Item>> {
            Err(CatalogError::Rejected)
        }
    }

    #[test]
    fn lookup_by_id() {
        let registry = sample();
        assert_eq!(registry.get(ItemId::new(26)).unwrap().name, "Iron");
        assert!(registry.get(ItemId::new(99)).is_none());
        assert!(registry.contains(ItemId::new(2)));
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let registry = ItemRegistry::from_items(vec![
            item(1, "Hydrogen", "H", "nonmetal"),
            item(1, "Protium", "H", "nonmetal"),
        ]);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(ItemId::new(1)).unwrap().name, "Hydrogen");
    }

    #[test]
    fn blank_search_returns_nothing() {
        let registry = sample();
        assert!(registry.search("").is_empty());
        assert!(registry.search("   ").is_empty());
    }

    #[test]
    fn search_keeps_load_order() {
        let registry = sample();
        let names: Vec<_> = registry.search("e").iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Hydrogen", "Helium", "Neon", "Iron"]);
    }

    #[test]
    fn category_filter_and_listing() {
        let registry = sample();
        let gases: Vec<_> = registry
            .by_category("Noble Gas")
            .iter()
            .map(|i| i.id.get())
            .collect();
        assert_eq!(gases, [2, 10]);
        assert_eq!(
            registry.categories(),
            ["diatomic nonmetal", "noble gas", "transition metal"]
        );
    }

    #[test]
    fn resolve_preserves_requested_order() {
        let registry = sample();
        let ids = [ItemId::new(26), ItemId::new(404), ItemId::new(1)];
        let names: Vec<_> = registry.resolve(&ids).iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Iron", "Hydrogen"]);
    }

    #[tokio::test]
    async fn refresh_replaces_items() {
        let mut registry = ItemRegistry::new();
        assert!(!registry.is_loaded());

        let source = StaticCatalog::new(vec![item(8, "Oxygen", "O", "diatomic nonmetal")]);
        let count = registry.refresh(&source).await.unwrap();

        assert_eq!(count, 1);
        assert!(registry.is_loaded());
        assert_eq!(registry.items()[0].symbol, "O");
    }

    #[tokio::test]
    async fn failed_refresh_empties_registry() {
        let mut registry = sample();
        let result = registry.refresh(&FailingCatalog).await;

        assert!(matches!(result, Err(CatalogError::Rejected)));
        assert!(registry.is_empty());
        assert!(registry.is_loaded());
    }
}
