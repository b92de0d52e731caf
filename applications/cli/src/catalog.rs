//! Catalog loading for the commands
//!
//! Browsing commands degrade to an empty list when the catalog is unreachable; commands
//! that need one particular element report the failure.

use elementa_catalog::{CatalogError, CatalogSource, ItemRegistry};

/// Load every item, failing if the source does
pub async fn load_registry(source: &dyn CatalogSource) -> Result<ItemRegistry, CatalogError> {
    let mut registry = ItemRegistry::new();
    registry.refresh(source).await?;
    Ok(registry)
}

/// Load every item, or an empty registry if the source fails
///
/// The failure is logged by the registry.
pub async fn load_registry_or_empty(source: &dyn CatalogSource) -> ItemRegistry {
    let mut registry = ItemRegistry::new();
    let _ = registry.refresh(source).await;
    registry
}
