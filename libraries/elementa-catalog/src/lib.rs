//! Elementa Catalog
//!
//! Loads the element catalog from the remote service, normalizes the loosely typed wire
//! records into [`Item`](elementa_core::Item)s, and keeps them in an [`ItemRegistry`] for
//! lookup and search.
//!
//! A failed load is never fatal: [`ItemRegistry::refresh`] empties the registry and hands
//! the error back so the caller can show an empty state.
//!
//! # Example
//!
//! ```ignore
//! use elementa_catalog::{CatalogClient, CatalogConfig, ItemRegistry};
//!
//! let client = CatalogClient::new(CatalogConfig::new("https://catalog.example.org", "key"))?;
//! let mut registry = ItemRegistry::new();
//!
//! if let Err(e) = registry.refresh(&client).await {
//!     eprintln!("Catalog unavailable: {e}");
//! }
//!
//! for item in registry.search("cafe") {
//!     println!("{} ({})", item.name, item.symbol);
//! }
//! ```

mod client;
mod error;
mod registry;
mod search;
mod source;
mod types;

pub use client::CatalogClient;
pub use error::{CatalogError, Result};
pub use registry::ItemRegistry;
pub use search::{normalize, Query};
pub use source::{CatalogSource, StaticCatalog};
pub use types::{ApiElement, ApiResponse, CatalogConfig, FlexNumber};
