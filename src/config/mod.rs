//! Configuration Module
//!
//! Model table loading and upstream settings.

pub mod catalog;
pub mod loader;
pub mod settings;

pub use catalog::{CatalogFile, Category, CostTier, ModelCatalog, ModelEntry, Selection};
pub use loader::CatalogLoader;
pub use settings::{RelaySettings, DEFAULT_BASE_URL};
