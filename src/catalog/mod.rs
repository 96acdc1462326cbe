// Catalog exports
pub mod normalizer;
pub mod store;

pub use normalizer::{normalize, normalize_all, normalize_category, extract_zip};
pub use store::{CatalogStore, CatalogSnapshot, CATALOG_TTL};
