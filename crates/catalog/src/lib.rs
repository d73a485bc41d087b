mod error;
mod index;
mod loader;

pub use error::{CatalogError, Result};
pub use index::{normalize_id, CatalogIndex};
pub use loader::load_catalog_json;
