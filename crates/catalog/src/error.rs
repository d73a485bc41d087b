use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Catalog failures are fatal and startup-only: every downstream guarantee
/// depends on a well-formed catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("duplicate product id after normalization: {0}")]
    DuplicateId(String),

    #[error("catalog is empty")]
    EmptyCatalog,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
