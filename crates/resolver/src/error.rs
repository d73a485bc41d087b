use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResolverError>;

/// The only hard failures in the resolver are catalog failures at
/// construction time. A tier finding nothing is an empty result, and
/// per-mention degradation never surfaces here.
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("catalog error: {0}")]
    Catalog(#[from] stockkeeper_catalog::CatalogError),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
}
