mod client;
mod error;
mod searcher;

pub use client::{SemanticClient, SemanticConfig};
pub use error::{Result, SemanticError};
pub use searcher::{StaticVectorSearcher, VectorSearcher};
