use crate::error::{Result, SemanticError};
use async_trait::async_trait;
use std::collections::HashMap;

/// Black-box similarity search over the catalog's name+description
/// embeddings. Building and maintaining the index lives outside this core;
/// the trait only carries the query capability.
#[async_trait]
pub trait VectorSearcher: Send + Sync {
    /// Nearest catalog products for a free-text query, as
    /// (product id, similarity) pairs sorted by similarity descending.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<(String, f32)>>;
}

/// Deterministic in-memory searcher backed by a fixture table.
///
/// Keys are substrings; a query returns the rows of every key it contains,
/// merged and sorted. Used by tests and offline runs.
#[derive(Default)]
pub struct StaticVectorSearcher {
    rows: HashMap<String, Vec<(String, f32)>>,
    unavailable: bool,
}

impl StaticVectorSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register results returned whenever `needle` occurs in the query.
    pub fn with_rows(mut self, needle: &str, rows: Vec<(&str, f32)>) -> Self {
        self.rows.insert(
            needle.to_ascii_lowercase(),
            rows.into_iter().map(|(id, s)| (id.to_string(), s)).collect(),
        );
        self
    }

    /// A searcher whose backend is down.
    pub fn unavailable() -> Self {
        Self {
            rows: HashMap::new(),
            unavailable: true,
        }
    }
}

#[async_trait]
impl VectorSearcher for StaticVectorSearcher {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<(String, f32)>> {
        if self.unavailable {
            return Err(SemanticError::Unavailable(
                "static searcher configured as down".to_string(),
            ));
        }

        let query = query.to_ascii_lowercase();
        let mut merged: Vec<(String, f32)> = Vec::new();
        for (needle, rows) in &self.rows {
            if query.contains(needle.as_str()) {
                for (id, score) in rows {
                    if !merged.iter().any(|(seen, _)| seen == id) {
                        merged.push((id.clone(), *score));
                    }
                }
            }
        }

        merged.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        merged.truncate(top_k);
        Ok(merged)
    }
}
