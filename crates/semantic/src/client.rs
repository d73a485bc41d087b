use crate::error::{Result, SemanticError};
use crate::searcher::VectorSearcher;
use std::sync::Arc;
use std::time::Duration;
use stockkeeper_catalog::CatalogIndex;
use stockkeeper_protocol::{Candidate, ProductMention, ResolutionMethod};

/// Settings for the semantic tier.
#[derive(Debug, Clone)]
pub struct SemanticConfig {
    pub top_k: usize,
    /// Fixed confidence assigned to semantic hits. A heuristic standing in
    /// for a calibrated probability; only its ordering relative to the other
    /// tiers is meaningful.
    pub confidence: f32,
    pub timeout: Duration,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            confidence: 0.8,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Client side of the semantic tier: query construction, timeout, and
/// mapping of raw (id, similarity) rows back onto catalog products.
pub struct SemanticClient {
    searcher: Arc<dyn VectorSearcher>,
    catalog: Arc<CatalogIndex>,
    config: SemanticConfig,
}

impl SemanticClient {
    pub fn new(
        searcher: Arc<dyn VectorSearcher>,
        catalog: Arc<CatalogIndex>,
        config: SemanticConfig,
    ) -> Self {
        Self {
            searcher,
            catalog,
            config,
        }
    }

    /// Combine the mention's free-text fields into one natural-language
    /// query. Returns `None` when there is nothing to search with.
    pub fn build_query(mention: &ProductMention) -> Option<String> {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(name) = mention.name.as_deref() {
            if !name.trim().is_empty() {
                parts.push(name.trim());
            }
        }
        if let Some(description) = mention.description.as_deref() {
            if !description.trim().is_empty() {
                parts.push(description.trim());
            }
        }
        if parts.is_empty() {
            let excerpt = mention.excerpt.trim();
            if !excerpt.is_empty() {
                parts.push(excerpt);
            }
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(". "))
        }
    }

    /// Nearest-neighbor candidates for one mention.
    ///
    /// Unknown product IDs coming back from the index are logged and
    /// dropped; a mention with no searchable text yields no candidates.
    pub async fn search(&self, mention: &ProductMention) -> Result<Vec<Candidate>> {
        let query = match Self::build_query(mention) {
            Some(q) => q,
            None => return Ok(Vec::new()),
        };
        self.search_text(&query).await
    }

    /// Nearest-neighbor candidates for a raw query string.
    pub async fn search_text(&self, query: &str) -> Result<Vec<Candidate>> {
        log::debug!("Semantic search: '{}' (top_k={})", query, self.config.top_k);

        let rows = tokio::time::timeout(
            self.config.timeout,
            self.searcher.search(query, self.config.top_k),
        )
        .await
        .map_err(|_| SemanticError::Timeout)??;

        let mut candidates = Vec::with_capacity(rows.len());
        for (product_id, similarity) in rows {
            match self.catalog.lookup_exact(&product_id) {
                Some(product) => candidates.push(Candidate {
                    product: product.clone(),
                    confidence: self.config.confidence,
                    method: ResolutionMethod::SemanticSearch,
                }),
                None => {
                    log::warn!(
                        "Semantic index returned unknown product id '{}' (similarity {:.3})",
                        product_id,
                        similarity
                    );
                }
            }
        }

        log::debug!("Semantic tier: {} candidates", candidates.len());
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::searcher::StaticVectorSearcher;
    use pretty_assertions::assert_eq;
    use stockkeeper_protocol::{CatalogProduct, MentionSegment, ProductCategory, Season};

    fn catalog() -> Arc<CatalogIndex> {
        let products = vec![
            CatalogProduct {
                id: "CBT8901".to_string(),
                name: "Chelsea Boots".to_string(),
                description: "Classic leather Chelsea boots".to_string(),
                category: ProductCategory::MensShoes,
                price: 89.99,
                stock: 12,
                season: Season::Fall,
            },
            CatalogProduct {
                id: "LTH0976".to_string(),
                name: "Leather Backpack".to_string(),
                description: "Roomy leather backpack for commuting".to_string(),
                category: ProductCategory::Bags,
                price: 54.99,
                stock: 7,
                season: Season::AllSeasons,
            },
        ];
        Arc::new(CatalogIndex::from_products(products).unwrap())
    }

    fn mention(name: Option<&str>, description: Option<&str>) -> ProductMention {
        ProductMention {
            excerpt: "test excerpt".to_string(),
            product_id: None,
            name: name.map(String::from),
            description: description.map(String::from),
            quantity: 1,
            segment: MentionSegment::Order,
        }
    }

    #[test]
    fn query_combines_name_and_description() {
        let m = mention(Some("boots"), Some("something for rainy days"));
        assert_eq!(
            SemanticClient::build_query(&m).unwrap(),
            "boots. something for rainy days"
        );
    }

    #[test]
    fn query_falls_back_to_excerpt() {
        let m = mention(None, None);
        assert_eq!(SemanticClient::build_query(&m).unwrap(), "test excerpt");
    }

    #[tokio::test]
    async fn maps_rows_to_catalog_products() {
        let searcher = StaticVectorSearcher::new()
            .with_rows("bag", vec![("LTH0976", 0.91), ("MISSING1", 0.88)]);
        let client = SemanticClient::new(Arc::new(searcher), catalog(), SemanticConfig::default());

        let candidates = client
            .search(&mention(None, Some("a bag for work")))
            .await
            .unwrap();

        // Unknown id dropped, known id mapped with the fixed confidence.
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].product.id, "LTH0976");
        assert_eq!(candidates[0].confidence, 0.8);
        assert_eq!(candidates[0].method, ResolutionMethod::SemanticSearch);
    }

    #[tokio::test]
    async fn unavailable_backend_surfaces_as_error() {
        let client = SemanticClient::new(
            Arc::new(StaticVectorSearcher::unavailable()),
            catalog(),
            SemanticConfig::default(),
        );
        let err = client.search_text("boots").await.unwrap_err();
        assert!(matches!(err, SemanticError::Unavailable(_)));
    }
}
