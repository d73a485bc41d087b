//! Deterministic fixtures shared by unit and integration tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use stockkeeper_catalog::CatalogIndex;
use stockkeeper_protocol::{
    CatalogProduct, MentionSegment, ProductCategory, ProductMention, Season,
};
use stockkeeper_semantic::{StaticVectorSearcher, VectorSearcher};

/// Wraps a searcher and counts invocations, so tests can assert which
/// cascade paths touched the semantic tier.
pub struct CountingSearcher {
    inner: StaticVectorSearcher,
    calls: AtomicUsize,
}

impl CountingSearcher {
    pub fn new(inner: StaticVectorSearcher) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// A searcher that is never expected to return anything.
    pub fn quiet() -> Self {
        Self::new(StaticVectorSearcher::new())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorSearcher for CountingSearcher {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> stockkeeper_semantic::Result<Vec<(String, f32)>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.search(query, top_k).await
    }
}

/// Small catalog covering the tier interplay the tests exercise: an exact-ID
/// target, a bag for descriptive queries, and two scarves close enough to be
/// ambiguous.
pub fn fixture_catalog() -> Arc<CatalogIndex> {
    let products = vec![
        CatalogProduct {
            id: "CBT8901".to_string(),
            name: "Chelsea Boots".to_string(),
            description: "Classic leather Chelsea boots with elastic side panels".to_string(),
            category: ProductCategory::MensShoes,
            price: 89.99,
            stock: 12,
            season: Season::Fall,
        },
        CatalogProduct {
            id: "LTH0976".to_string(),
            name: "Leather Backpack".to_string(),
            description: "Roomy leather backpack that fits a laptop, made for commuting"
                .to_string(),
            category: ProductCategory::Bags,
            price: 54.99,
            stock: 7,
            season: Season::AllSeasons,
        },
        CatalogProduct {
            id: "SFT1098".to_string(),
            name: "Infinity Scarf".to_string(),
            description: "Soft knit infinity scarf in a casual loop design".to_string(),
            category: ProductCategory::Accessories,
            price: 19.99,
            stock: 42,
            season: Season::Winter,
        },
        CatalogProduct {
            id: "VSC6789".to_string(),
            name: "Versatile Scarf".to_string(),
            description: "Elegant silk scarf that dresses up evening outfits".to_string(),
            category: ProductCategory::Accessories,
            price: 24.99,
            stock: 18,
            season: Season::AllSeasons,
        },
        CatalogProduct {
            id: "SND7654".to_string(),
            name: "Strappy Sandals".to_string(),
            description: "Summer sandals with adjustable ankle straps".to_string(),
            category: ProductCategory::WomensShoes,
            price: 39.99,
            stock: 23,
            season: Season::Summer,
        },
    ];
    Arc::new(CatalogIndex::from_products(products).unwrap())
}

pub fn mention_with(
    product_id: Option<&str>,
    name: Option<&str>,
    description: Option<&str>,
) -> ProductMention {
    let excerpt = name
        .or(description)
        .or(product_id)
        .unwrap_or("(blank)")
        .to_string();
    ProductMention {
        excerpt,
        product_id: product_id.map(String::from),
        name: name.map(String::from),
        description: description.map(String::from),
        quantity: 1,
        segment: MentionSegment::Order,
    }
}
