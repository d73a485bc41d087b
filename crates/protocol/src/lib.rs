//! Shared domain types exchanged between the resolution pipeline and its
//! collaborators (email analysis upstream, fulfillment and inquiry response
//! downstream).

use serde::{Deserialize, Serialize};

/// Closed set of catalog categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Accessories,
    Bags,
    KidsClothing,
    Loungewear,
    MensAccessories,
    MensClothing,
    MensShoes,
    WomensClothing,
    WomensShoes,
}

impl ProductCategory {
    /// Human-readable label, as it appears in the catalog source.
    pub fn label(&self) -> &'static str {
        match self {
            ProductCategory::Accessories => "Accessories",
            ProductCategory::Bags => "Bags",
            ProductCategory::KidsClothing => "Kid's Clothing",
            ProductCategory::Loungewear => "Loungewear",
            ProductCategory::MensAccessories => "Men's Accessories",
            ProductCategory::MensClothing => "Men's Clothing",
            ProductCategory::MensShoes => "Men's Shoes",
            ProductCategory::WomensClothing => "Women's Clothing",
            ProductCategory::WomensShoes => "Women's Shoes",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
    AllSeasons,
}

/// Which part of the email a mention was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentionSegment {
    Order,
    Inquiry,
}

/// A fragment of customer text referring to a product, possibly imprecisely.
///
/// Produced by upstream email analysis; read-only within the resolution core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMention {
    /// Raw text excerpt the mention was extracted from.
    pub excerpt: String,
    /// Explicit product ID as written by the customer (may contain typos,
    /// spacing, punctuation).
    #[serde(default)]
    pub product_id: Option<String>,
    /// Free-text product name.
    #[serde(default)]
    pub name: Option<String>,
    /// Free-text description ("a bag for work").
    #[serde(default)]
    pub description: Option<String>,
    /// Requested quantity.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub segment: MentionSegment,
}

fn default_quantity() -> u32 {
    1
}

impl ProductMention {
    /// True when the mention carries no usable identifying text at all.
    pub fn is_blank(&self) -> bool {
        self.product_id.is_none() && self.name.is_none() && self.description.is_none()
    }
}

/// One row in the product catalog. Loaded once at startup; the resolution
/// core only ever reads products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    /// Canonical uppercase alphanumeric ID, unique within the catalog.
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: ProductCategory,
    pub price: f64,
    pub stock: u32,
    pub season: Season,
}

/// Which resolution tier produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    ExactId,
    FuzzyName,
    SemanticSearch,
    LlmDisambiguated,
}

impl ResolutionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionMethod::ExactId => "exact_id",
            ResolutionMethod::FuzzyName => "fuzzy_name",
            ResolutionMethod::SemanticSearch => "semantic_search",
            ResolutionMethod::LlmDisambiguated => "llm_disambiguated",
        }
    }
}

/// A scored, provisional product match produced by one resolution tier.
/// Exists only for the duration of resolving one mention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub product: CatalogProduct,
    /// Resolution certainty in [0, 1]; not a calibrated probability.
    pub confidence: f32,
    pub method: ResolutionMethod,
}

/// A catalog product resolved from one mention, tagged with how certain the
/// pipeline is and which tier produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedProduct {
    pub product: CatalogProduct,
    pub confidence: f32,
    pub method: ResolutionMethod,
    /// Back-reference into the deduplicated mention list of the originating
    /// email (relation only; the resolved product does not own the mention).
    pub mention_index: usize,
}

/// A mention no candidate cleared the acceptance threshold for. Carries the
/// best rejected candidate, if any, for diagnostics and human review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnresolvedMention {
    pub mention_index: usize,
    pub best_candidate: Option<Candidate>,
}

/// Output of resolving one email.
///
/// `mentions` is the deduplicated mention list the indices in `resolved` and
/// `unresolved` refer to. Every mention index appears in exactly one of the
/// two buckets; one mention may yield several `ResolvedProduct` entries under
/// the top-K candidate policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionReport {
    pub mentions: Vec<ProductMention>,
    pub resolved: Vec<ResolvedProduct>,
    pub unresolved: Vec<UnresolvedMention>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn resolution_method_serializes_snake_case() {
        let json = serde_json::to_string(&ResolutionMethod::LlmDisambiguated).unwrap();
        assert_eq!(json, "\"llm_disambiguated\"");
        assert_eq!(ResolutionMethod::ExactId.as_str(), "exact_id");
    }

    #[test]
    fn mention_quantity_defaults_to_one() {
        let mention: ProductMention = serde_json::from_str(
            r#"{"excerpt": "those boots", "segment": "order"}"#,
        )
        .unwrap();
        assert_eq!(mention.quantity, 1);
        assert!(mention.is_blank());
    }

    #[test]
    fn category_labels_match_catalog_source() {
        assert_eq!(ProductCategory::KidsClothing.label(), "Kid's Clothing");
        assert_eq!(ProductCategory::Bags.label(), "Bags");
    }
}
