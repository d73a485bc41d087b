use std::sync::Arc;
use stockkeeper_catalog::CatalogIndex;
use stockkeeper_protocol::{Candidate, ResolutionMethod};

/// Lowercase, strip punctuation, sort tokens. "boots chelsea" and
/// "Chelsea Boots!" normalize to the same key.
fn token_sort_key(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Token-sort similarity in [0, 1]. Word order does not matter; typos and
/// small edits degrade the score smoothly.
pub fn token_sort_score(a: &str, b: &str) -> f32 {
    let key_a = token_sort_key(a);
    let key_b = token_sort_key(b);
    if key_a.is_empty() || key_b.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(&key_a, &key_b) as f32
}

/// Ranks catalog products by string similarity to a free-text name.
pub struct FuzzyNameMatcher {
    catalog: Arc<CatalogIndex>,
}

impl FuzzyNameMatcher {
    pub fn new(catalog: Arc<CatalogIndex>) -> Self {
        Self { catalog }
    }

    /// Top `top_n` products whose name scores at least `threshold` against
    /// the query, confidence = similarity, sorted descending. Ties keep
    /// catalog insertion order. An empty query yields no candidates.
    pub fn match_by_name(&self, query: &str, threshold: f32, top_n: usize) -> Vec<Candidate> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let mut candidates: Vec<Candidate> = self
            .catalog
            .all_products()
            .iter()
            .filter_map(|product| {
                let score = token_sort_score(query, &product.name);
                if score >= threshold {
                    Some(Candidate {
                        product: product.clone(),
                        confidence: score,
                        method: ResolutionMethod::FuzzyName,
                    })
                } else {
                    None
                }
            })
            .collect();

        // Stable sort keeps insertion order among equal scores.
        candidates.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(top_n);

        log::debug!(
            "Fuzzy tier: '{}' -> {} candidates (threshold {:.2})",
            query,
            candidates.len(),
            threshold
        );
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use stockkeeper_protocol::{CatalogProduct, ProductCategory, Season};

    fn product(id: &str, name: &str) -> CatalogProduct {
        CatalogProduct {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            category: ProductCategory::Accessories,
            price: 10.0,
            stock: 5,
            season: Season::AllSeasons,
        }
    }

    fn matcher(names: &[(&str, &str)]) -> FuzzyNameMatcher {
        let products = names.iter().map(|(id, name)| product(id, name)).collect();
        FuzzyNameMatcher::new(Arc::new(CatalogIndex::from_products(products).unwrap()))
    }

    #[test]
    fn exact_name_scores_one() {
        assert_eq!(token_sort_score("Chelsea Boots", "chelsea boots"), 1.0);
        assert_eq!(token_sort_score("boots, chelsea", "Chelsea Boots"), 1.0);
    }

    #[test]
    fn typo_scores_high_but_below_one() {
        let score = token_sort_score("chealsea boot", "Chelsea Boots");
        assert!(score > 0.75, "got {score}");
        assert!(score < 1.0, "got {score}");
    }

    #[test]
    fn unrelated_names_score_low() {
        assert!(token_sort_score("chelsea boots", "silk summer dress") < 0.4);
    }

    #[test]
    fn empty_query_yields_nothing() {
        let m = matcher(&[("CBT8901", "Chelsea Boots")]);
        assert!(m.match_by_name("", 0.0, 5).is_empty());
        assert!(m.match_by_name("   ", 0.0, 5).is_empty());
    }

    #[test]
    fn results_sorted_descending_with_stable_ties() {
        let m = matcher(&[
            ("AAA1111", "Wool Scarf"),
            ("BBB2222", "Wool Scarf"),
            ("CCC3333", "Leather Belt"),
        ]);
        let results = m.match_by_name("wool scarf", 0.5, 5);
        assert_eq!(results[0].product.id, "AAA1111");
        assert_eq!(results[1].product.id, "BBB2222");
        assert!(results[0].confidence >= results[1].confidence);
    }

    #[test]
    fn threshold_filters_candidates() {
        let m = matcher(&[("CBT8901", "Chelsea Boots"), ("DRS5678", "Summer Dress")]);
        let results = m.match_by_name("chelsea boots", 0.75, 5);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].product.id, "CBT8901");
    }

    proptest! {
        #[test]
        fn score_stays_in_unit_interval(a in "[a-z ]{0,30}", b in "[a-z ]{0,30}") {
            let score = token_sort_score(&a, &b);
            prop_assert!((0.0..=1.0).contains(&score));
        }

        #[test]
        fn score_is_symmetric(a in "[a-z ]{1,30}", b in "[a-z ]{1,30}") {
            prop_assert_eq!(token_sort_score(&a, &b), token_sort_score(&b, &a));
        }

        #[test]
        fn token_order_does_not_matter(a in "[a-z]{1,8}", b in "[a-z]{1,8}", q in "[a-z ]{1,20}") {
            let forward = format!("{a} {b}");
            let backward = format!("{b} {a}");
            prop_assert_eq!(
                token_sort_score(&forward, &q),
                token_sort_score(&backward, &q)
            );
        }
    }
}
