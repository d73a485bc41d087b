use crate::config::ResolverConfig;
use crate::fuzzy::FuzzyNameMatcher;
use std::sync::Arc;
use stockkeeper_catalog::CatalogIndex;
use stockkeeper_protocol::{Candidate, ProductMention, ResolutionMethod};
use stockkeeper_semantic::SemanticClient;

/// Result of running the tiers for one mention.
#[derive(Debug, Clone)]
pub struct CascadeOutcome {
    /// Accepted candidates, sorted by confidence descending, at most
    /// `max_results` entries.
    pub candidates: Vec<Candidate>,
    /// Best candidate that fell below the acceptance threshold, kept for
    /// UnresolvedMention diagnostics.
    pub best_rejected: Option<Candidate>,
}

impl CascadeOutcome {
    fn empty() -> Self {
        Self {
            candidates: Vec::new(),
            best_rejected: None,
        }
    }
}

/// Tier priority used to break equal-confidence ties: fuzzy matching is
/// more precise than semantic retrieval for exact-ish name matches.
fn method_rank(method: ResolutionMethod) -> u8 {
    match method {
        ResolutionMethod::ExactId => 0,
        ResolutionMethod::FuzzyName => 1,
        ResolutionMethod::SemanticSearch => 2,
        ResolutionMethod::LlmDisambiguated => 3,
    }
}

/// Sort by confidence descending; equal confidence falls back to tier
/// priority, then to the existing (insertion) order via stable sort.
pub(crate) fn sort_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| method_rank(a.method).cmp(&method_rank(b.method)))
    });
}

/// Runs the exact -> fuzzy -> semantic tiers for one mention, stopping
/// early when confidence is already conclusive. Each tier is progressively
/// more expensive and less precise, hence the fixed order.
pub struct ResolutionCascade {
    catalog: Arc<CatalogIndex>,
    fuzzy: FuzzyNameMatcher,
    semantic: Arc<SemanticClient>,
    config: ResolverConfig,
}

impl ResolutionCascade {
    pub fn new(
        catalog: Arc<CatalogIndex>,
        semantic: Arc<SemanticClient>,
        config: ResolverConfig,
    ) -> Self {
        let fuzzy = FuzzyNameMatcher::new(Arc::clone(&catalog));
        Self {
            catalog,
            fuzzy,
            semantic,
            config,
        }
    }

    /// Resolve one mention into a ranked candidate list.
    pub async fn resolve(&self, mention: &ProductMention) -> CascadeOutcome {
        // Tier 1: exact ID lookup. Free and certain; a hit ends the cascade.
        if let Some(raw_id) = mention.product_id.as_deref() {
            if let Some(product) = self.catalog.lookup_exact(raw_id) {
                log::debug!("Exact tier hit: '{}' -> {}", raw_id, product.id);
                return CascadeOutcome {
                    candidates: vec![Candidate {
                        product: product.clone(),
                        confidence: 1.0,
                        method: ResolutionMethod::ExactId,
                    }],
                    best_rejected: None,
                };
            }
            log::debug!("Exact tier miss for '{}'", raw_id);
        }

        let mut pool: Vec<Candidate> = Vec::new();
        let mut best_rejected: Option<Candidate> = None;

        // Tier 2: fuzzy name matching over the whole catalog.
        if let Some(name) = mention.name.as_deref() {
            let pool_size = self.config.max_results * 5;
            let scored = self.fuzzy.match_by_name(name, 0.0, pool_size);

            if let Some(top) = scored.first() {
                if top.confidence >= self.config.fuzzy_exact_threshold {
                    log::debug!(
                        "Fuzzy tier conclusive: '{}' -> {} ({:.3})",
                        name,
                        top.product.id,
                        top.confidence
                    );
                    return CascadeOutcome {
                        candidates: vec![top.clone()],
                        best_rejected: None,
                    };
                }
            }

            for candidate in scored {
                if candidate.confidence >= self.config.fuzzy_min_threshold {
                    pool.push(candidate);
                } else if best_rejected
                    .as_ref()
                    .map(|best| candidate.confidence > best.confidence)
                    .unwrap_or(candidate.confidence > 0.0)
                {
                    best_rejected = Some(candidate);
                }
            }
        }

        // Tier 3: semantic search on the best available text. Backend
        // trouble means zero candidates from this tier, never a failure.
        match self.semantic.search(mention).await {
            Ok(semantic_candidates) => {
                for candidate in semantic_candidates {
                    let already_pooled = pool
                        .iter()
                        .any(|existing| existing.product.id == candidate.product.id);
                    if !already_pooled {
                        pool.push(candidate);
                    }
                }
            }
            Err(err) => {
                log::warn!("Semantic tier degraded to zero candidates: {}", err);
            }
        }

        if pool.is_empty() {
            log::debug!("Cascade produced no candidates for '{}'", mention.excerpt);
            return CascadeOutcome {
                candidates: Vec::new(),
                best_rejected,
            };
        }

        sort_candidates(&mut pool);
        pool.truncate(self.config.max_results);
        CascadeOutcome {
            candidates: pool,
            best_rejected,
        }
    }

    /// Blank mentions have nothing to resolve against.
    pub async fn resolve_or_empty(&self, mention: &ProductMention) -> CascadeOutcome {
        if mention.is_blank() && mention.excerpt.trim().is_empty() {
            return CascadeOutcome::empty();
        }
        self.resolve(mention).await
    }
}
