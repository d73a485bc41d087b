use crate::ambiguity::{AmbiguityResolver, MentionOutcome};
use crate::cascade::ResolutionCascade;
use crate::config::ResolverConfig;
use crate::dedup::MentionDeduplicator;
use crate::error::Result;
use std::sync::Arc;
use stockkeeper_catalog::CatalogIndex;
use stockkeeper_llm::CompletionClient;
use stockkeeper_protocol::{
    CatalogProduct, ProductMention, ResolutionReport, UnresolvedMention,
};
use stockkeeper_semantic::{SemanticClient, SemanticConfig, VectorSearcher};
use tokio::task::JoinSet;

/// The resolution engine: deduplicates an email's product mentions, then
/// resolves each one through the tiered cascade, escalating to LLM
/// disambiguation only when candidates are too close to call.
///
/// All shared state is read-only behind `Arc`s, so mentions of one email
/// resolve concurrently.
pub struct Stockkeeper {
    cascade: Arc<ResolutionCascade>,
    ambiguity: Arc<AmbiguityResolver>,
    dedup: MentionDeduplicator,
}

impl Stockkeeper {
    pub fn new(
        catalog: Arc<CatalogIndex>,
        searcher: Arc<dyn VectorSearcher>,
        llm: Arc<dyn CompletionClient>,
        config: ResolverConfig,
    ) -> Self {
        let semantic = Arc::new(SemanticClient::new(
            searcher,
            Arc::clone(&catalog),
            SemanticConfig {
                top_k: config.semantic_top_k,
                confidence: config.semantic_confidence,
                timeout: config.semantic_timeout(),
            },
        ));
        let cascade = Arc::new(ResolutionCascade::new(
            catalog,
            semantic,
            config.clone(),
        ));
        let ambiguity = Arc::new(AmbiguityResolver::new(Arc::clone(&llm), config.clone()));
        let dedup = MentionDeduplicator::new(llm, config);
        Self {
            cascade,
            ambiguity,
            dedup,
        }
    }

    /// Convenience constructor validating a raw catalog first.
    pub fn from_products(
        products: Vec<CatalogProduct>,
        searcher: Arc<dyn VectorSearcher>,
        llm: Arc<dyn CompletionClient>,
        config: ResolverConfig,
    ) -> Result<Self> {
        let catalog = Arc::new(CatalogIndex::from_products(products)?);
        Ok(Self::new(catalog, searcher, llm, config))
    }

    /// Resolve every mention of one email.
    ///
    /// Mentions resolve concurrently; results are re-associated by mention
    /// index afterward, so output order is deterministic. One mention's
    /// failure never aborts its siblings.
    pub async fn resolve_email(
        &self,
        mentions: Vec<ProductMention>,
        email_body: &str,
    ) -> ResolutionReport {
        let mentions = self.dedup.deduplicate(mentions, email_body).await;
        let email_body: Arc<str> = Arc::from(email_body);

        let mut tasks: JoinSet<(usize, MentionOutcome)> = JoinSet::new();
        for (idx, mention) in mentions.iter().cloned().enumerate() {
            let cascade = Arc::clone(&self.cascade);
            let ambiguity = Arc::clone(&self.ambiguity);
            let email_body = Arc::clone(&email_body);
            tasks.spawn(async move {
                let outcome = cascade.resolve_or_empty(&mention).await;
                let disposition = ambiguity
                    .finalize(&mention, &email_body, outcome, idx)
                    .await;
                (idx, disposition)
            });
        }

        let mut outcomes: Vec<Option<MentionOutcome>> = vec![None; mentions.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, disposition)) => outcomes[idx] = Some(disposition),
                Err(err) => log::error!("Mention resolution task failed: {}", err),
            }
        }

        let mut resolved = Vec::new();
        let mut unresolved = Vec::new();
        for (idx, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Some(MentionOutcome::Resolved(products)) => resolved.extend(products),
                Some(MentionOutcome::Unresolved(entry)) => unresolved.push(entry),
                // A lost task leaves its mention unresolved rather than
                // aborting the email.
                None => unresolved.push(UnresolvedMention {
                    mention_index: idx,
                    best_candidate: None,
                }),
            }
        }

        log::info!(
            "Email resolved: {} mentions -> {} resolved, {} unresolved",
            mentions.len(),
            resolved.len(),
            unresolved.len()
        );

        ResolutionReport {
            mentions,
            resolved,
            unresolved,
        }
    }
}
