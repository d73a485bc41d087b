use crate::cascade::CascadeOutcome;
use crate::config::ResolverConfig;
use serde::Deserialize;
use std::sync::Arc;
use stockkeeper_llm::CompletionClient;
use stockkeeper_protocol::{
    Candidate, ProductMention, ResolutionMethod, ResolvedProduct, UnresolvedMention,
};

/// Final disposition of one mention.
#[derive(Debug, Clone)]
pub enum MentionOutcome {
    /// One or more candidates, ordered by confidence. Multiple entries per
    /// mention are deliberate: downstream components hold context this core
    /// does not, so the final pick is pushed to them when several plausible
    /// candidates exist.
    Resolved(Vec<ResolvedProduct>),
    Unresolved(UnresolvedMention),
}

/// Strict schema for the disambiguation reply. Anything that does not parse
/// into this shape triggers the documented fallback.
#[derive(Debug, Deserialize)]
struct DisambiguationReply {
    product_id: String,
    #[serde(default)]
    reasoning: String,
}

/// Slice out the JSON object from a reply that may be wrapped in prose or
/// code fences.
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// When the cascade's top candidates are close in confidence, asks the LLM
/// to make the call with full email context instead of arbitrarily taking
/// the highest score.
pub struct AmbiguityResolver {
    llm: Arc<dyn CompletionClient>,
    config: ResolverConfig,
}

impl AmbiguityResolver {
    pub fn new(llm: Arc<dyn CompletionClient>, config: ResolverConfig) -> Self {
        Self { llm, config }
    }

    fn is_ambiguous(&self, candidates: &[Candidate]) -> bool {
        if candidates.len() < 2 {
            return false;
        }
        let gap = candidates[0].confidence - candidates[1].confidence;
        gap <= self.config.ambiguity_gap
    }

    /// Turn a cascade outcome into the mention's final disposition.
    pub async fn finalize(
        &self,
        mention: &ProductMention,
        email_body: &str,
        outcome: CascadeOutcome,
        mention_index: usize,
    ) -> MentionOutcome {
        if outcome.candidates.is_empty() {
            return MentionOutcome::Unresolved(UnresolvedMention {
                mention_index,
                best_candidate: outcome.best_rejected,
            });
        }

        if !self.is_ambiguous(&outcome.candidates) {
            return Self::accept_all(&outcome.candidates, mention_index);
        }

        match self
            .disambiguate(mention, email_body, &outcome.candidates)
            .await
        {
            Some(product_idx) => {
                let chosen = &outcome.candidates[product_idx];
                MentionOutcome::Resolved(vec![ResolvedProduct {
                    product: chosen.product.clone(),
                    confidence: self.config.llm_confidence,
                    method: ResolutionMethod::LlmDisambiguated,
                    mention_index,
                }])
            }
            // Fall back to Clear behavior; never fatal at this stage.
            None => Self::accept_all(&outcome.candidates, mention_index),
        }
    }

    fn accept_all(candidates: &[Candidate], mention_index: usize) -> MentionOutcome {
        MentionOutcome::Resolved(
            candidates
                .iter()
                .map(|candidate| ResolvedProduct {
                    product: candidate.product.clone(),
                    confidence: candidate.confidence,
                    method: candidate.method,
                    mention_index,
                })
                .collect(),
        )
    }

    /// One LLM round-trip; returns the index of the selected candidate, or
    /// `None` on any failure (timeout, parse error, hallucinated ID).
    async fn disambiguate(
        &self,
        mention: &ProductMention,
        email_body: &str,
        candidates: &[Candidate],
    ) -> Option<usize> {
        let prompt = self.build_prompt(mention, email_body, candidates);

        let reply = match tokio::time::timeout(
            self.config.llm_timeout(),
            self.llm.complete(&prompt),
        )
        .await
        {
            Ok(Ok(text)) => text,
            Ok(Err(err)) => {
                log::warn!("Disambiguation call failed, accepting top candidate: {}", err);
                return None;
            }
            Err(_) => {
                log::warn!("Disambiguation timed out, accepting top candidate");
                return None;
            }
        };

        let json = match extract_json(&reply) {
            Some(json) => json,
            None => {
                log::warn!("Disambiguation reply contained no JSON object: {:?}", reply);
                return None;
            }
        };

        let parsed: DisambiguationReply = match serde_json::from_str(json) {
            Ok(parsed) => parsed,
            Err(err) => {
                log::warn!("Disambiguation reply failed schema validation: {}", err);
                return None;
            }
        };

        let selected = parsed.product_id.trim();
        match candidates
            .iter()
            .position(|c| c.product.id == selected)
        {
            Some(idx) => {
                log::debug!(
                    "LLM disambiguation picked {} for '{}': {}",
                    selected,
                    mention.excerpt,
                    parsed.reasoning
                );
                Some(idx)
            }
            None => {
                log::warn!(
                    "Disambiguation selected unknown id '{}' (candidates: {:?})",
                    selected,
                    candidates
                        .iter()
                        .map(|c| c.product.id.as_str())
                        .collect::<Vec<_>>()
                );
                None
            }
        }
    }

    fn build_prompt(
        &self,
        mention: &ProductMention,
        email_body: &str,
        candidates: &[Candidate],
    ) -> String {
        let mut candidate_table = String::new();
        for candidate in candidates {
            let description: String = candidate.product.description.chars().take(120).collect();
            candidate_table.push_str(&format!(
                "- {}: {} — {}\n",
                candidate.product.id, candidate.product.name, description
            ));
        }

        format!(
            "A customer email mentions a product ambiguously. Pick the catalog \
             entry the customer most plausibly means.\n\n\
             Mention: {mention}\n\n\
             Full email:\n{email}\n\n\
             Candidates:\n{candidates}\n\
             Reply with exactly one JSON object and nothing else:\n\
             {{\"product_id\": \"<one of the candidate IDs>\", \"reasoning\": \"<short justification>\"}}",
            mention = mention.excerpt,
            email = email_body,
            candidates = candidate_table,
        )
    }
}
