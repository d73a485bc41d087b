use crate::config::ResolverConfig;
use crate::fuzzy::token_sort_score;
use serde::Deserialize;
use std::sync::Arc;
use stockkeeper_catalog::normalize_id;
use stockkeeper_llm::CompletionClient;
use stockkeeper_protocol::{MentionSegment, ProductMention};

/// Strict schema for the deduplication reply: a partition of mention
/// indices into groups.
#[derive(Debug, Deserialize)]
struct DedupReply {
    groups: Vec<Vec<usize>>,
}

fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Collapses mentions within one email that refer to the same product, so
/// the cascade does not resolve (and return) duplicates.
///
/// Deduplication is a quality pass: any LLM trouble means the original
/// mention list proceeds unmerged.
pub struct MentionDeduplicator {
    llm: Arc<dyn CompletionClient>,
    config: ResolverConfig,
}

impl MentionDeduplicator {
    pub fn new(llm: Arc<dyn CompletionClient>, config: ResolverConfig) -> Self {
        Self { llm, config }
    }

    /// Merge duplicate mentions; never fails.
    pub async fn deduplicate(
        &self,
        mentions: Vec<ProductMention>,
        email_body: &str,
    ) -> Vec<ProductMention> {
        if mentions.len() < 2 {
            return mentions;
        }

        // First pass: cheap coarse signals, no LLM.
        let mut groups = self.coarse_groups(&mentions);

        // Second pass: LLM arbitration for free-text-only mentions the
        // coarse pass could not relate.
        let freetext_groups = groups
            .iter()
            .filter(|group| {
                group
                    .iter()
                    .all(|&idx| mentions[idx].product_id.is_none())
            })
            .count();
        if freetext_groups >= 2 {
            if let Some(merged) = self.llm_groups(&mentions, &groups, email_body).await {
                groups = merged;
            }
        }

        let deduplicated: Vec<ProductMention> = groups
            .into_iter()
            .map(|group| Self::merge_group(&mentions, &group))
            .collect();

        if deduplicated.len() < mentions.len() {
            log::info!(
                "Deduplicated {} mentions into {}",
                mentions.len(),
                deduplicated.len()
            );
        }
        deduplicated
    }

    /// Union-find over coarse signals: shared normalized product ID, or
    /// near-identical name text.
    fn coarse_groups(&self, mentions: &[ProductMention]) -> Vec<Vec<usize>> {
        let mut parent: Vec<usize> = (0..mentions.len()).collect();

        fn find(parent: &mut Vec<usize>, x: usize) -> usize {
            let next = parent[x];
            if next == x {
                return x;
            }
            let root = find(parent, next);
            parent[x] = root;
            root
        }

        for a in 0..mentions.len() {
            for b in (a + 1)..mentions.len() {
                if self.same_product_coarse(&mentions[a], &mentions[b]) {
                    let root_a = find(&mut parent, a);
                    let root_b = find(&mut parent, b);
                    if root_a != root_b {
                        parent[root_b] = root_a;
                    }
                }
            }
        }

        let mut groups: Vec<Vec<usize>> = Vec::new();
        for idx in 0..mentions.len() {
            let root = find(&mut parent, idx);
            match groups.iter_mut().find(|g| find(&mut parent, g[0]) == root) {
                Some(group) => group.push(idx),
                None => groups.push(vec![idx]),
            }
        }
        groups
    }

    fn same_product_coarse(&self, a: &ProductMention, b: &ProductMention) -> bool {
        if let (Some(id_a), Some(id_b)) = (a.product_id.as_deref(), b.product_id.as_deref()) {
            let norm_a = normalize_id(id_a);
            let norm_b = normalize_id(id_b);
            if !norm_a.is_empty() && norm_a == norm_b {
                return true;
            }
        }
        if let (Some(name_a), Some(name_b)) = (a.name.as_deref(), b.name.as_deref()) {
            if token_sort_score(name_a, name_b) >= self.config.dedup_name_threshold {
                return true;
            }
        }
        false
    }

    /// One LLM call over the numbered mention list. Returns `None` (keep
    /// coarse groups) unless the reply is a valid partition of the groups.
    async fn llm_groups(
        &self,
        mentions: &[ProductMention],
        groups: &[Vec<usize>],
        email_body: &str,
    ) -> Option<Vec<Vec<usize>>> {
        let prompt = self.build_prompt(mentions, groups, email_body);

        let reply = match tokio::time::timeout(
            self.config.llm_timeout(),
            self.llm.complete(&prompt),
        )
        .await
        {
            Ok(Ok(text)) => text,
            Ok(Err(err)) => {
                log::warn!("Dedup call failed, keeping unmerged mentions: {}", err);
                return None;
            }
            Err(_) => {
                log::warn!("Dedup call timed out, keeping unmerged mentions");
                return None;
            }
        };

        let parsed: DedupReply = match extract_json(&reply).and_then(|json| {
            serde_json::from_str(json).ok()
        }) {
            Some(parsed) => parsed,
            None => {
                log::warn!("Dedup reply failed schema validation: {:?}", reply);
                return None;
            }
        };

        // The reply groups index into `groups` and must partition them.
        let mut seen = vec![false; groups.len()];
        for group in &parsed.groups {
            for &idx in group {
                if idx >= groups.len() || seen[idx] {
                    log::warn!("Dedup reply is not a partition, keeping coarse groups");
                    return None;
                }
                seen[idx] = true;
            }
        }
        if !seen.iter().all(|&s| s) {
            log::warn!("Dedup reply dropped mentions, keeping coarse groups");
            return None;
        }

        Some(
            parsed
                .groups
                .into_iter()
                .map(|group_ids| {
                    group_ids
                        .into_iter()
                        .flat_map(|gid| groups[gid].iter().copied())
                        .collect()
                })
                .collect(),
        )
    }

    fn build_prompt(
        &self,
        mentions: &[ProductMention],
        groups: &[Vec<usize>],
        email_body: &str,
    ) -> String {
        let mut listing = String::new();
        for (gid, group) in groups.iter().enumerate() {
            let representative = &mentions[group[0]];
            let detail = representative
                .name
                .as_deref()
                .or(representative.description.as_deref())
                .unwrap_or(representative.excerpt.as_str());
            listing.push_str(&format!("{gid}. \"{}\" ({})\n", representative.excerpt, detail));
        }

        format!(
            "These product mentions were extracted from one customer email. \
             Group together the numbers that refer to the same product.\n\n\
             Mentions:\n{listing}\n\
             Full email:\n{email}\n\n\
             Reply with exactly one JSON object and nothing else, covering \
             every number exactly once:\n\
             {{\"groups\": [[0, 2], [1]]}}",
            listing = listing,
            email = email_body,
        )
    }

    /// Merge one group, keeping the most specific identifying text and
    /// summing quantities.
    fn merge_group(mentions: &[ProductMention], group: &[usize]) -> ProductMention {
        let members: Vec<&ProductMention> = group.iter().map(|&idx| &mentions[idx]).collect();

        let quantity = members.iter().map(|m| m.quantity).sum();
        let product_id = members.iter().find_map(|m| m.product_id.clone());
        let name = members.iter().find_map(|m| m.name.clone());
        let description = members.iter().find_map(|m| m.description.clone());
        let excerpt = members
            .iter()
            .map(|m| m.excerpt.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        // An order mention merged with an inquiry about the same product is
        // an order.
        let segment = if members.iter().any(|m| m.segment == MentionSegment::Order) {
            MentionSegment::Order
        } else {
            MentionSegment::Inquiry
        };

        ProductMention {
            excerpt,
            product_id,
            name,
            description,
            quantity,
            segment,
        }
    }
}
