use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunable parameters of the resolution pipeline.
///
/// The thresholds are empirically chosen, not derived; treat them as knobs,
/// not physical constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Fuzzy score at or above which a name match is treated as conclusive
    /// and short-circuits the semantic tier.
    pub fuzzy_exact_threshold: f32,

    /// Fuzzy score below which a candidate is discarded entirely.
    pub fuzzy_min_threshold: f32,

    /// Top-two confidence gap at or below which a mention is ambiguous and
    /// goes to LLM disambiguation.
    pub ambiguity_gap: f32,

    /// Maximum candidates returned per mention.
    pub max_results: usize,

    /// Neighbors requested from the vector index per query.
    pub semantic_top_k: usize,

    /// Fixed confidence assigned to semantic hits.
    pub semantic_confidence: f32,

    /// Fixed confidence assigned to LLM-disambiguated picks.
    pub llm_confidence: f32,

    pub semantic_timeout_ms: u64,
    pub llm_timeout_ms: u64,

    /// Name similarity at or above which two mentions are coarsely merged
    /// by the deduplicator without consulting the LLM.
    pub dedup_name_threshold: f32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            fuzzy_exact_threshold: 0.95,
            fuzzy_min_threshold: 0.75,
            ambiguity_gap: 0.15,
            max_results: 3,
            semantic_top_k: 5,
            semantic_confidence: 0.8,
            llm_confidence: 0.9,
            semantic_timeout_ms: 10_000,
            llm_timeout_ms: 30_000,
            dedup_name_threshold: 0.9,
        }
    }
}

impl ResolverConfig {
    /// Parse a config from TOML; unspecified fields keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn semantic_timeout(&self) -> Duration {
        Duration::from_millis(self.semantic_timeout_ms)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_millis(self.llm_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_documented_constants() {
        let config = ResolverConfig::default();
        assert_eq!(config.fuzzy_exact_threshold, 0.95);
        assert_eq!(config.fuzzy_min_threshold, 0.75);
        assert_eq!(config.ambiguity_gap, 0.15);
        assert_eq!(config.max_results, 3);
    }

    #[test]
    fn toml_overrides_only_named_fields() {
        let config = ResolverConfig::from_toml_str(
            "fuzzy_min_threshold = 0.6\nmax_results = 5\n",
        )
        .unwrap();
        assert_eq!(config.fuzzy_min_threshold, 0.6);
        assert_eq!(config.max_results, 5);
        assert_eq!(config.fuzzy_exact_threshold, 0.95);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(ResolverConfig::from_toml_str("max_results = \"three\"").is_err());
    }
}
