mod ambiguity;
mod cascade;
mod config;
mod dedup;
mod error;
mod fuzzy;
mod pipeline;
pub mod test_support;

pub use ambiguity::{AmbiguityResolver, MentionOutcome};
pub use cascade::{CascadeOutcome, ResolutionCascade};
pub use config::ResolverConfig;
pub use dedup::MentionDeduplicator;
pub use error::{ResolverError, Result};
pub use fuzzy::{token_sort_score, FuzzyNameMatcher};
pub use pipeline::Stockkeeper;
