use crate::error::Result;
use async_trait::async_trait;

/// Completion capability used for disambiguation and deduplication.
///
/// The core asks for strict JSON and validates every reply itself; nothing
/// here assumes the underlying model constrains its own output shape.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one prompt, return the raw text reply.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Model name for logging.
    fn model_name(&self) -> &str;
}
