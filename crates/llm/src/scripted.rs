use crate::client::CompletionClient;
use crate::error::{LlmError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Deterministic in-memory completion client.
///
/// Replies are played back in order; prompts are recorded so tests can
/// assert which calls happened (and how many).
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.to_string())).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A client whose every call fails, for degradation tests.
    pub fn failing() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue an error reply at the back of the script.
    pub fn push_error(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(LlmError::Other(message.to_string())));
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::Other("script exhausted".to_string())))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn plays_back_replies_in_order() {
        let client = ScriptedCompletion::new(vec!["first", "second"]);
        assert_eq!(client.complete("a").await.unwrap(), "first");
        assert_eq!(client.complete("b").await.unwrap(), "second");
        assert!(client.complete("c").await.is_err());
        assert_eq!(client.calls(), 3);
        assert_eq!(client.prompts()[1], "b");
    }

    #[tokio::test]
    async fn failing_client_always_errors() {
        let client = ScriptedCompletion::failing();
        assert!(client.complete("anything").await.is_err());
    }
}
