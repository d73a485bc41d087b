mod client;
mod error;
mod openai;
mod scripted;

pub use client::CompletionClient;
pub use error::{LlmError, Result};
pub use openai::OpenAiClient;
pub use scripted::ScriptedCompletion;
