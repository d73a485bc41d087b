use thiserror::Error;

pub type Result<T> = std::result::Result<T, LlmError>;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion request timed out")]
    Timeout,

    #[error("completion response contained no text")]
    EmptyResponse,

    #[error("malformed completion reply: {0}")]
    MalformedReply(String),

    #[error("{0}")]
    Other(String),
}
