use thiserror::Error;

pub type Result<T> = std::result::Result<T, SemanticError>;

/// Semantic-tier failures are transient infrastructure conditions; the
/// cascade maps every variant to "zero candidates from this tier".
#[derive(Error, Debug)]
pub enum SemanticError {
    #[error("retrieval backend unavailable: {0}")]
    Unavailable(String),

    #[error("semantic search timed out")]
    Timeout,
}
