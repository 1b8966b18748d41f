use thiserror::Error;

/// Failure modes of the analysis pipeline.
///
/// `SourceUnavailable` is transient and retried with backoff by the
/// orchestrator; `VideoNotFound` is terminal for that video and never
/// retried. `InsufficientThemes` only degrades script generation, it never
/// aborts an analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid video locator: {0}")]
    InvalidLocator(String),

    #[error("comment source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("video not found or comment listing disallowed: {0}")]
    VideoNotFound(String),

    #[error("no clear themes emerged from the comments")]
    InsufficientThemes,

    #[error("embedding provider failed: {0}")]
    Embedding(String),

    #[error("comment cache error: {0}")]
    Cache(#[from] rusqlite::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AnalysisError {
    /// Transient failures worth another attempt after a pause.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AnalysisError::SourceUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
