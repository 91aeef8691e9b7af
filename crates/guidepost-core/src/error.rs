//! Error types for the retrieval pipeline

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("missing embedding API key (set GEMINI_API_KEY or GOOGLE_API_KEY)")]
    ApiKeyMissing,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("embedding size mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

pub type SearchResult<T> = Result<T, SearchError>;
