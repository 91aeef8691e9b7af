//! Gemini Embedding API client

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::EmbeddingConfig;
use crate::error::{SearchError, SearchResult};

/// Truncate `text` to at most `max_chars` characters (character count, not
/// bytes). Shared by the build and query paths so corpus chunks and query
/// text stay comparable in scale.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Gemini Embedding API client
pub struct EmbeddingClient {
    config: EmbeddingConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct EmbedContentRequest<'a> {
    content: Content<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl EmbeddingClient {
    /// Create a new embedding client
    pub fn new(config: EmbeddingConfig) -> SearchResult<Self> {
        // Validate API key is available
        config.get_api_key()?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(SearchError::Http)?;

        Ok(Self { config, client })
    }

    /// Model identifier requests are issued with
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Generate an embedding for a single text.
    ///
    /// The caller is responsible for truncating `text` to the embedding
    /// budget first.
    pub async fn embed(&self, text: &str) -> SearchResult<Vec<f32>> {
        let api_key = self.config.get_api_key()?;
        let url = format!(
            "{}/models/{}:embedContent",
            self.config.api_base, self.config.model
        );

        let request = EmbedContentRequest {
            content: Content {
                parts: vec![Part { text }],
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(SearchError::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(SearchError::Http)?;

        if !status.is_success() {
            // Try to parse error message
            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&body) {
                return Err(SearchError::Embedding(error_response.error.message));
            }
            return Err(SearchError::Embedding(format!(
                "API error ({}): {}",
                status, body
            )));
        }

        let response: EmbedContentResponse =
            serde_json::from_str(&body).map_err(SearchError::Json)?;

        if response.embedding.values.is_empty() {
            return Err(SearchError::Embedding("no embedding returned".to_string()));
        }

        Ok(response.embedding.values)
    }
}
