//! Query service: loads the snapshot once and answers ranked queries

use crate::config::SearchConfig;
use crate::embedding::{truncate_chars, EmbeddingClient};
use crate::error::SearchResult;
use crate::ranker::rank;
use crate::snapshot::SnapshotStore;
use crate::types::{SearchHit, Snapshot};

/// Owns the in-memory snapshot for the life of the process and turns query
/// text into ranked hits.
///
/// The snapshot is loaded exactly once at construction and never mutated;
/// queries borrow it read-only. Query embeddings are produced with the model
/// recorded in the snapshot, not the configured default, so corpus and query
/// vectors always come from the same model.
pub struct Searcher {
    config: SearchConfig,
    client: EmbeddingClient,
    snapshot: Snapshot,
}

impl Searcher {
    /// Load the snapshot and prepare the embedding client.
    ///
    /// A missing or unparseable artifact is an error here, not at query
    /// time: a searcher that constructs successfully can always serve.
    pub fn initialize(config: SearchConfig, store: &SnapshotStore) -> SearchResult<Self> {
        let snapshot = store.load()?;

        let mut embedding_config = config.embedding.clone();
        embedding_config.model = snapshot.model.clone();
        let client = EmbeddingClient::new(embedding_config)?;

        log::info!(
            "loaded snapshot: {} chunks, model {}, generated {}",
            snapshot.chunks.len(),
            snapshot.model,
            snapshot.generated_at
        );

        Ok(Self {
            config,
            client,
            snapshot,
        })
    }

    pub fn chunk_count(&self) -> usize {
        self.snapshot.chunks.len()
    }

    pub fn model(&self) -> &str {
        &self.snapshot.model
    }

    /// Embed `text` and return the highest-scoring chunks.
    ///
    /// `limit` falls back to the configured default when missing. The query
    /// text is truncated to the same character budget the builder applied
    /// to corpus chunks. Errors are scoped to this query; the loaded
    /// snapshot stays intact for subsequent calls.
    pub async fn query(&self, text: &str, limit: Option<usize>) -> SearchResult<Vec<SearchHit>> {
        let limit = limit
            .filter(|&n| n > 0)
            .unwrap_or(self.config.search.default_limit);
        let text = truncate_chars(text, self.config.search.max_chars);

        let vector = self.client.embed(text).await?;
        rank(&self.snapshot.chunks, &vector, limit)
    }
}
