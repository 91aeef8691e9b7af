//! Data model for chunks, snapshots and search results

use serde::{Deserialize, Serialize};

/// Source coordinates of a chunk within the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Path of the source document, relative to the content root
    pub file: String,
    /// Nearest enclosing heading title
    pub section: String,
    /// Heading trail; always contains at least the top-level heading
    pub headings: Vec<String>,
}

/// The unit of retrieval: one embedded section of a document.
///
/// Created exclusively by the snapshot builder and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique id, generated at build time, never reused across rebuilds
    pub id: String,
    /// Section text, truncated to the embedding budget before storage
    pub content: String,
    /// Embedding vector; same length for every chunk in a snapshot
    pub embedding: Vec<f32>,
    pub metadata: ChunkMetadata,
}

/// The persisted corpus: every chunk plus build provenance.
///
/// Immutable once written; a rebuild replaces the whole artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub chunks: Vec<Chunk>,
    /// Embedding model that produced every vector in `chunks`; query
    /// embeddings must come from the same model to be comparable
    pub model: String,
    /// Build wall-clock timestamp, RFC 3339
    pub generated_at: String,
}

/// A scored chunk returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub content: String,
    pub relevance_score: f32,
    pub metadata: ChunkMetadata,
}
