//! Guidepost core
//!
//! Semantic retrieval over a corpus of markdown guideline documents:
//!
//! - Markdown-aware, heading-aligned document segmentation
//! - Gemini Embedding API integration
//! - Flat JSON snapshot artifact with atomic replacement
//! - Cosine-similarity top-K ranking
//!
//! ## Usage
//!
//! ```rust,ignore
//! use guidepost_core::{SearchConfig, Searcher, SnapshotStore};
//!
//! let config = SearchConfig::load()?;
//! let store = SnapshotStore::new(config.paths.get_snapshot_path());
//! let searcher = Searcher::initialize(config, &store)?;
//! let hits = searcher.query("how do we name modules", None).await?;
//! ```

mod builder;
mod config;
mod embedding;
mod error;
mod ranker;
mod searcher;
mod segmenter;
mod snapshot;
mod types;

#[cfg(test)]
mod tests;

pub use builder::{BuildStats, SnapshotBuilder};
pub use config::{EmbeddingConfig, PathsConfig, SearchBehaviorConfig, SearchConfig};
pub use embedding::{truncate_chars, EmbeddingClient};
pub use error::{SearchError, SearchResult};
pub use ranker::{cosine_similarity, rank, DEFAULT_LIMIT};
pub use searcher::Searcher;
pub use segmenter::{segment, Section};
pub use snapshot::SnapshotStore;
pub use types::{Chunk, ChunkMetadata, SearchHit, Snapshot};
