//! Snapshot builder: document tree to embedded chunk snapshot

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

use crate::config::SearchConfig;
use crate::embedding::{truncate_chars, EmbeddingClient};
use crate::error::SearchResult;
use crate::segmenter::segment;
use crate::snapshot::SnapshotStore;
use crate::types::{Chunk, ChunkMetadata, Snapshot};

/// Build summary reported to the operator
#[derive(Debug, Clone, serde::Serialize)]
pub struct BuildStats {
    /// Documents that contributed at least one chunk
    pub total_docs: usize,
    /// Total chunks written
    pub total_chunks: usize,
    /// Time elapsed in milliseconds
    pub elapsed_ms: u64,
}

/// Walks a document tree, embeds every section and assembles the snapshot.
pub struct SnapshotBuilder {
    config: SearchConfig,
    content_root: PathBuf,
    client: EmbeddingClient,
}

impl SnapshotBuilder {
    /// Create a new builder.
    ///
    /// Fails when the embedding credential is absent, before any document
    /// is read.
    pub fn new(config: SearchConfig, content_root: PathBuf) -> SearchResult<Self> {
        let client = EmbeddingClient::new(config.embedding.clone())?;
        Ok(Self {
            config,
            content_root,
            client,
        })
    }

    /// Embed every markdown document under the content root.
    ///
    /// Any embedding failure aborts the whole build; nothing is persisted
    /// by this method.
    pub async fn build(&self) -> SearchResult<Snapshot> {
        let files = find_markdown_files(&self.content_root)?;
        log::info!(
            "discovered {} markdown documents under {}",
            files.len(),
            self.content_root.display()
        );

        let mut chunks = Vec::new();
        for path in &files {
            let rel_path = path
                .strip_prefix(&self.content_root)
                .unwrap_or(path)
                .to_string_lossy()
                .into_owned();
            let content = fs::read_to_string(path)?;
            let mut doc_chunks = 0;

            for section in segment(&content) {
                if section.text.trim().is_empty() {
                    continue;
                }
                let text = truncate_chars(&section.text, self.config.search.max_chars);
                let embedding = self.client.embed(text).await?;
                chunks.push(Chunk {
                    id: Uuid::new_v4().to_string(),
                    content: text.to_string(),
                    embedding,
                    metadata: ChunkMetadata {
                        file: rel_path.clone(),
                        section: section.section,
                        headings: section.headings,
                    },
                });
                doc_chunks += 1;
            }

            log::info!("embedded {} chunks from {}", doc_chunks, rel_path);
        }

        Ok(Snapshot {
            chunks,
            model: self.client.model().to_string(),
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }

    /// Build and persist atomically, replacing any prior artifact.
    ///
    /// On failure the prior artifact, if any, is left untouched.
    pub async fn build_and_save(&self, store: &SnapshotStore) -> SearchResult<BuildStats> {
        let start = Instant::now();

        let snapshot = self.build().await?;
        store.save(&snapshot)?;

        let total_docs = snapshot
            .chunks
            .iter()
            .map(|c| c.metadata.file.as_str())
            .collect::<BTreeSet<_>>()
            .len();
        let total_chunks = snapshot.chunks.len();
        log::info!(
            "wrote {} chunks to {}",
            total_chunks,
            store.path().display()
        );

        Ok(BuildStats {
            total_docs,
            total_chunks,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Recursively collect `*.md` files, depth-first with sorted entries so
/// rebuilds of an unchanged tree visit documents in the same order.
fn find_markdown_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            files.extend(find_markdown_files(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "md") {
            files.push(path);
        }
    }

    Ok(files)
}
