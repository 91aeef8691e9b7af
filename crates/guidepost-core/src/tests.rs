//! Cross-module tests for the retrieval pipeline

use super::*;

use httpmock::prelude::*;
use std::fs;

fn mock_embedding_config(server: &MockServer) -> EmbeddingConfig {
    EmbeddingConfig {
        api_key: Some("test-key".to_string()),
        api_base: server.base_url(),
        model: "text-embedding-004".to_string(),
    }
}

fn mock_search_config(server: &MockServer) -> SearchConfig {
    SearchConfig {
        embedding: mock_embedding_config(server),
        ..Default::default()
    }
}

fn embedding_body(values: &[f32]) -> serde_json::Value {
    serde_json::json!({ "embedding": { "values": values } })
}

mod embedding_tests {
    use super::*;

    #[tokio::test]
    async fn test_embed_parses_vector() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/models/text-embedding-004:embedContent")
                    .header("x-goog-api-key", "test-key")
                    .body_contains("naming rules");
                then.status(200).json_body(embedding_body(&[0.1, 0.2, 0.3]));
            })
            .await;

        let client = EmbeddingClient::new(mock_embedding_config(&server)).unwrap();
        let vector = client.embed("naming rules").await.unwrap();

        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_embed_propagates_provider_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path_contains(":embedContent");
                then.status(429)
                    .json_body(serde_json::json!({ "error": { "message": "quota exceeded" } }));
            })
            .await;

        let client = EmbeddingClient::new(mock_embedding_config(&server)).unwrap();
        let err = client.embed("anything").await.unwrap_err();

        match err {
            SearchError::Embedding(message) => assert_eq!(message, "quota exceeded"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_credential_rejected_at_construction() {
        std::env::remove_var("GEMINI_API_KEY");
        std::env::remove_var("GOOGLE_API_KEY");

        let config = EmbeddingConfig {
            api_key: None,
            ..Default::default()
        };
        assert!(matches!(
            EmbeddingClient::new(config),
            Err(SearchError::ApiKeyMissing)
        ));
    }
}

mod builder_tests {
    use super::*;

    #[tokio::test]
    async fn test_build_walks_tree_in_order() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path_contains(":embedContent");
                then.status(200).json_body(embedding_body(&[1.0, 0.0]));
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("style")).unwrap();
        fs::write(
            root.join("style/naming.md"),
            "# Naming\n## Modules\nuse nouns\n## Functions\nuse verbs",
        )
        .unwrap();
        fs::write(root.join("layout.md"), "# Layout\n## Files\none type per file").unwrap();

        let builder =
            SnapshotBuilder::new(mock_search_config(&server), root.to_path_buf()).unwrap();
        let snapshot = builder.build().await.unwrap();

        // layout.md sorts before style/naming.md
        let files: Vec<&str> = snapshot
            .chunks
            .iter()
            .map(|c| c.metadata.file.as_str())
            .collect();
        assert_eq!(files, vec!["layout.md", "style/naming.md", "style/naming.md"]);

        let sections: Vec<&str> = snapshot
            .chunks
            .iter()
            .map(|c| c.metadata.section.as_str())
            .collect();
        assert_eq!(sections, vec!["Files", "Modules", "Functions"]);

        assert_eq!(snapshot.model, "text-embedding-004");
        assert!(!snapshot.generated_at.is_empty());

        // Ids are fresh and unique
        let mut ids: Vec<&str> = snapshot.chunks.iter().map(|c| c.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), snapshot.chunks.len());
    }

    #[tokio::test]
    async fn test_build_truncates_long_sections() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path_contains(":embedContent");
                then.status(200).json_body(embedding_body(&[1.0, 0.0]));
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let long_body = "x".repeat(2500);
        fs::write(
            dir.path().join("long.md"),
            format!("# Long\n## Wall\n{}", long_body),
        )
        .unwrap();

        let builder =
            SnapshotBuilder::new(mock_search_config(&server), dir.path().to_path_buf()).unwrap();
        let snapshot = builder.build().await.unwrap();

        assert_eq!(snapshot.chunks.len(), 1);
        assert_eq!(snapshot.chunks[0].content.chars().count(), 2000);
    }

    #[tokio::test]
    async fn test_failed_build_leaves_prior_artifact_untouched() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path_contains(":embedContent")
                    .body_contains("alpha");
                then.status(200).json_body(embedding_body(&[1.0, 0.0]));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path_contains(":embedContent")
                    .body_contains("bravo");
                then.status(500)
                    .json_body(serde_json::json!({ "error": { "message": "backend blew up" } }));
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("doc.md"),
            "# Doc\n## One\nalpha\n## Two\nbravo\n## Three\ncharlie",
        )
        .unwrap();

        let store = SnapshotStore::new(dir.path().join("embeddings.json"));
        let prior = Snapshot {
            chunks: vec![],
            model: "prior-model".to_string(),
            generated_at: "2026-01-01T00:00:00.000Z".to_string(),
        };
        store.save(&prior).unwrap();

        let builder =
            SnapshotBuilder::new(mock_search_config(&server), dir.path().to_path_buf()).unwrap();
        let err = builder.build_and_save(&store).await.unwrap_err();

        assert!(matches!(err, SearchError::Embedding(_)));
        assert_eq!(store.load().unwrap().model, "prior-model");
    }

    #[tokio::test]
    async fn test_build_and_save_reports_stats() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path_contains(":embedContent");
                then.status(200).json_body(embedding_body(&[0.5, 0.5]));
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "# A\n## S1\nbody\n## S2\nbody").unwrap();
        fs::write(dir.path().join("b.md"), "# B\n## S1\nbody").unwrap();

        let out = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(out.path().join("embeddings.json"));
        let builder =
            SnapshotBuilder::new(mock_search_config(&server), dir.path().to_path_buf()).unwrap();
        let stats = builder.build_and_save(&store).await.unwrap();

        assert_eq!(stats.total_docs, 2);
        assert_eq!(stats.total_chunks, 3);
        assert_eq!(store.load().unwrap().chunks.len(), 3);
    }
}

mod searcher_tests {
    use super::*;

    fn snapshot_of(vectors: &[(&str, Vec<f32>)]) -> Snapshot {
        Snapshot {
            chunks: vectors
                .iter()
                .map(|(name, embedding)| Chunk {
                    id: name.to_string(),
                    content: format!("content {}", name),
                    embedding: embedding.clone(),
                    metadata: ChunkMetadata {
                        file: "doc.md".to_string(),
                        section: name.to_string(),
                        headings: vec!["Doc".to_string()],
                    },
                })
                .collect(),
            model: "text-embedding-004".to_string(),
            generated_at: "2026-08-07T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_initialize_fails_without_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("absent.json"));
        let config = SearchConfig {
            embedding: EmbeddingConfig {
                api_key: Some("test-key".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        assert!(matches!(
            Searcher::initialize(config, &store),
            Err(SearchError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_query_returns_all_when_corpus_smaller_than_limit() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path_contains(":embedContent");
                then.status(200).json_body(embedding_body(&[1.0, 0.0]));
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("embeddings.json"));
        store
            .save(&snapshot_of(&[
                ("near", vec![1.0, 0.0]),
                ("mid", vec![1.0, 1.0]),
                ("far", vec![-1.0, 0.0]),
            ]))
            .unwrap();

        let searcher = Searcher::initialize(mock_search_config(&server), &store).unwrap();
        let hits = searcher.query("anything", Some(5)).await.unwrap();

        assert_eq!(hits.len(), 3);
        let order: Vec<&str> = hits.iter().map(|h| h.metadata.section.as_str()).collect();
        assert_eq!(order, vec!["near", "mid", "far"]);
    }

    #[tokio::test]
    async fn test_query_uses_snapshot_model_not_config_model() {
        let server = MockServer::start_async().await;
        // Only the snapshot's model endpoint is mocked; a query embedded
        // with the configured model would miss it
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/models/text-embedding-004:embedContent");
                then.status(200).json_body(embedding_body(&[1.0, 0.0]));
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("embeddings.json"));
        store.save(&snapshot_of(&[("only", vec![1.0, 0.0])])).unwrap();

        let mut config = mock_search_config(&server);
        config.embedding.model = "newer-model-from-config".to_string();

        let searcher = Searcher::initialize(config, &store).unwrap();
        let hits = searcher.query("q", None).await.unwrap();

        assert_eq!(hits.len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_query_dimension_mismatch_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path_contains(":embedContent");
                then.status(200).json_body(embedding_body(&[1.0, 0.0, 0.0]));
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("embeddings.json"));
        store.save(&snapshot_of(&[("a", vec![1.0, 0.0])])).unwrap();

        let searcher = Searcher::initialize(mock_search_config(&server), &store).unwrap();
        let err = searcher.query("q", None).await.unwrap_err();

        assert!(matches!(err, SearchError::DimensionMismatch { .. }));
    }

    #[tokio::test]
    async fn test_provider_error_does_not_unload_snapshot() {
        let server = MockServer::start_async().await;
        let failing = server
            .mock_async(|when, then| {
                when.method(POST).path_contains(":embedContent");
                then.status(500)
                    .json_body(serde_json::json!({ "error": { "message": "transient" } }));
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("embeddings.json"));
        store.save(&snapshot_of(&[("a", vec![1.0, 0.0])])).unwrap();

        let searcher = Searcher::initialize(mock_search_config(&server), &store).unwrap();
        assert!(searcher.query("q", None).await.is_err());

        // Snapshot still loaded; a recovered provider serves the next query
        failing.delete_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path_contains(":embedContent");
                then.status(200).json_body(embedding_body(&[1.0, 0.0]));
            })
            .await;

        let hits = searcher.query("q", None).await.unwrap();
        assert_eq!(hits.len(), 1);
    }
}

mod config_tests {
    use super::*;

    #[test]
    fn test_search_config_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.search.default_limit, DEFAULT_LIMIT);
        assert_eq!(config.search.max_chars, 2000);
        assert_eq!(config.embedding.model, "text-embedding-004");
    }

    #[test]
    fn test_config_parses_from_toml() {
        let config: SearchConfig = toml::from_str(
            r#"
            [embedding]
            model = "text-embedding-005"

            [search]
            default_limit = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.embedding.model, "text-embedding-005");
        assert_eq!(config.search.default_limit, 8);
        // Unspecified fields keep their defaults
        assert_eq!(config.search.max_chars, 2000);
    }
}

mod error_tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SearchError::Embedding("boom".to_string());
        assert!(format!("{}", err).contains("boom"));

        let err = SearchError::DimensionMismatch {
            expected: 768,
            actual: 3,
        };
        let display = format!("{}", err);
        assert!(display.contains("768") && display.contains("3"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = SearchError::from(io_err);
        assert!(format!("{}", err).contains("file not found"));
    }
}
