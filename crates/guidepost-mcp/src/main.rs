//! Guidepost - semantic search over markdown guideline documents,
//! served as an MCP tool over stdio.

use std::env;
use std::path::PathBuf;

use guidepost_core::{SearchConfig, Searcher, SnapshotBuilder, SnapshotStore};
use guidepost_mcp::server::{run, SearchServer};
use guidepost_mcp::transport::StdioTransport;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_help() {
    eprintln!(
        r#"guidepost-mcp v{VERSION} - semantic search over markdown guideline documents

USAGE:
    guidepost-mcp [OPTIONS] [COMMAND]

COMMANDS:
    serve           Start the MCP server (default)
    build           Build the embeddings snapshot from the content tree
    version         Print version information

OPTIONS:
    -h, --help          Print this help message
    -v, --version       Print version
    --root <PATH>       Content tree to index (build)
    --snapshot <PATH>   Snapshot artifact path (build and serve)

ENVIRONMENT:
    GEMINI_API_KEY          Embedding API key (required; GOOGLE_API_KEY also accepted)
    GEMINI_API_BASE         Embedding API base URL
    GEMINI_EMBED_MODEL      Embedding model for builds
    GUIDEPOST_ROOT          App directory (default: ~/.guidepost)
    GUIDEPOST_CONTENT_ROOT  Content tree (default: <root>/content)
    GUIDEPOST_SNAPSHOT_PATH Snapshot path (default: <root>/embeddings.json)
    RUST_LOG                Log level (default: info)

EXAMPLES:
    # Index a documentation tree
    guidepost-mcp build --root ./docs --snapshot ./embeddings.json

    # Serve the snapshot over stdio
    guidepost-mcp serve --snapshot ./embeddings.json
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();

    let mut command = "serve";
    let mut root: Option<PathBuf> = None;
    let mut snapshot_path: Option<PathBuf> = None;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return Ok(());
            }
            "-v" | "--version" | "version" => {
                println!("guidepost-mcp {}", VERSION);
                return Ok(());
            }
            "--root" => {
                i += 1;
                if i < args.len() {
                    root = Some(PathBuf::from(&args[i]));
                } else {
                    eprintln!("Error: --root requires a path argument");
                    std::process::exit(1);
                }
            }
            "--snapshot" => {
                i += 1;
                if i < args.len() {
                    snapshot_path = Some(PathBuf::from(&args[i]));
                } else {
                    eprintln!("Error: --snapshot requires a path argument");
                    std::process::exit(1);
                }
            }
            "serve" => command = "serve",
            "build" => command = "build",
            arg if arg.starts_with('-') => {
                eprintln!("Unknown option: {}", arg);
                eprintln!("Run 'guidepost-mcp --help' for usage");
                std::process::exit(1);
            }
            _ => {}
        }
        i += 1;
    }

    // Logs go to stderr so they never interfere with the stdio protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = SearchConfig::load()?;
    if let Some(root) = root {
        config.paths.content_root = Some(root);
    }
    if let Some(path) = snapshot_path {
        config.paths.snapshot_path = Some(path);
    }
    let store = SnapshotStore::new(config.paths.get_snapshot_path());

    match command {
        "build" => {
            let content_root = config.paths.get_content_root();
            tracing::info!("building snapshot from {}", content_root.display());

            let builder = match SnapshotBuilder::new(config, content_root) {
                Ok(builder) => builder,
                Err(e) => {
                    eprintln!("Build failed: {}", e);
                    std::process::exit(1);
                }
            };
            match builder.build_and_save(&store).await {
                Ok(stats) => {
                    println!(
                        "Wrote {} chunks from {} documents to {} in {} ms",
                        stats.total_chunks,
                        stats.total_docs,
                        store.path().display(),
                        stats.elapsed_ms
                    );
                    Ok(())
                }
                Err(e) => {
                    eprintln!("Build failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        _ => {
            tracing::info!("starting guidepost-mcp v{}", VERSION);

            let searcher = match Searcher::initialize(config, &store) {
                Ok(searcher) => searcher,
                Err(e) => {
                    eprintln!(
                        "Failed to load snapshot from {}: {}",
                        store.path().display(),
                        e
                    );
                    eprintln!("Run 'guidepost-mcp build' first.");
                    std::process::exit(1);
                }
            };
            tracing::info!(
                "serving {} chunks (model {})",
                searcher.chunk_count(),
                searcher.model()
            );

            let mut server = SearchServer::new(searcher);
            let mut transport = StdioTransport::stdio();
            run(&mut server, &mut transport).await?;
            Ok(())
        }
    }
}
