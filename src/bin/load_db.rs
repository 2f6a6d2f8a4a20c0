//! Loads biography pages and files into the Astra DB collection.
//!
//! ```bash
//! cargo run --bin load_db -- https://example.com/about data/resume.md
//! ```

use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use anyhow::{Context, bail};
use clap::Parser;
use rag_store::{
    DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, GeminiEmbedder, IngestOptions, RagStore,
    RecursiveCharacterSplitter, SimilarityMetric, Source, VectorSpace,
};
use tracing::{Level, info};

#[derive(Debug, Parser)]
#[command(name = "load_db", about = "Embed web pages or files into the portfolio vector store")]
struct Args {
    /// URLs (http/https) or local file paths.
    #[arg(required = true)]
    sources: Vec<String>,

    /// Vector dimension of a newly created collection (default: EMBEDDING_DIM or 768).
    #[arg(long)]
    dimension: Option<usize>,

    /// Similarity metric of a newly created collection.
    #[arg(long, default_value = "dot_product")]
    metric: SimilarityMetric,

    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    #[arg(long, default_value_t = DEFAULT_CHUNK_OVERLAP)]
    chunk_overlap: usize,

    /// Chunks embedded and inserted in parallel.
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Disable the progress bar.
    #[arg(long)]
    no_progress: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    ai_llm_service::telemetry::init("info", Level::INFO);

    let args = Args::parse();

    let profiles = Arc::new(LlmServiceProfiles::from_env().context("Gemini configuration")?);
    let store = RagStore::from_env().context("Astra DB configuration")?;

    let space = VectorSpace {
        dimension: args.dimension.unwrap_or(store.config().embedding_dim),
        metric: args.metric,
    };
    let created = store
        .ensure_collection(&space)
        .await
        .context("ensure collection")?;
    info!(
        collection = %store.config().collection,
        created,
        dimension = space.dimension,
        metric = %space.metric,
        "collection ready"
    );

    let splitter = RecursiveCharacterSplitter::new(args.chunk_size, args.chunk_overlap)?;
    let embedder = GeminiEmbedder::new(profiles, space.dimension);
    let sources: Vec<Source> = args.sources.iter().map(|s| Source::parse(s)).collect();
    let opts = IngestOptions {
        concurrency: args.concurrency,
        show_progress: !args.no_progress,
    };

    let report = store
        .ingest_sources(&embedder, &splitter, &sources, &opts)
        .await?;

    if report.inserted == 0 {
        bail!(
            "nothing was stored ({} of {} sources failed, {} chunks failed)",
            report.sources_failed,
            sources.len(),
            report.chunks_failed
        );
    }
    info!(inserted = report.inserted, chunks = report.chunks, "load_db finished");
    Ok(())
}
