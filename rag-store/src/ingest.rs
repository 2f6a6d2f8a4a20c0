//! End-to-end ingestion: load source → strip markup → split → embed → `insertOne`.
//!
//! Sources are processed one after another; chunks of a source are embedded
//! and inserted with bounded concurrency. A failing source or chunk is logged
//! and counted, the run continues with the next one.

use futures::{StreamExt, stream};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::astra_facade::AstraFacade;
use crate::embed::EmbeddingsProvider;
use crate::errors::RagError;
use crate::loader::{Source, TagStripper, load_text};
use crate::record::ChunkRecord;
use crate::splitter::RecursiveCharacterSplitter;

/// Knobs for one ingestion run.
#[derive(Clone, Debug)]
pub struct IngestOptions {
    /// Chunks embedded and inserted in parallel.
    pub concurrency: usize,
    /// Draw a terminal progress bar.
    pub show_progress: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            show_progress: true,
        }
    }
}

/// Outcome of an ingestion run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub sources_loaded: usize,
    pub sources_failed: usize,
    pub chunks: usize,
    pub inserted: usize,
    pub chunks_failed: usize,
}

fn progress_bar(len: u64, visible: bool) -> Result<ProgressBar, RagError> {
    if !visible {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}",
    )
    .map_err(|e| RagError::Config(format!("progress template: {e}")))?
    .progress_chars("##-");
    pb.set_style(style);
    Ok(pb)
}

/// Ingests every source into the facade's collection.
///
/// # Errors
/// Only setup failures (progress bar template) are returned; per-source and
/// per-chunk failures are reported in [`IngestReport`].
pub async fn ingest_sources(
    facade: &AstraFacade,
    provider: &dyn EmbeddingsProvider,
    splitter: &RecursiveCharacterSplitter,
    http: &reqwest::Client,
    sources: &[Source],
    opts: &IngestOptions,
) -> Result<IngestReport, RagError> {
    let stripper = TagStripper::new()?;
    let mut report = IngestReport::default();
    let pb = progress_bar(0, opts.show_progress)?;

    for source in sources {
        let text = match load_text(http, &stripper, source).await {
            Ok(t) => t,
            Err(err) => {
                warn!(%source, error = %err, "skipping source");
                report.sources_failed += 1;
                continue;
            }
        };
        report.sources_loaded += 1;

        let chunks = splitter.split_text(&text);
        debug!(%source, chunks = chunks.len(), "source split");
        report.chunks += chunks.len();
        pb.inc_length(chunks.len() as u64);
        pb.set_message(source.to_string());

        let results: Vec<Result<Option<String>, RagError>> = stream::iter(chunks)
            .map(|chunk| async move {
                let vector = provider.embed(&chunk).await?;
                facade.insert_one(&ChunkRecord { vector, text: chunk }).await
            })
            .buffer_unordered(opts.concurrency.max(1))
            .inspect(|_| pb.inc(1))
            .collect()
            .await;

        for r in results {
            match r {
                Ok(_) => report.inserted += 1,
                Err(err) => {
                    warn!(%source, error = %err, "chunk not stored");
                    report.chunks_failed += 1;
                }
            }
        }
    }

    pb.finish_with_message("ingestion complete");
    info!(
        sources_loaded = report.sources_loaded,
        sources_failed = report.sources_failed,
        chunks = report.chunks,
        inserted = report.inserted,
        chunks_failed = report.chunks_failed,
        collection = %facade.collection,
        "ingestion finished"
    );
    Ok(report)
}
