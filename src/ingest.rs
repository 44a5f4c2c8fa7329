//! Index build pipeline.
//!
//! Coordinates the full rebuild: vault scan → note loading → chunking →
//! embedding → index + metadata. Nothing is written until every chunk has
//! been embedded, so a failed build leaves the previous index untouched.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::chunk::Chunker;
use crate::config::Config;
use crate::embedding::{self, Embedder};
use crate::error::RecallError;
use crate::index::VectorIndex;
use crate::loader::load_document;
use crate::metadata::Corpus;
use crate::models::ChunkRecord;
use crate::vault::scan_vault;

/// Counters reported after a build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub files_found: usize,
    pub documents_indexed: usize,
    pub empty_skipped: usize,
    pub failed: Vec<(PathBuf, String)>,
    pub chunks: usize,
}

/// Build a fresh corpus in memory from the configured vault.
pub async fn build_corpus(
    config: &Config,
    embedder: &dyn Embedder,
) -> Result<(Corpus, BuildReport)> {
    let scan = scan_vault(&config.vault)?;
    let entries = scan.entries;
    let chunker = Chunker::new(&config.chunking)?;

    let mut report = BuildReport {
        files_found: entries.len(),
        failed: scan.failed,
        ..BuildReport::default()
    };
    let mut index: Option<VectorIndex> = None;
    let mut records: Vec<ChunkRecord> = Vec::new();

    for entry in &entries {
        let doc = match load_document(entry) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(path = %entry.relative_path, error = %e, "skipping note");
                report.failed.push((entry.path.clone(), e.to_string()));
                continue;
            }
        };

        let chunks = chunker.chunk_text(&doc.body);
        if chunks.is_empty() {
            tracing::debug!(path = %doc.relative_path, "empty body, skipping");
            report.empty_skipped += 1;
            continue;
        }

        for chunk in chunks {
            let vector = embedder
                .embed(&chunk.text)
                .await
                .with_context(|| format!("embedding chunk {} of {}", chunk.index, doc.relative_path))?;

            let index = index.get_or_insert_with(|| VectorIndex::new(vector.len()));
            index.add(&vector).with_context(|| {
                format!("embedding chunk {} of {}", chunk.index, doc.relative_path)
            })?;
            records.push(ChunkRecord::from_document(&doc, chunk.index, chunk.text));
        }

        tracing::debug!(path = %doc.relative_path, total_chunks = records.len(), "indexed note");
        report.documents_indexed += 1;
    }

    let Some(index) = index else {
        return Err(RecallError::EmptyCorpus.into());
    };
    report.chunks = records.len();

    Ok((Corpus::new(index, records)?, report))
}

/// CLI entry point: rebuild the index and print a summary.
pub async fn run_index(config: &Config) -> Result<()> {
    if !config.embedding.is_enabled() {
        anyhow::bail!("Indexing requires embeddings. Set [embedding] provider in config.");
    }

    let embedder = embedding::create_embedder(&config.embedding)?;
    tracing::info!(
        vault = %config.vault.root.display(),
        model = embedder.model_name(),
        "building index"
    );

    let (corpus, report) = build_corpus(config, embedder.as_ref()).await?;
    corpus
        .save(&config.index)
        .with_context(|| format!("writing index to {}", config.index.path.display()))?;

    println!("index");
    println!("  files found: {}", report.files_found);
    println!("  notes indexed: {}", report.documents_indexed);
    println!("  empty notes skipped: {}", report.empty_skipped);
    println!("  notes failed: {}", report.failed.len());
    for (path, reason) in &report.failed {
        println!("    {}: {}", path.display(), reason);
    }
    println!("  chunks: {}", report.chunks);
    println!("  dimensions: {}", corpus.index().dims());
    println!("  index: {}", config.index.path.display());
    println!("  metadata: {}", config.index.metadata_path.display());
    println!("ok");

    Ok(())
}
