//! Incremental vector database builder.
//!
//! Orchestrates the build flow: load prior artifact → classify each
//! document as unchanged or changed by content hash → reuse cached
//! chunks for unchanged documents → re-chunk and batch-embed changed
//! ones → merge and persist. Embedding is the expensive step this whole
//! mechanism exists to avoid repeating: a no-change rebuild performs
//! zero embedding calls and reproduces the prior chunk set exactly.

use anyhow::{anyhow, Result};

use semdex_core::chunker::chunk_document;
use semdex_core::models::{
    chunk_id, content_hash, Document, DocumentChunk, TextChunk, VectorDatabase, DB_VERSION,
};

use crate::artifact;
use crate::cache::CacheIndex;
use crate::config::Config;
use crate::embedder::Embedder;
use crate::progress::{ProgressEvent, ProgressMode, ProgressReporter};
use crate::sources;

pub struct BuildOptions {
    pub max_chunk_size: usize,
    pub chunk_overlap: usize,
    pub batch_size: usize,
}

impl BuildOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_chunk_size: config.chunking.max_chunk_size,
            chunk_overlap: config.chunking.chunk_overlap,
            batch_size: config.embedding.batch_size,
        }
    }
}

/// Outcome of one build: the database plus cache statistics.
pub struct BuildReport {
    pub database: VectorDatabase,
    pub unchanged_documents: usize,
    pub changed_documents: usize,
    pub embedded_chunks: usize,
}

/// Build a vector database from `documents`, reusing `existing` where
/// content hashes match.
///
/// The final chunk order is reused documents first, then changed
/// documents, each group in original document order; nothing is
/// re-sorted globally.
pub async fn build(
    documents: &[Document],
    existing: Option<&VectorDatabase>,
    embedder: &Embedder,
    options: &BuildOptions,
    reporter: &dyn ProgressReporter,
) -> Result<BuildReport> {
    let cache = existing
        .map(CacheIndex::from_database)
        .unwrap_or_else(CacheIndex::empty);

    struct ChangedDocument<'a> {
        document: &'a Document,
        hash: String,
        chunks: Vec<TextChunk>,
    }

    let mut reused: Vec<DocumentChunk> = Vec::new();
    let mut unchanged_documents = 0usize;
    let mut changed: Vec<ChangedDocument> = Vec::new();

    for document in documents {
        let hash = content_hash(&document.text);
        match cache.lookup(&document.path) {
            Some(entry) if entry.content_hash.as_deref() == Some(hash.as_str()) => {
                reused.extend(entry.chunks.iter().cloned());
                unchanged_documents += 1;
            }
            _ => {
                let chunks = chunk_document(document, options.max_chunk_size, options.chunk_overlap);
                changed.push(ChangedDocument {
                    document,
                    hash,
                    chunks,
                });
            }
        }
    }

    reporter.report(ProgressEvent::Classified {
        unchanged: unchanged_documents as u64,
        changed: changed.len() as u64,
    });

    let texts: Vec<String> = changed
        .iter()
        .flat_map(|d| d.chunks.iter().map(|c| c.text.clone()))
        .collect();

    let vectors = if texts.is_empty() {
        Vec::new()
    } else {
        embedder
            .embed_batch(&texts, options.batch_size, reporter)
            .await?
    };

    // A full cache hit carries the prior artifact's model metadata
    // forward without touching the provider.
    let (model, dimension) = match existing {
        Some(db) if texts.is_empty() => (db.model.clone(), db.dimension),
        _ => (embedder.model_name().await?, embedder.dims().await?),
    };

    let mut vector_iter = vectors.into_iter();
    let mut fresh: Vec<DocumentChunk> = Vec::with_capacity(texts.len());
    for doc in &changed {
        for (index, chunk) in doc.chunks.iter().enumerate() {
            let embedding = vector_iter
                .next()
                .ok_or_else(|| anyhow!("embedding batch returned fewer vectors than texts"))?;
            let mut metadata = chunk.metadata.clone();
            metadata.content_hash = Some(doc.hash.clone());
            fresh.push(DocumentChunk {
                id: chunk_id(&doc.document.path, index, &chunk.text),
                text: chunk.text.clone(),
                embedding,
                metadata,
            });
        }
    }

    let embedded_chunks = fresh.len();
    let mut chunks = reused;
    chunks.append(&mut fresh);

    Ok(BuildReport {
        database: VectorDatabase {
            version: DB_VERSION.to_string(),
            model,
            dimension,
            chunks,
        },
        unchanged_documents,
        changed_documents: changed.len(),
        embedded_chunks,
    })
}

/// Run the `build` command: scan, build, persist, print a summary.
pub async fn run_build(config: &Config, full: bool, dry_run: bool, mode: ProgressMode) -> Result<()> {
    let reporter = mode.reporter();
    let documents = sources::load_documents(config)?;
    reporter.report(ProgressEvent::Scanned {
        documents: documents.len() as u64,
    });

    let existing = if full {
        None
    } else {
        load_compatible_artifact(config)
    };

    if dry_run {
        return print_dry_run(config, &documents, existing.as_ref());
    }

    let embedder = Embedder::new(config.embedding.clone());
    let options = BuildOptions::from_config(config);
    let report = build(
        &documents,
        existing.as_ref(),
        &embedder,
        &options,
        reporter.as_ref(),
    )
    .await?;

    artifact::save(&config.artifact.path, &report.database)?;

    println!("build");
    println!("  documents: {}", documents.len());
    println!("  unchanged: {}", report.unchanged_documents);
    println!("  re-indexed: {}", report.changed_documents);
    println!("  chunks embedded: {}", report.embedded_chunks);
    println!("  total chunks: {}", report.database.chunks.len());
    println!("  artifact: {}", config.artifact.path.display());
    println!("ok");
    Ok(())
}

/// Load the prior artifact unless it was produced by a different model
/// than the one now configured; mixing models in one database would
/// break the dimension invariant.
fn load_compatible_artifact(config: &Config) -> Option<VectorDatabase> {
    let existing = artifact::load(&config.artifact.path)?;
    if config.embedding.is_enabled() {
        if let Some(model) = config.embedding.model.as_deref() {
            if model != existing.model {
                eprintln!(
                    "Warning: artifact was built with model '{}', config uses '{}'; rebuilding from scratch",
                    existing.model, model
                );
                return None;
            }
        }
    }
    Some(existing)
}

fn print_dry_run(
    config: &Config,
    documents: &[Document],
    existing: Option<&VectorDatabase>,
) -> Result<()> {
    let cache = existing
        .map(CacheIndex::from_database)
        .unwrap_or_else(CacheIndex::empty);

    let mut unchanged = 0usize;
    let mut changed = 0usize;
    let mut chunks_to_embed = 0usize;
    for document in documents {
        let hash = content_hash(&document.text);
        if cache.is_unchanged(&document.path, &hash) {
            unchanged += 1;
        } else {
            changed += 1;
            chunks_to_embed += chunk_document(
                document,
                config.chunking.max_chunk_size,
                config.chunking.chunk_overlap,
            )
            .len();
        }
    }

    println!("build (dry-run)");
    println!("  documents: {}", documents.len());
    println!("  unchanged: {}", unchanged);
    println!("  changed: {}", changed);
    println!("  chunks to embed: {}", chunks_to_embed);
    Ok(())
}
