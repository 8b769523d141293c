//! Query-time retrieval: artifact loading, similarity search, and answer
//! formatting.
//!
//! [`SearchContext`] owns the loaded vector database for one session.
//! The artifact is fetched whole and parsed exactly once behind a
//! single-flight cell; concurrent queries share the same load instead of
//! issuing redundant ones.

use anyhow::Result;
use std::path::PathBuf;
use tokio::sync::OnceCell;

use semdex_core::answer::format_answer;
use semdex_core::models::VectorDatabase;
use semdex_core::search::{rank_chunks, SearchResult};

use crate::artifact;
use crate::config::Config;
use crate::embedder::Embedder;

pub struct SearchContext {
    path: PathBuf,
    db: OnceCell<VectorDatabase>,
}

impl SearchContext {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            db: OnceCell::new(),
        }
    }

    /// The loaded database; first caller reads and parses the artifact,
    /// concurrent callers await that same load.
    pub async fn database(&self) -> Result<&VectorDatabase> {
        self.db
            .get_or_try_init(|| async { artifact::load_required(&self.path) })
            .await
    }

    /// Exact cosine-similarity search against the loaded database.
    pub async fn search(&self, query_vec: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        let db = self.database().await?;
        rank_chunks(query_vec, db, top_k)
    }
}

/// Run the `query` command: embed the question, rank, format, print.
pub async fn run_query(
    config: &Config,
    query: &str,
    top_k: Option<usize>,
    json: bool,
) -> Result<()> {
    let top_k = top_k.unwrap_or(config.retrieval.top_k);

    let embedder = Embedder::new(config.embedding.clone());
    let query_vec = embedder.embed(query).await?;

    let context = SearchContext::new(config.artifact.path.clone());
    let results = context.search(&query_vec, top_k).await?;
    let answer = format_answer(query, &results);

    if json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
    } else {
        println!("{}", answer.answer);
        if !answer.sources.is_empty() {
            println!("Sources:");
            for source in &answer.sources {
                println!("  - {} ({})", source.title, source.url);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use semdex_core::models::{ChunkMetadata, DocumentChunk, DB_VERSION};
    use tempfile::TempDir;

    fn sample_db() -> VectorDatabase {
        VectorDatabase {
            version: DB_VERSION.to_string(),
            model: "test".to_string(),
            dimension: 2,
            chunks: vec![DocumentChunk {
                id: "0123456789abcdef".to_string(),
                text: "alpha".to_string(),
                embedding: vec![1.0, 0.0],
                metadata: ChunkMetadata {
                    source_file: "a.md".to_string(),
                    title: "A".to_string(),
                    heading: None,
                    heading_id: None,
                    url: "https://example.com/a".to_string(),
                    start_line: None,
                    end_line: None,
                    content_hash: None,
                },
            }],
        }
    }

    #[tokio::test]
    async fn test_single_flight_database_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("vector-db.json");
        artifact::save(&path, &sample_db()).unwrap();

        let context = SearchContext::new(path);
        let (first, second) = tokio::join!(context.database(), context.database());
        let first = first.unwrap();
        let second = second.unwrap();
        // Both callers observe the very same loaded instance.
        assert!(std::ptr::eq(first, second));
    }

    #[tokio::test]
    async fn test_search_missing_artifact_is_error() {
        let tmp = TempDir::new().unwrap();
        let context = SearchContext::new(tmp.path().join("absent.json"));
        assert!(context.search(&[1.0, 0.0], 3).await.is_err());
    }

    #[tokio::test]
    async fn test_search_returns_ranked_results() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("vector-db.json");
        artifact::save(&path, &sample_db()).unwrap();

        let context = SearchContext::new(path);
        let results = context.search(&[1.0, 0.0], 3).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }
}
