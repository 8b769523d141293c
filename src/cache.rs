//! Build-time cache index over a previously persisted vector database.
//!
//! Groups a prior artifact's chunks by source file so the builder can
//! answer "is this document unchanged" with one lookup. The per-document
//! content hash is lifted out of chunk metadata once, at index-build
//! time, into a document-level field; staleness checks never re-read it
//! from individual chunks. Invalidation is whole-document: a changed hash
//! discards all of that document's cached chunks.

use std::collections::HashMap;

use semdex_core::models::{DocumentChunk, VectorDatabase};

/// Cached chunks and content hash for one previously indexed document.
pub struct CachedDocument {
    pub content_hash: Option<String>,
    pub chunks: Vec<DocumentChunk>,
}

/// Index of a prior artifact keyed by source file.
pub struct CacheIndex {
    entries: HashMap<String, CachedDocument>,
}

impl CacheIndex {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Group a database's chunks by source file, preserving chunk order
    /// within each document.
    pub fn from_database(db: &VectorDatabase) -> Self {
        let mut entries: HashMap<String, CachedDocument> = HashMap::new();
        for chunk in &db.chunks {
            let entry = entries
                .entry(chunk.metadata.source_file.clone())
                .or_insert_with(|| CachedDocument {
                    content_hash: None,
                    chunks: Vec::new(),
                });
            if entry.content_hash.is_none() {
                entry.content_hash = chunk.metadata.content_hash.clone();
            }
            entry.chunks.push(chunk.clone());
        }
        Self { entries }
    }

    pub fn lookup(&self, source_file: &str) -> Option<&CachedDocument> {
        self.entries.get(source_file)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when a cache entry exists for `source_file` and carries `hash`.
    ///
    /// A document that was never indexed has no entry and is always
    /// treated as changed, whatever its hash.
    pub fn is_unchanged(&self, source_file: &str, hash: &str) -> bool {
        self.lookup(source_file)
            .is_some_and(|entry| entry.content_hash.as_deref() == Some(hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semdex_core::models::{ChunkMetadata, DB_VERSION};

    fn chunk(source_file: &str, id: &str, hash: Option<&str>) -> DocumentChunk {
        DocumentChunk {
            id: id.to_string(),
            text: "text".to_string(),
            embedding: vec![0.0; 4],
            metadata: ChunkMetadata {
                source_file: source_file.to_string(),
                title: "T".to_string(),
                heading: None,
                heading_id: None,
                url: "https://example.com".to_string(),
                start_line: None,
                end_line: None,
                content_hash: hash.map(str::to_string),
            },
        }
    }

    fn db(chunks: Vec<DocumentChunk>) -> VectorDatabase {
        VectorDatabase {
            version: DB_VERSION.to_string(),
            model: "test".to_string(),
            dimension: 4,
            chunks,
        }
    }

    #[test]
    fn test_groups_by_source_file_in_order() {
        let index = CacheIndex::from_database(&db(vec![
            chunk("a.md", "a0", Some("h-a")),
            chunk("b.md", "b0", Some("h-b")),
            chunk("a.md", "a1", Some("h-a")),
        ]));
        assert_eq!(index.len(), 2);
        let a = index.lookup("a.md").unwrap();
        assert_eq!(a.content_hash.as_deref(), Some("h-a"));
        let ids: Vec<&str> = a.chunks.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a0", "a1"]);
    }

    #[test]
    fn test_is_unchanged_matches_hash() {
        let index = CacheIndex::from_database(&db(vec![chunk("a.md", "a0", Some("h-a"))]));
        assert!(index.is_unchanged("a.md", "h-a"));
        assert!(!index.is_unchanged("a.md", "h-other"));
    }

    #[test]
    fn test_unindexed_document_is_changed() {
        let index = CacheIndex::from_database(&db(vec![chunk("a.md", "a0", Some("h-a"))]));
        assert!(!index.is_unchanged("new.md", "h-a"));
        assert!(!CacheIndex::empty().is_unchanged("a.md", "h-a"));
    }

    #[test]
    fn test_missing_hash_never_matches() {
        // Chunks from artifacts that predate content hashing.
        let index = CacheIndex::from_database(&db(vec![chunk("a.md", "a0", None)]));
        assert!(!index.is_unchanged("a.md", "anything"));
    }
}
