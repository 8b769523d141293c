//! Core data models for the semdex indexing and retrieval pipeline.
//!
//! These types represent the documents, chunks, and the persisted vector
//! database that flow through the build and query paths. The serialized
//! field names use camelCase because the artifact is consumed by the
//! static-site frontend as-is.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Version tag written into every persisted vector database artifact.
///
/// Artifacts carrying a different version are treated as "no prior cache"
/// at build time and rejected at query time.
pub const DB_VERSION: &str = "1.0";

/// A source document handed to the build pipeline.
///
/// Produced by the document loader (or any upstream collaborator that
/// owns markdown processing); immutable for the duration of one build.
#[derive(Debug, Clone)]
pub struct Document {
    /// Identifier: path relative to the corpus root.
    pub path: String,
    /// Full raw text content.
    pub text: String,
    /// Display title used in citations.
    pub title: String,
    /// Target URL of the rendered page.
    pub url: String,
}

/// Provenance metadata attached to every chunk.
///
/// `heading_id` is the URL-anchor slug of `heading` (see
/// [`chunker::heading_slug`](crate::chunker::heading_slug)); it must stay
/// bit-exact with the anchor generator of the site renderer or citation
/// deep-links break.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    pub source_file: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_id: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

/// A bounded span of document text produced by the chunker.
///
/// Ephemeral: consumed immediately by the embedding step.
#[derive(Debug, Clone)]
pub struct TextChunk {
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// An embedded chunk as stored in the vector database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Stable 16-hex-character id, see [`chunk_id`].
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
    pub metadata: ChunkMetadata,
}

/// The persisted vector database artifact.
///
/// Invariant: every chunk's `embedding.len() == dimension`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorDatabase {
    pub version: String,
    pub model: String,
    pub dimension: usize,
    pub chunks: Vec<DocumentChunk>,
}

/// Derive the stable chunk id for `(source_file, index, text)`.
///
/// The id is the first 16 hex characters of the SHA-256 digest over the
/// source path, the chunk's index within its file, and the first 100
/// characters of its text. Identical inputs always produce identical ids,
/// which is what makes incremental merges idempotent.
pub fn chunk_id(source_file: &str, index: usize, text: &str) -> String {
    let prefix: String = text.chars().take(100).collect();
    let mut hasher = Sha256::new();
    hasher.update(source_file.as_bytes());
    hasher.update(b":");
    hasher.update(index.to_string().as_bytes());
    hasher.update(b":");
    hasher.update(prefix.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

/// Compute the content hash of a document's raw text.
///
/// Used by the builder to detect whether a document needs re-chunking
/// and re-embedding.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_id_deterministic() {
        let a = chunk_id("docs/intro.md", 0, "Hello world");
        let b = chunk_id("docs/intro.md", 0, "Hello world");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_chunk_id_varies_with_inputs() {
        let base = chunk_id("docs/intro.md", 0, "Hello world");
        assert_ne!(base, chunk_id("docs/other.md", 0, "Hello world"));
        assert_ne!(base, chunk_id("docs/intro.md", 1, "Hello world"));
        assert_ne!(base, chunk_id("docs/intro.md", 0, "Different text"));
    }

    #[test]
    fn test_chunk_id_only_prefix_matters() {
        let long_a = format!("{}{}", "x".repeat(100), "tail one");
        let long_b = format!("{}{}", "x".repeat(100), "tail two");
        assert_eq!(
            chunk_id("docs/a.md", 3, &long_a),
            chunk_id("docs/a.md", 3, &long_b)
        );
    }

    #[test]
    fn test_content_hash_stable() {
        assert_eq!(content_hash("abc"), content_hash("abc"));
        assert_ne!(content_hash("abc"), content_hash("abd"));
        assert_eq!(content_hash("abc").len(), 64);
    }

    #[test]
    fn test_metadata_serializes_camel_case() {
        let metadata = ChunkMetadata {
            source_file: "docs/guide.md".to_string(),
            title: "Guide".to_string(),
            heading: Some("Setup".to_string()),
            heading_id: Some("setup".to_string()),
            url: "https://example.com/docs/guide".to_string(),
            start_line: Some(1),
            end_line: Some(10),
            content_hash: None,
        };
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["sourceFile"], "docs/guide.md");
        assert_eq!(json["headingId"], "setup");
        assert_eq!(json["startLine"], 1);
        // Absent optional fields are omitted entirely.
        assert!(json.get("contentHash").is_none());
    }

    #[test]
    fn test_metadata_ignores_unknown_fields() {
        let json = r#"{
            "sourceFile": "docs/guide.md",
            "title": "Guide",
            "url": "https://example.com/docs/guide",
            "somethingElse": 42
        }"#;
        let metadata: ChunkMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.source_file, "docs/guide.md");
        assert!(metadata.heading.is_none());
    }
}
