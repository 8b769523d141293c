//! Artifact statistics and health overview.
//!
//! Provides a quick summary of what's indexed: document and chunk counts,
//! the embedding model, and per-document breakdowns. Used by
//! `semdex stats` to give confidence that builds are working as expected.

use anyhow::Result;
use std::collections::BTreeMap;

use crate::artifact;
use crate::config::Config;

/// Run the stats command: load the artifact and print a summary.
pub fn run_stats(config: &Config) -> Result<()> {
    let db = artifact::load_required(&config.artifact.path)?;

    let file_size = std::fs::metadata(&config.artifact.path)
        .map(|m| m.len())
        .unwrap_or(0);

    // BTreeMap keeps the per-document table in stable path order.
    let mut per_document: BTreeMap<&str, usize> = BTreeMap::new();
    for chunk in &db.chunks {
        *per_document.entry(chunk.metadata.source_file.as_str()).or_insert(0) += 1;
    }

    println!("semdex vector database");
    println!("======================");
    println!();
    println!("  Artifact:   {}", config.artifact.path.display());
    println!("  Size:       {}", format_bytes(file_size));
    println!("  Model:      {}", db.model);
    println!("  Dimension:  {}", db.dimension);
    println!();
    println!("  Documents:  {}", per_document.len());
    println!("  Chunks:     {}", db.chunks.len());

    if !per_document.is_empty() {
        println!();
        println!("  By document:");
        println!("  {:<48} {:>8}", "SOURCE", "CHUNKS");
        println!("  {}", "-".repeat(58));
        for (source, count) in &per_document {
            println!("  {:<48} {:>8}", source, count);
        }
    }

    println!();
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
