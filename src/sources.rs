//! Filesystem document loader.
//!
//! Scans the configured docs directory for markdown files and turns each
//! into a [`Document`] with a display title and the URL of its rendered
//! page. Files are visited in sorted path order so builds are
//! deterministic regardless of directory iteration order.

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use semdex_core::models::Document;

use crate::config::Config;

pub fn load_documents(config: &Config) -> Result<Vec<Document>> {
    let include = build_globset(&config.site.include_globs)?;
    let exclude = build_globset(&config.site.exclude_globs)?;

    let root = &config.site.docs_dir;
    let mut paths: Vec<std::path::PathBuf> = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.with_context(|| format!("Failed to scan {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_path_buf();
        if include.is_match(&rel) && !exclude.is_match(&rel) {
            paths.push(rel);
        }
    }

    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for rel in paths {
        let full = root.join(&rel);
        let text = std::fs::read_to_string(&full)
            .with_context(|| format!("Failed to read document: {}", full.display()))?;
        let rel_str = rel.to_string_lossy().replace('\\', "/");
        documents.push(Document {
            title: derive_title(&text, &rel_str),
            url: page_url(&config.site.base_url, &rel_str),
            path: rel_str,
            text,
        });
    }

    Ok(documents)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("Invalid glob: {pattern}"))?);
    }
    Ok(builder.build()?)
}

/// Display title: the first level-1 heading, else the file stem.
fn derive_title(text: &str, rel_path: &str) -> String {
    for line in text.lines() {
        if let Some(heading) = line.strip_prefix("# ") {
            let heading = heading.trim();
            if !heading.is_empty() {
                return heading.to_string();
            }
        }
    }
    rel_path
        .rsplit('/')
        .next()
        .unwrap_or(rel_path)
        .trim_end_matches(".md")
        .to_string()
}

/// URL of the rendered page: base url joined with the relative path,
/// `.md` suffix dropped.
fn page_url(base_url: &str, rel_path: &str) -> String {
    let page = rel_path.trim_end_matches(".md");
    format!("{}/{}", base_url.trim_end_matches('/'), page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ArtifactConfig, SiteConfig};
    use std::fs;
    use tempfile::TempDir;

    fn config_for(root: &std::path::Path) -> Config {
        Config {
            site: SiteConfig {
                docs_dir: root.to_path_buf(),
                base_url: "https://example.com/docs".to_string(),
                include_globs: vec!["**/*.md".to_string()],
                exclude_globs: vec!["drafts/**".to_string()],
            },
            artifact: ArtifactConfig {
                path: root.join("vector-db.json"),
            },
            chunking: Default::default(),
            embedding: Default::default(),
            retrieval: Default::default(),
        }
    }

    #[test]
    fn test_loads_sorted_markdown_files() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("guide")).unwrap();
        fs::write(tmp.path().join("zeta.md"), "# Zeta\nbody").unwrap();
        fs::write(tmp.path().join("guide/alpha.md"), "# Alpha\nbody").unwrap();
        fs::write(tmp.path().join("notes.txt"), "not markdown").unwrap();

        let docs = load_documents(&config_for(tmp.path())).unwrap();
        let paths: Vec<&str> = docs.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["guide/alpha.md", "zeta.md"]);
        assert_eq!(docs[0].title, "Alpha");
        assert_eq!(docs[0].url, "https://example.com/docs/guide/alpha");
    }

    #[test]
    fn test_exclude_globs_apply() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("drafts")).unwrap();
        fs::write(tmp.path().join("published.md"), "# Published").unwrap();
        fs::write(tmp.path().join("drafts/wip.md"), "# WIP").unwrap();

        let docs = load_documents(&config_for(tmp.path())).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].path, "published.md");
    }

    #[test]
    fn test_title_falls_back_to_file_stem() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("changelog.md"), "no heading here").unwrap();

        let docs = load_documents(&config_for(tmp.path())).unwrap();
        assert_eq!(docs[0].title, "changelog");
    }

    #[test]
    fn test_empty_corpus_is_ok() {
        let tmp = TempDir::new().unwrap();
        let docs = load_documents(&config_for(tmp.path())).unwrap();
        assert!(docs.is_empty());
    }
}
