//! Loading and persisting the vector database artifact.
//!
//! The artifact is a single flat JSON file, read whole and overwritten
//! whole. At build time a missing or unparsable artifact means "no prior
//! cache" and triggers a full rebuild; at query time it is a hard error
//! because there is nothing to search.

use anyhow::{bail, Context, Result};
use std::path::Path;

use semdex_core::models::{VectorDatabase, DB_VERSION};

/// Load a prior artifact for an incremental build.
///
/// Never fails: missing, unreadable, unparsable, or wrong-version files
/// all degrade to `None` (with a warning on stderr where something looked
/// broken), and the build falls back to re-embedding everything.
pub fn load(path: &Path) -> Option<VectorDatabase> {
    if !path.exists() {
        return None;
    }

    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!(
                "Warning: could not read {}: {}; rebuilding from scratch",
                path.display(),
                e
            );
            return None;
        }
    };

    match serde_json::from_str::<VectorDatabase>(&raw) {
        Ok(db) if db.version == DB_VERSION => Some(db),
        Ok(db) => {
            eprintln!(
                "Warning: {} has artifact version {}, expected {}; rebuilding from scratch",
                path.display(),
                db.version,
                DB_VERSION
            );
            None
        }
        Err(e) => {
            eprintln!(
                "Warning: could not parse {}: {}; rebuilding from scratch",
                path.display(),
                e
            );
            None
        }
    }
}

/// Load the artifact for querying. Missing or broken files are hard
/// errors here; the dimension invariant is validated on the way in.
pub fn load_required(path: &Path) -> Result<VectorDatabase> {
    let raw = std::fs::read_to_string(path).with_context(|| {
        format!(
            "failed to read vector database at {} (run `semdex build` first)",
            path.display()
        )
    })?;

    let db: VectorDatabase = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse vector database at {}", path.display()))?;

    if db.version != DB_VERSION {
        bail!(
            "vector database at {} has version {}, expected {}",
            path.display(),
            db.version,
            DB_VERSION
        );
    }

    for chunk in &db.chunks {
        if chunk.embedding.len() != db.dimension {
            bail!(
                "chunk {} has a {}-dimensional embedding, expected {}",
                chunk.id,
                chunk.embedding.len(),
                db.dimension
            );
        }
    }

    Ok(db)
}

/// Serialize and write the artifact, overwriting any prior file.
pub fn save(path: &Path, db: &VectorDatabase) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string(db)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write vector database to {}", path.display()))?;
    Ok(())
}
