//! Granule snapshot loading.
//!
//! Granules arrive as JSON snapshots produced by an upstream extraction step.
//! A snapshot directory holds one `.json` file per granule; the file stem is
//! the granule name. Loading stands in for the retrieval collaborators
//! (catalog query, download) that live outside this crate.

use crate::error::{CompareError, LoadErrorKind, Result};
use crate::model::Granule;
use indexmap::IndexMap;
use std::path::Path;

/// Load one granule snapshot.
pub fn load_granule(path: &Path) -> Result<Granule> {
    let content =
        std::fs::read_to_string(path).map_err(|e| CompareError::io(path.to_path_buf(), e))?;
    serde_json::from_str(&content).map_err(|e| {
        CompareError::load(
            format!("at {}", path.display()),
            LoadErrorKind::InvalidJson(e.to_string()),
        )
    })
}

/// Load every granule snapshot in a directory, sorted by file name.
///
/// Non-JSON entries are ignored. A missing or non-directory path is an error;
/// an empty directory is not: a run with zero granules still produces a
/// report saying so.
pub fn load_snapshot_dir(dir: &Path) -> Result<IndexMap<String, Granule>> {
    if !dir.is_dir() {
        return Err(CompareError::load(
            "opening snapshot directory",
            LoadErrorKind::NotADirectory(dir.to_path_buf()),
        ));
    }

    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .map_err(|e| CompareError::io(dir.to_path_buf(), e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut granules = IndexMap::new();
    for path in paths {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();
        granules.insert(name, load_granule(&path)?);
    }
    tracing::debug!(dir = %dir.display(), count = granules.len(), "loaded snapshot");
    Ok(granules)
}
