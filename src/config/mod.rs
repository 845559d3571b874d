//! Run configuration.
//!
//! Provides the collection identity table and the on-disk layout of the
//! published report site. Both are plain immutable values handed to the
//! aggregator at construction, so tests can run against synthetic identities
//! and throwaway directories.

use crate::error::{CompareError, ReportErrorKind, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global attribute that carries a granule's creation timestamp.
///
/// Two granules whose only divergence is this attribute's value are treated
/// as equal: independently produced runs legitimately stamp different
/// creation times.
pub const DEFAULT_CREATION_ATTRIBUTE: &str = "date_created";

/// Immutable lookup table from collection short name to display identity.
///
/// The short name is what the upstream catalog calls a collection
/// (`MODIS_A-JPL-L2P-v2019.0`); the identity is the slug used in artifact
/// and store filenames (`aqua`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityTable {
    entries: IndexMap<String, String>,
}

impl IdentityTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Add a short-name -> identity mapping.
    #[must_use]
    pub fn with(mut self, short_name: impl Into<String>, identity: impl Into<String>) -> Self {
        self.entries.insert(short_name.into(), identity.into());
        self
    }

    /// Resolve a collection short name to its identity slug.
    pub fn identity_of(&self, short_name: &str) -> Result<&str> {
        self.entries
            .get(short_name)
            .map(String::as_str)
            .ok_or_else(|| {
                CompareError::report(
                    "resolving collection identity",
                    ReportErrorKind::UnknownCollection(short_name.to_string()),
                )
            })
    }

    /// Number of known collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for IdentityTable {
    /// The L2P sea surface temperature catalog this tool was built around.
    fn default() -> Self {
        Self::new()
            .with("MODIS_A-JPL-L2P-v2019.0", "aqua")
            .with("MODIS_T-JPL-L2P-v2019.0", "terra")
            .with("VIIRS_NPP-JPL-L2P-v2016.2", "viirs")
    }
}

/// On-disk layout of the published report site.
///
/// ```text
/// <root>/
///   index-<identity>.html      current overview (one per collection)
///   timeline-<identity>.html   timeline view, regenerated every run
///   archive/                   immutable snapshots of past overviews
///   detail-reports/            plain-text detail reports
///   json/                      persisted timeline stores and locks
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteLayout {
    root: PathBuf,
}

impl SiteLayout {
    /// Create a layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The site root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of archived overview snapshots.
    #[must_use]
    pub fn archive_dir(&self) -> PathBuf {
        self.root.join("archive")
    }

    /// Directory of plain-text detail reports.
    #[must_use]
    pub fn detail_dir(&self) -> PathBuf {
        self.root.join("detail-reports")
    }

    /// Directory of persisted timeline stores.
    #[must_use]
    pub fn json_dir(&self) -> PathBuf {
        self.root.join("json")
    }

    /// Path of the current overview for a collection.
    #[must_use]
    pub fn overview_path(&self, identity: &str) -> PathBuf {
        self.root.join(format!("index-{identity}.html"))
    }

    /// Path of the timeline view for a collection.
    #[must_use]
    pub fn timeline_path(&self, identity: &str) -> PathBuf {
        self.root.join(format!("timeline-{identity}.html"))
    }

    /// Create every directory the layout needs.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [
            self.root.clone(),
            self.archive_dir(),
            self.detail_dir(),
            self.json_dir(),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| CompareError::io(dir.clone(), e))?;
        }
        Ok(())
    }
}
