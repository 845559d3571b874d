//! Persisted timeline history.
//!
//! One JSON store per collection identity, keyed by run timestamp. The store
//! is the single source of truth for "was this collection equal at time T"
//! and for which run currently owns the overview page. It is loaded at the
//! start of a run and written back atomically at the end; a full
//! read-modify-write cycle never loses unrelated entries.

use crate::error::{CompareError, Result, StoreErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};

/// Placeholder archive reference meaning "this run owns the current overview".
pub const CURRENT_MARKER: &str = "Current";

/// Where a run's overview page lives now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ArchiveRef {
    /// The run still owns `index-<identity>.html`
    Current,
    /// The run's overview was rotated into `archive/` under this file name
    Archived(String),
}

impl From<String> for ArchiveRef {
    fn from(s: String) -> Self {
        if s == CURRENT_MARKER {
            Self::Current
        } else {
            Self::Archived(s)
        }
    }
}

impl From<ArchiveRef> for String {
    fn from(r: ArchiveRef) -> Self {
        match r {
            ArchiveRef::Current => CURRENT_MARKER.to_string(),
            ArchiveRef::Archived(name) => name,
        }
    }
}

/// One persisted run record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Number of granules on the reference side
    pub reference_count: usize,
    /// Number of granules on the candidate side
    pub candidate_count: usize,
    /// Run-level verdict
    pub equal: bool,
    /// Where this run's overview lives
    pub archive: ArchiveRef,
}

/// The timeline store for one collection identity.
///
/// Timestamps use the fixed `%Y%m%dT%H%M%S` format, so lexicographic order is
/// chronological order; entries live in a `BTreeMap` keyed by timestamp.
#[derive(Debug)]
pub struct TimelineStore {
    path: PathBuf,
    entries: BTreeMap<String, TimelineEntry>,
}

impl TimelineStore {
    /// Store path for a collection identity inside `json_dir`.
    #[must_use]
    pub fn path_for(json_dir: &Path, identity: &str) -> PathBuf {
        json_dir.join(format!("timeline-{identity}.json"))
    }

    /// Load the store, or start empty when no file exists yet.
    pub fn load(path: PathBuf) -> Result<Self> {
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| CompareError::io(path.clone(), e))?;
            serde_json::from_str(&content).map_err(|e| {
                CompareError::store(
                    format!("reading {}", path.display()),
                    StoreErrorKind::Corrupt(e.to_string()),
                )
            })?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    /// Insert or overwrite the entry for a run timestamp.
    pub fn upsert(&mut self, timestamp: String, entry: TimelineEntry) {
        self.entries.insert(timestamp, entry);
    }

    /// The entry currently owning the overview page, if any.
    #[must_use]
    pub fn current(&self) -> Option<(&str, &TimelineEntry)> {
        self.entries
            .iter()
            .find(|(_, e)| e.archive == ArchiveRef::Current)
            .map(|(ts, e)| (ts.as_str(), e))
    }

    /// Repoint every `Current` placeholder at the given archive file name.
    ///
    /// Called during rotation, after the old overview has moved into the
    /// archive directory and before the new run claims `Current`.
    pub fn rewrite_current(&mut self, archive_name: &str) {
        for entry in self.entries.values_mut() {
            if entry.archive == ArchiveRef::Current {
                entry.archive = ArchiveRef::Archived(archive_name.to_string());
            }
        }
    }

    /// Repoint any remaining `Current` entry at its own timestamp-derived
    /// archive name.
    ///
    /// Covers an overview page that vanished outside a run: rotation found
    /// nothing to move, but the store still has an entry claiming the
    /// overview. At most one entry may be `Current` once the in-flight run
    /// claims it.
    pub fn retire_stale_current(&mut self, identity: &str) {
        for (timestamp, entry) in &mut self.entries {
            if entry.archive == ArchiveRef::Current {
                tracing::warn!(timestamp = %timestamp, "retiring stale current entry");
                entry.archive = ArchiveRef::Archived(format!("{timestamp}-{identity}.html"));
            }
        }
    }

    /// Entries ordered newest first.
    #[must_use]
    pub fn entries_newest_first(&self) -> Vec<(&str, &TimelineEntry)> {
        self.entries
            .iter()
            .rev()
            .map(|(ts, e)| (ts.as_str(), e))
            .collect()
    }

    /// Number of persisted runs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no runs are persisted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the store back atomically: serialize into a temporary file in
    /// the same directory, then rename over the old store. A failed run can
    /// never leave a half-written history behind.
    pub fn save(&self) -> Result<()> {
        let parent = self.path.parent().ok_or_else(|| {
            CompareError::store(
                format!("saving {}", self.path.display()),
                StoreErrorKind::Replace("store path has no parent directory".to_string()),
            )
        })?;
        let json = serde_json::to_string_pretty(&self.entries).map_err(|e| {
            CompareError::store(
                format!("saving {}", self.path.display()),
                StoreErrorKind::Corrupt(e.to_string()),
            )
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)
            .map_err(|e| CompareError::io(parent.to_path_buf(), e))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| CompareError::io(self.path.clone(), e))?;
        tmp.persist(&self.path).map_err(|e| {
            CompareError::store(
                format!("saving {}", self.path.display()),
                StoreErrorKind::Replace(e.to_string()),
            )
        })?;
        tracing::debug!(path = %self.path.display(), runs = self.entries.len(), "timeline store saved");
        Ok(())
    }
}

/// Exclusive per-identity lock around the store's read-modify-write cycle.
///
/// At most one run per collection identity may be in flight; a second run
/// fails fast here instead of interleaving with the first and corrupting
/// history. The lock file is removed when the guard drops.
#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
}

impl StoreLock {
    /// Acquire the lock for a collection identity inside `json_dir`.
    pub fn acquire(json_dir: &Path, identity: &str) -> Result<Self> {
        let path = json_dir.join(format!("timeline-{identity}.lock"));
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(_) => Ok(Self { path }),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Err(CompareError::store(
                format!("locking timeline for {identity}"),
                StoreErrorKind::Locked(path),
            )),
            Err(e) => Err(CompareError::io(path, e)),
        }
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release store lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(equal: bool, archive: ArchiveRef) -> TimelineEntry {
        TimelineEntry {
            reference_count: 3,
            candidate_count: 3,
            equal,
            archive,
        }
    }

    #[test]
    fn test_round_trip_preserves_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = TimelineStore::path_for(dir.path(), "test");

        let mut store = TimelineStore::load(path.clone()).unwrap();
        store.upsert(
            "20260806T000000".to_string(),
            entry(true, ArchiveRef::Archived("20260806T000000-test.html".to_string())),
        );
        store.upsert("20260806T010000".to_string(), entry(false, ArchiveRef::Current));
        store.save().unwrap();

        let reloaded = TimelineStore::load(path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.current().unwrap().0, "20260806T010000");
        assert!(!reloaded.current().unwrap().1.equal);
    }

    #[test]
    fn test_archive_ref_serializes_as_plain_string() {
        let json = serde_json::to_string(&entry(true, ArchiveRef::Current)).unwrap();
        assert!(json.contains(r#""archive":"Current""#));

        let json =
            serde_json::to_string(&entry(true, ArchiveRef::Archived("x.html".to_string())))
                .unwrap();
        assert!(json.contains(r#""archive":"x.html""#));
    }

    #[test]
    fn test_upsert_overwrites_same_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TimelineStore::load(TimelineStore::path_for(dir.path(), "test")).unwrap();
        store.upsert("20260806T000000".to_string(), entry(true, ArchiveRef::Current));
        store.upsert("20260806T000000".to_string(), entry(false, ArchiveRef::Current));
        assert_eq!(store.len(), 1);
        assert!(!store.current().unwrap().1.equal);
    }

    #[test]
    fn test_rewrite_current() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TimelineStore::load(TimelineStore::path_for(dir.path(), "test")).unwrap();
        store.upsert("20260806T000000".to_string(), entry(true, ArchiveRef::Current));
        store.rewrite_current("20260806T000000-test.html");
        assert!(store.current().is_none());
        let (_, e) = store.entries_newest_first()[0];
        assert_eq!(
            e.archive,
            ArchiveRef::Archived("20260806T000000-test.html".to_string())
        );
    }

    #[test]
    fn test_retire_stale_current() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TimelineStore::load(TimelineStore::path_for(dir.path(), "test")).unwrap();
        store.upsert("20260806T000000".to_string(), entry(true, ArchiveRef::Current));
        store.retire_stale_current("test");
        assert!(store.current().is_none());
        let (_, e) = store.entries_newest_first()[0];
        assert_eq!(
            e.archive,
            ArchiveRef::Archived("20260806T000000-test.html".to_string())
        );
    }

    #[test]
    fn test_entries_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TimelineStore::load(TimelineStore::path_for(dir.path(), "test")).unwrap();
        store.upsert("20260805T000000".to_string(), entry(true, ArchiveRef::Current));
        store.upsert("20260806T000000".to_string(), entry(true, ArchiveRef::Current));
        store.upsert("20260804T000000".to_string(), entry(true, ArchiveRef::Current));

        let order: Vec<&str> = store.entries_newest_first().iter().map(|(ts, _)| *ts).collect();
        assert_eq!(
            order,
            vec!["20260806T000000", "20260805T000000", "20260804T000000"]
        );
    }

    #[test]
    fn test_corrupt_store_is_a_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = TimelineStore::path_for(dir.path(), "test");
        std::fs::write(&path, "{ not json").unwrap();

        let err = TimelineStore::load(path).unwrap_err();
        assert!(err.to_string().contains("Timeline persistence failed"));
    }

    #[test]
    fn test_lock_conflict_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let _held = StoreLock::acquire(dir.path(), "test").unwrap();
        let err = StoreLock::acquire(dir.path(), "test").unwrap_err();
        assert!(err.to_string().contains("Timeline persistence failed"));
    }

    #[test]
    fn test_lock_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        {
            let _held = StoreLock::acquire(dir.path(), "test").unwrap();
        }
        assert!(StoreLock::acquire(dir.path(), "test").is_ok());
    }

    #[test]
    fn test_stores_for_other_identities_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut aqua = TimelineStore::load(TimelineStore::path_for(dir.path(), "aqua")).unwrap();
        aqua.upsert("20260806T000000".to_string(), entry(true, ArchiveRef::Current));
        aqua.save().unwrap();

        let mut terra = TimelineStore::load(TimelineStore::path_for(dir.path(), "terra")).unwrap();
        terra.upsert("20260806T000000".to_string(), entry(false, ArchiveRef::Current));
        terra.save().unwrap();

        let aqua = TimelineStore::load(TimelineStore::path_for(dir.path(), "aqua")).unwrap();
        assert_eq!(aqua.len(), 1);
        assert!(aqua.current().unwrap().1.equal);
    }
}
