//! Report/timeline aggregation.
//!
//! The [`Aggregator`] turns one run's diff records into durable artifacts:
//! the plain-text detail report, the HTML overview, the updated timeline
//! store, and the regenerated timeline view, rotating the previous overview
//! into the archive along the way. All file I/O for a run happens here,
//! sequentially, under the per-identity store lock; the run's result is
//! durable only when `publish` returns `Ok`.

use crate::config::{IdentityTable, SiteLayout, DEFAULT_CREATION_ATTRIBUTE};
use crate::error::{CompareError, Result};
use crate::pipeline::RunReport;
use crate::reports::{ensure_stylesheet, DetailReporter, OverviewReporter, TimelineReporter};
use crate::timeline::{rotate_current, ArchiveRef, StoreLock, TimelineEntry, TimelineStore};
use std::path::PathBuf;

/// Artifacts produced by publishing one run.
#[derive(Debug, Clone)]
pub struct PublishedRun {
    /// The plain-text detail report
    pub detail_report: PathBuf,
    /// The current overview page
    pub overview: PathBuf,
    /// The regenerated timeline page
    pub timeline: PathBuf,
    /// Archive file name the previous overview rotated into, if any
    pub archived: Option<String>,
    /// Run-level verdict
    pub equal: bool,
}

/// Publishes comparison runs into a report site.
#[derive(Debug, Clone)]
pub struct Aggregator {
    identities: IdentityTable,
    layout: SiteLayout,
    creation_attribute: String,
}

impl Aggregator {
    /// Create an aggregator over an identity table and a site layout.
    #[must_use]
    pub fn new(identities: IdentityTable, layout: SiteLayout) -> Self {
        Self {
            identities,
            layout,
            creation_attribute: DEFAULT_CREATION_ATTRIBUTE.to_string(),
        }
    }

    /// Override the creation-timestamp attribute name.
    #[must_use]
    pub fn with_creation_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.creation_attribute = attribute.into();
        self
    }

    /// The site layout this aggregator publishes into.
    #[must_use]
    pub fn layout(&self) -> &SiteLayout {
        &self.layout
    }

    /// Publish one run for a collection.
    ///
    /// Sequence: write the detail report, lock the store, rotate the prior
    /// overview into the archive, write the new overview as current, fold the
    /// run into the store, save it atomically, and regenerate the timeline
    /// view. Rotation is skipped on the first run for an identity.
    pub fn publish(&self, short_name: &str, run: &RunReport) -> Result<PublishedRun> {
        let identity = self.identities.identity_of(short_name)?;
        self.layout.ensure_dirs()?;
        ensure_stylesheet(&self.layout)?;

        let verdicts = run.verdicts_with(&self.creation_attribute);
        let unequal = RunReport::unequal_granules(&verdicts);
        let equal = unequal.is_empty();

        let detail_report = DetailReporter::new().write_to(
            &self.layout.detail_dir(),
            identity,
            run,
            &verdicts,
            short_name,
        )?;
        let detail_name = DetailReporter::file_name(identity, &run.timestamp);

        // Single writer per identity from here to the end of the run.
        let json_dir = self.layout.json_dir();
        let _lock = StoreLock::acquire(&json_dir, identity)?;
        let mut store = TimelineStore::load(TimelineStore::path_for(&json_dir, identity))?;

        let archived = rotate_current(&self.layout, identity, &store)?;
        if let Some(name) = &archived {
            store.rewrite_current(name);
        }
        store.retire_stale_current(identity);

        let overview_page =
            OverviewReporter::new().generate(run, &verdicts, identity, &detail_name);
        let overview = self.layout.overview_path(identity);
        std::fs::write(&overview, overview_page)
            .map_err(|e| CompareError::io(overview.clone(), e))?;

        store.upsert(
            run.timestamp.clone(),
            TimelineEntry {
                reference_count: run.reference_count,
                candidate_count: run.candidate_count,
                equal,
                archive: ArchiveRef::Current,
            },
        );
        store.save()?;

        let timeline_page = TimelineReporter::new().generate(&store, identity);
        let timeline = self.layout.timeline_path(identity);
        std::fs::write(&timeline, timeline_page)
            .map_err(|e| CompareError::io(timeline.clone(), e))?;

        tracing::info!(
            collection = short_name,
            identity,
            timestamp = %run.timestamp,
            equal,
            unequal_granules = unequal.len(),
            "run published"
        );

        Ok(PublishedRun {
            detail_report,
            overview,
            timeline,
            archived,
            equal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Granule;
    use crate::pipeline::compare_batch;
    use indexmap::IndexMap;

    fn aggregator(root: &std::path::Path) -> Aggregator {
        Aggregator::new(
            IdentityTable::new().with("TEST-COLLECTION-v1", "test"),
            SiteLayout::new(root),
        )
    }

    fn run_at(timestamp: &str) -> RunReport {
        let granule = Granule::new().with_attribute("institution", "JPL");
        let mut side = IndexMap::new();
        side.insert("g1.nc".to_string(), granule);
        compare_batch(&side, &side.clone(), timestamp.to_string())
    }

    #[test]
    fn test_first_run_creates_current_without_archive() {
        let dir = tempfile::tempdir().unwrap();
        let published = aggregator(dir.path())
            .publish("TEST-COLLECTION-v1", &run_at("20260806T000000"))
            .unwrap();

        assert!(published.equal);
        assert_eq!(published.archived, None);
        assert!(published.overview.exists());
        assert!(published.detail_report.exists());
        assert!(published.timeline.exists());
    }

    #[test]
    fn test_unknown_collection_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = aggregator(dir.path())
            .publish("UNKNOWN", &run_at("20260806T000000"))
            .unwrap_err();
        assert!(err.to_string().contains("Report generation failed"));
    }

    #[test]
    fn test_second_run_rotates_first() {
        let dir = tempfile::tempdir().unwrap();
        let agg = aggregator(dir.path());
        agg.publish("TEST-COLLECTION-v1", &run_at("20260806T000000"))
            .unwrap();
        let published = agg
            .publish("TEST-COLLECTION-v1", &run_at("20260806T010000"))
            .unwrap();

        assert_eq!(
            published.archived.as_deref(),
            Some("20260806T000000-test.html")
        );
        let store = TimelineStore::load(TimelineStore::path_for(
            &agg.layout().json_dir(),
            "test",
        ))
        .unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.current().unwrap().0, "20260806T010000");
    }
}
