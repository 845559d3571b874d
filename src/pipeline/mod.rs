//! Run-level comparison pipeline.
//!
//! One run compares a batch of granule pairs at a point in time: match granule
//! names between the reference and candidate snapshots, diff each matched
//! pair, and assemble a [`RunReport`] for the renderer and the aggregator.

mod loader;

pub use loader::{load_granule, load_snapshot_dir};

use crate::config::DEFAULT_CREATION_ATTRIBUTE;
use crate::diff::{DiffEngine, GranuleDiff, GranuleVerdict};
use crate::model::Granule;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Everything one run produced: counts, presence sets, and per-pair diffs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Run timestamp, `%Y%m%dT%H%M%S`
    pub timestamp: String,
    /// Number of granules in the reference snapshot
    pub reference_count: usize,
    /// Number of granules in the candidate snapshot
    pub candidate_count: usize,
    /// Granule names present only in the reference snapshot
    pub reference_only: Vec<String>,
    /// Granule names present only in the candidate snapshot
    pub candidate_only: Vec<String>,
    /// Diff record per matched granule pair
    pub diffs: IndexMap<String, GranuleDiff>,
}

impl RunReport {
    /// Derive per-granule verdicts using the default creation attribute.
    #[must_use]
    pub fn verdicts(&self) -> IndexMap<String, GranuleVerdict> {
        self.verdicts_with(DEFAULT_CREATION_ATTRIBUTE)
    }

    /// Derive per-granule verdicts with an explicit creation attribute.
    #[must_use]
    pub fn verdicts_with(&self, creation_attribute: &str) -> IndexMap<String, GranuleVerdict> {
        self.diffs
            .iter()
            .map(|(name, diff)| (name.clone(), diff.verdict(creation_attribute)))
            .collect()
    }

    /// Names of granules whose verdict is unequal.
    #[must_use]
    pub fn unequal_granules(verdicts: &IndexMap<String, GranuleVerdict>) -> Vec<String> {
        verdicts
            .iter()
            .filter(|(_, v)| !v.equal)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// True when no matched granule pairs exist in this run.
    #[must_use]
    pub fn nothing_to_compare(&self) -> bool {
        self.diffs.is_empty()
    }
}

/// Match and diff a batch of granule pairs.
///
/// Names present on only one side are recorded and skipped; every shared name
/// is compared with the [`DiffEngine`]. Granule iteration order follows the
/// reference snapshot.
#[must_use]
pub fn compare_batch(
    reference: &IndexMap<String, Granule>,
    candidate: &IndexMap<String, Granule>,
    timestamp: String,
) -> RunReport {
    let engine = DiffEngine::new();

    let reference_only: Vec<String> = reference
        .keys()
        .filter(|name| !candidate.contains_key(*name))
        .cloned()
        .collect();
    let candidate_only: Vec<String> = candidate
        .keys()
        .filter(|name| !reference.contains_key(*name))
        .cloned()
        .collect();

    let mut diffs = IndexMap::new();
    for (name, ref_granule) in reference {
        if let Some(cand_granule) = candidate.get(name) {
            tracing::info!(granule = %name, "comparing");
            diffs.insert(name.clone(), engine.diff(ref_granule, cand_granule));
        }
    }

    RunReport {
        timestamp,
        reference_count: reference.len(),
        candidate_count: candidate.len(),
        reference_only,
        candidate_only,
        diffs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Variable;
    use ndarray::arr1;

    fn snapshot(names: &[&str]) -> IndexMap<String, Granule> {
        names
            .iter()
            .map(|name| {
                let granule = Granule::new().with_variable(
                    "sst",
                    Variable::new(arr1(&[1.0, 2.0]).into_dyn()),
                );
                ((*name).to_string(), granule)
            })
            .collect()
    }

    #[test]
    fn test_batch_matches_by_name() {
        let reference = snapshot(&["g1.nc", "g2.nc", "g3.nc"]);
        let candidate = snapshot(&["g2.nc", "g3.nc", "g4.nc"]);

        let run = compare_batch(&reference, &candidate, "20260806T120000".to_string());
        assert_eq!(run.reference_count, 3);
        assert_eq!(run.candidate_count, 3);
        assert_eq!(run.reference_only, vec!["g1.nc"]);
        assert_eq!(run.candidate_only, vec!["g4.nc"]);
        assert_eq!(run.diffs.len(), 2);
    }

    #[test]
    fn test_empty_batch_has_nothing_to_compare() {
        let run = compare_batch(
            &IndexMap::new(),
            &IndexMap::new(),
            "20260806T120000".to_string(),
        );
        assert!(run.nothing_to_compare());
        assert!(RunReport::unequal_granules(&run.verdicts()).is_empty());
    }

    #[test]
    fn test_verdicts_flag_unequal_granules() {
        let reference = snapshot(&["g1.nc"]);
        let mut candidate = snapshot(&["g1.nc"]);
        candidate
            .get_mut("g1.nc")
            .unwrap()
            .variables
            .get_mut("sst")
            .unwrap()
            .data = arr1(&[9.0, 9.0]).into_dyn();

        let run = compare_batch(&reference, &candidate, "20260806T120000".to_string());
        let verdicts = run.verdicts();
        assert_eq!(RunReport::unequal_granules(&verdicts), vec!["g1.nc"]);
    }
}
