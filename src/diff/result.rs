//! Diff result structures.
//!
//! A [`GranuleDiff`] records every divergence between a reference and a
//! candidate granule at three granularities: dimensions, global attributes,
//! and variables. Diff records are created once by the engine and never
//! mutated afterwards.

use crate::model::AttrValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Complete result of comparing one granule pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[must_use]
pub struct GranuleDiff {
    /// Dimension-level differences
    pub dimensions: DimensionDiff,
    /// Global attribute-level differences
    pub attributes: AttributeDiff,
    /// Variable-level differences
    pub variables: VariableDiff,
}

impl GranuleDiff {
    /// Derive the verdict for this granule.
    ///
    /// `creation_attribute` names the global attribute holding the granule's
    /// creation timestamp. Two granules whose only attribute divergence is
    /// that single value are still considered equal: independently produced
    /// runs legitimately stamp different creation times.
    pub fn verdict(&self, creation_attribute: &str) -> GranuleVerdict {
        let dimensions_equal = self.dimensions.is_equal();
        let attributes_equal = self.attributes.is_equal()
            || self.attributes.only_mismatch_is(creation_attribute);
        let variables_equal = self.variables.is_equal();

        let (reference_created, candidate_created) = self
            .attributes
            .value_mismatches
            .iter()
            .find(|m| m.name == creation_attribute)
            .map_or((None, None), |m| {
                (
                    Some(m.reference.to_string()),
                    Some(m.candidate.to_string()),
                )
            });

        GranuleVerdict {
            dimensions_equal,
            attributes_equal,
            variables_equal,
            equal: dimensions_equal && attributes_equal && variables_equal,
            reference_created,
            candidate_created,
        }
    }
}

/// Dimension-level differences for one granule pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DimensionDiff {
    /// Dimension names present only on the reference side
    pub reference_only: Vec<String>,
    /// Dimension names present only on the candidate side
    pub candidate_only: Vec<String>,
    /// Shared dimensions whose sizes disagree
    pub size_mismatches: Vec<SizeMismatch>,
}

impl DimensionDiff {
    /// True when both sides have identical dimensions.
    #[must_use]
    pub fn is_equal(&self) -> bool {
        self.reference_only.is_empty()
            && self.candidate_only.is_empty()
            && self.size_mismatches.is_empty()
    }
}

/// A shared dimension whose size differs between the two sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeMismatch {
    pub name: String,
    pub reference: u64,
    pub candidate: u64,
}

/// Global attribute-level differences for one granule pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributeDiff {
    /// Attribute names present only on the reference side
    pub reference_only: Vec<String>,
    /// Attribute names present only on the candidate side
    pub candidate_only: Vec<String>,
    /// Shared attributes whose values disagree
    pub value_mismatches: Vec<ValueMismatch>,
}

impl AttributeDiff {
    /// True when both sides have identical attributes.
    #[must_use]
    pub fn is_equal(&self) -> bool {
        self.reference_only.is_empty()
            && self.candidate_only.is_empty()
            && self.value_mismatches.is_empty()
    }

    /// True when the only divergence is a single value mismatch named `name`.
    #[must_use]
    pub fn only_mismatch_is(&self, name: &str) -> bool {
        self.reference_only.is_empty()
            && self.candidate_only.is_empty()
            && self.value_mismatches.len() == 1
            && self.value_mismatches[0].name == name
    }
}

/// A shared attribute whose value differs between the two sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueMismatch {
    pub name: String,
    pub reference: AttrValue,
    pub candidate: AttrValue,
}

/// Variable-level differences for one granule pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariableDiff {
    /// Variable names present only on the reference side
    pub reference_only: Vec<String>,
    /// Variable names present only on the candidate side
    pub candidate_only: Vec<String>,
    /// Per-variable comparison outcome, for every variable on either side
    pub content: IndexMap<String, VariableComparison>,
}

impl VariableDiff {
    /// True when both sides have identical variables.
    #[must_use]
    pub fn is_equal(&self) -> bool {
        self.reference_only.is_empty()
            && self.candidate_only.is_empty()
            && self.content.values().all(VariableComparison::is_equal)
    }
}

/// Comparison outcome for one variable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VariableComparison {
    /// The variable exists on only one side; there is nothing to compare
    /// field-by-field, and the granules are not equal.
    MissingCounterpart,
    /// The variable exists on both sides.
    Compared {
        /// Attribute key sequences are identical, position by position
        attributes_equal: bool,
        /// Array payloads are identical after fill substitution
        arrays_equal: bool,
    },
}

impl VariableComparison {
    /// True only for a compared variable with both fields equal.
    #[must_use]
    pub fn is_equal(&self) -> bool {
        matches!(
            self,
            Self::Compared {
                attributes_equal: true,
                arrays_equal: true,
            }
        )
    }
}

/// Derived per-granule verdict, plus display data for the overview report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GranuleVerdict {
    pub dimensions_equal: bool,
    pub attributes_equal: bool,
    pub variables_equal: bool,
    /// Conjunction of the three sub-verdicts
    pub equal: bool,
    /// Reference-side creation timestamp, when the two sides disagreed on it
    pub reference_created: Option<String>,
    /// Candidate-side creation timestamp, when the two sides disagreed on it
    pub candidate_created: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mismatch(name: &str, reference: &str, candidate: &str) -> ValueMismatch {
        ValueMismatch {
            name: name.to_string(),
            reference: AttrValue::from(reference),
            candidate: AttrValue::from(candidate),
        }
    }

    #[test]
    fn test_empty_diff_is_equal() {
        let diff = GranuleDiff::default();
        let verdict = diff.verdict("date_created");
        assert!(verdict.equal);
        assert!(verdict.dimensions_equal && verdict.attributes_equal && verdict.variables_equal);
        assert!(verdict.reference_created.is_none());
    }

    #[test]
    fn test_creation_timestamp_carve_out() {
        let mut diff = GranuleDiff::default();
        diff.attributes.value_mismatches.push(mismatch(
            "date_created",
            "2026-08-06T00:00:00Z",
            "2026-08-06T01:30:00Z",
        ));

        let verdict = diff.verdict("date_created");
        assert!(verdict.attributes_equal);
        assert!(verdict.equal);
        assert_eq!(
            verdict.reference_created.as_deref(),
            Some("2026-08-06T00:00:00Z")
        );
        assert_eq!(
            verdict.candidate_created.as_deref(),
            Some("2026-08-06T01:30:00Z")
        );
    }

    #[test]
    fn test_carve_out_requires_lone_mismatch() {
        let mut diff = GranuleDiff::default();
        diff.attributes.value_mismatches.push(mismatch(
            "date_created",
            "2026-08-06T00:00:00Z",
            "2026-08-06T01:30:00Z",
        ));
        diff.attributes
            .value_mismatches
            .push(mismatch("institution", "JPL", "GSFC"));

        let verdict = diff.verdict("date_created");
        assert!(!verdict.attributes_equal);
        assert!(!verdict.equal);
        // Timestamps are still extracted for display
        assert!(verdict.reference_created.is_some());
    }

    #[test]
    fn test_carve_out_does_not_cover_presence_differences() {
        let mut diff = GranuleDiff::default();
        diff.attributes
            .value_mismatches
            .push(mismatch("date_created", "a", "b"));
        diff.attributes.candidate_only.push("new_attr".to_string());

        assert!(!diff.verdict("date_created").equal);
    }

    #[test]
    fn test_other_lone_mismatch_is_unequal() {
        let mut diff = GranuleDiff::default();
        diff.attributes
            .value_mismatches
            .push(mismatch("institution", "JPL", "GSFC"));

        assert!(!diff.verdict("date_created").equal);
    }

    #[test]
    fn test_missing_counterpart_is_unequal() {
        let mut diff = GranuleDiff::default();
        diff.variables.reference_only.push("lon".to_string());
        diff.variables
            .content
            .insert("lon".to_string(), VariableComparison::MissingCounterpart);

        let verdict = diff.verdict("date_created");
        assert!(!verdict.variables_equal);
        assert!(!verdict.equal);
    }

    #[test]
    fn test_compared_variable_with_unequal_arrays() {
        let mut diff = GranuleDiff::default();
        diff.variables.content.insert(
            "sst".to_string(),
            VariableComparison::Compared {
                attributes_equal: true,
                arrays_equal: false,
            },
        );

        assert!(!diff.verdict("date_created").variables_equal);
    }
}
