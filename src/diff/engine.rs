//! Granule diff engine.
//!
//! Pure comparison of two granules. The engine never blocks, never touches
//! the filesystem, and never mutates its inputs; everything it finds goes
//! into the returned [`GranuleDiff`].

use crate::diff::{
    AttributeDiff, DimensionDiff, GranuleDiff, SizeMismatch, ValueMismatch, VariableComparison,
    VariableDiff,
};
use crate::model::{AttrValue, Granule, Variable};
use indexmap::IndexMap;
use ndarray::ArrayD;

/// Compares a reference granule against a candidate granule.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffEngine;

impl DiffEngine {
    /// Create a new diff engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Compare two granules and record every divergence.
    ///
    /// A name present on only one side lands in the presence sets and is
    /// excluded from value comparison; it is never an error. Two empty
    /// granules produce an all-empty diff.
    pub fn diff(&self, reference: &Granule, candidate: &Granule) -> GranuleDiff {
        GranuleDiff {
            dimensions: self.diff_dimensions(reference, candidate),
            attributes: self.diff_attributes(reference, candidate),
            variables: self.diff_variables(reference, candidate),
        }
    }

    fn diff_dimensions(&self, reference: &Granule, candidate: &Granule) -> DimensionDiff {
        let (reference_only, candidate_only) =
            presence_sets(&reference.dimensions, &candidate.dimensions);

        let size_mismatches = reference
            .dimensions
            .iter()
            .filter_map(|(name, &ref_size)| {
                let &cand_size = candidate.dimensions.get(name)?;
                (ref_size != cand_size).then(|| SizeMismatch {
                    name: name.clone(),
                    reference: ref_size,
                    candidate: cand_size,
                })
            })
            .collect();

        DimensionDiff {
            reference_only,
            candidate_only,
            size_mismatches,
        }
    }

    fn diff_attributes(&self, reference: &Granule, candidate: &Granule) -> AttributeDiff {
        let (reference_only, candidate_only) =
            presence_sets(&reference.attributes, &candidate.attributes);

        let value_mismatches = reference
            .attributes
            .iter()
            .filter_map(|(name, ref_value)| {
                let cand_value = candidate.attributes.get(name)?;
                (ref_value != cand_value).then(|| ValueMismatch {
                    name: name.clone(),
                    reference: ref_value.clone(),
                    candidate: cand_value.clone(),
                })
            })
            .collect();

        AttributeDiff {
            reference_only,
            candidate_only,
            value_mismatches,
        }
    }

    fn diff_variables(&self, reference: &Granule, candidate: &Granule) -> VariableDiff {
        let (reference_only, candidate_only) =
            presence_sets(&reference.variables, &candidate.variables);

        // Every variable on either side gets a content entry: shared names are
        // compared field-by-field, sole-side names record that no counterpart
        // exists. Renderers treat the latter as "not equal" without erroring.
        let mut content = IndexMap::new();
        for (name, ref_var) in &reference.variables {
            let comparison = match candidate.variables.get(name) {
                Some(cand_var) => compare_variable(ref_var, cand_var),
                None => VariableComparison::MissingCounterpart,
            };
            content.insert(name.clone(), comparison);
        }
        for name in &candidate_only {
            content.insert(name.clone(), VariableComparison::MissingCounterpart);
        }

        VariableDiff {
            reference_only,
            candidate_only,
            content,
        }
    }
}

/// Name-key set differences between two maps, in each side's own order.
fn presence_sets<V>(
    reference: &IndexMap<String, V>,
    candidate: &IndexMap<String, V>,
) -> (Vec<String>, Vec<String>) {
    let reference_only = reference
        .keys()
        .filter(|name| !candidate.contains_key(*name))
        .cloned()
        .collect();
    let candidate_only = candidate
        .keys()
        .filter(|name| !reference.contains_key(*name))
        .cloned()
        .collect();
    (reference_only, candidate_only)
}

fn compare_variable(reference: &Variable, candidate: &Variable) -> VariableComparison {
    VariableComparison::Compared {
        attributes_equal: keys_equal_positional(&reference.attributes, &candidate.attributes),
        arrays_equal: arrays_equal(&reference.filled(), &candidate.filled()),
    }
}

/// Positional equality of two attribute key sequences.
///
/// Equal iff both sequences have the same length and the same key at every
/// position. Reordering attributes alone is unequal; so is one side carrying a
/// strict prefix of the other. This is a deliberate positional contract, not a
/// set contract: attribute order is part of how the file was written.
fn keys_equal_positional(
    reference: &IndexMap<String, AttrValue>,
    candidate: &IndexMap<String, AttrValue>,
) -> bool {
    reference.len() == candidate.len()
        && reference.keys().zip(candidate.keys()).all(|(a, b)| a == b)
}

/// Element-wise array equality with `NaN == NaN`.
///
/// Missing-value propagation must not cause false inequality, so NaN cells
/// compare equal to NaN cells. Shapes must match exactly; a shape mismatch is
/// unequal, never a panic.
fn arrays_equal(reference: &ArrayD<f64>, candidate: &ArrayD<f64>) -> bool {
    reference.shape() == candidate.shape()
        && reference
            .iter()
            .zip(candidate.iter())
            .all(|(a, b)| a == b || (a.is_nan() && b.is_nan()))
}
