//! In-memory granule model.
//!
//! A [`Granule`] is one named multi-dimensional data file: dimensions, global
//! attributes, and variables with array payloads. Granules are read-only for
//! the duration of a comparison; the comparison engine borrows them and never
//! mutates. How a granule gets into memory (local file, object storage,
//! in-memory buffer) is the caller's concern.
//!
//! All maps preserve insertion order: variable attribute comparison is
//! positional, so the order attributes were written in is part of the data.

use crate::model::AttrValue;
use indexmap::IndexMap;
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

/// Sentinel substituted for masked/missing array cells before comparison.
///
/// Both sides of a comparison receive the same substitution, so a missing cell
/// compares equal to another missing cell regardless of how the source
/// represented it (explicit mask or fill value).
pub const FILL_SENTINEL: f64 = -9999.0;

/// One named multi-dimensional data granule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Granule {
    /// Dimension name -> size. The name is the key; a dimension's identity
    /// and its name are the same thing.
    #[serde(default)]
    pub dimensions: IndexMap<String, u64>,
    /// Global attributes.
    #[serde(default)]
    pub attributes: IndexMap<String, AttrValue>,
    /// Variables keyed by name.
    #[serde(default)]
    pub variables: IndexMap<String, Variable>,
}

impl Granule {
    /// Create an empty granule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dimension.
    #[must_use]
    pub fn with_dimension(mut self, name: impl Into<String>, size: u64) -> Self {
        self.dimensions.insert(name.into(), size);
        self
    }

    /// Add a global attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Add a variable.
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, variable: Variable) -> Self {
        self.variables.insert(name.into(), variable);
        self
    }

    /// True when the granule has no dimensions, attributes, or variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty() && self.attributes.is_empty() && self.variables.is_empty()
    }
}

/// A named array within a granule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    /// Per-variable attributes, in file order.
    #[serde(default)]
    pub attributes: IndexMap<String, AttrValue>,
    /// Numeric payload, dynamic rank.
    pub data: ArrayD<f64>,
    /// Explicit mask: `true` marks a missing cell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<ArrayD<bool>>,
    /// Fill value: cells holding exactly this value are treated as missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_value: Option<f64>,
}

impl Variable {
    /// Create a variable from its payload.
    #[must_use]
    pub fn new(data: ArrayD<f64>) -> Self {
        Self {
            attributes: IndexMap::new(),
            data,
            mask: None,
            fill_value: None,
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Attach an explicit mask.
    #[must_use]
    pub fn with_mask(mut self, mask: ArrayD<bool>) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Set the fill value.
    #[must_use]
    pub fn with_fill_value(mut self, fill_value: f64) -> Self {
        self.fill_value = Some(fill_value);
        self
    }

    /// The payload with every missing cell replaced by [`FILL_SENTINEL`].
    ///
    /// A cell is missing when the mask marks it, or when it holds the
    /// variable's fill value. A mask whose shape disagrees with the payload is
    /// malformed input and is ignored; the fill-value substitution still runs.
    #[must_use]
    pub fn filled(&self) -> ArrayD<f64> {
        let mut out = self.data.clone();
        if let Some(mask) = &self.mask {
            if mask.shape() == out.shape() {
                ndarray::Zip::from(&mut out).and(mask).for_each(|v, &m| {
                    if m {
                        *v = FILL_SENTINEL;
                    }
                });
            }
        }
        if let Some(fill) = self.fill_value {
            out.mapv_inplace(|v| if v == fill { FILL_SENTINEL } else { v });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn test_filled_substitutes_masked_cells() {
        let data = arr2(&[[1.0, 2.0], [3.0, 4.0]]).into_dyn();
        let mask = arr2(&[[false, true], [false, false]]).into_dyn();
        let var = Variable::new(data).with_mask(mask);

        let filled = var.filled();
        assert_eq!(filled[[0, 0]], 1.0);
        assert_eq!(filled[[0, 1]], FILL_SENTINEL);
        assert_eq!(filled[[1, 0]], 3.0);
    }

    #[test]
    fn test_filled_substitutes_fill_value_cells() {
        let data = arr2(&[[1.0, -32767.0], [3.0, 4.0]]).into_dyn();
        let var = Variable::new(data).with_fill_value(-32767.0);

        let filled = var.filled();
        assert_eq!(filled[[0, 1]], FILL_SENTINEL);
        assert_eq!(filled[[1, 1]], 4.0);
    }

    #[test]
    fn test_filled_ignores_mismatched_mask() {
        let data = arr2(&[[1.0, 2.0], [3.0, 4.0]]).into_dyn();
        let mask = ndarray::arr1(&[true, true]).into_dyn();
        let var = Variable::new(data.clone()).with_mask(mask);
        assert_eq!(var.filled(), data);
    }

    #[test]
    fn test_granule_builder_preserves_order() {
        let granule = Granule::new()
            .with_dimension("time", 1)
            .with_dimension("lat", 180)
            .with_dimension("lon", 360);
        let names: Vec<_> = granule.dimensions.keys().cloned().collect();
        assert_eq!(names, vec!["time", "lat", "lon"]);
    }

    #[test]
    fn test_empty_granule() {
        assert!(Granule::new().is_empty());
    }
}
