//! Structural granule diffing.
//!
//! Home of the [`DiffEngine`], which compares a reference granule against a
//! candidate granule and produces a [`GranuleDiff`] describing every
//! divergence in dimensions, global attributes, and variables.

mod engine;
mod result;

pub use engine::DiffEngine;
pub use result::{
    AttributeDiff, DimensionDiff, GranuleDiff, GranuleVerdict, SizeMismatch, ValueMismatch,
    VariableComparison, VariableDiff,
};
