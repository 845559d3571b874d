//! Granule data model.
//!
//! Defines the in-memory representation of a data granule (dimensions,
//! global attributes, and variables with array payloads) consumed by the
//! diff engine. Snapshots of this model serialize to JSON so granules can
//! be produced by an external extraction step and replayed here.

mod dataset;
mod value;

pub use dataset::{Granule, Variable, FILL_SENTINEL};
pub use value::AttrValue;
