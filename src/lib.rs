//! **Structural diff and timeline reporting for Earth science data granules.**
//!
//! `granule-tools` compares two versions of a collection of multi-dimensional
//! labeled granules, a trusted *reference* and a *candidate*, and reports
//! every structural divergence at three granularities: global metadata,
//! dimensions, and variables with array payloads. On top of the diff engine
//! sits a stateful aggregator that publishes each run into a report site,
//! keeps a persisted per-collection timeline of run verdicts, and rotates
//! superseded overview pages into an append-only archive.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: the in-memory [`Granule`]: dimensions, global
//!   attributes, and [`Variable`]s carrying `ndarray` payloads with optional
//!   masks and fill values.
//! - **[`diff`]**: the pure [`DiffEngine`] producing a [`GranuleDiff`] per
//!   granule pair, and the verdict derivation (including the
//!   creation-timestamp carve-out).
//! - **[`pipeline`]**: batch matching and diffing of two granule snapshots
//!   into a [`RunReport`], plus the JSON snapshot loader.
//! - **[`reports`]**: the plain-text detail report, the HTML overview, and
//!   the HTML timeline view.
//! - **[`timeline`]**: the persisted timeline store, archive rotation, and
//!   the [`Aggregator`] that makes a run durable.
//!
//! ## Diffing Two Granules
//!
//! ```
//! use granule_tools::{DiffEngine, Granule, Variable};
//! use ndarray::arr1;
//!
//! let reference = Granule::new()
//!     .with_dimension("time", 10)
//!     .with_variable("sst", Variable::new(arr1(&[290.0, 291.5]).into_dyn()));
//! let candidate = Granule::new()
//!     .with_dimension("time", 12)
//!     .with_variable("sst", Variable::new(arr1(&[290.0, 291.5]).into_dyn()));
//!
//! let diff = DiffEngine::new().diff(&reference, &candidate);
//! assert_eq!(diff.dimensions.size_mismatches.len(), 1);
//! assert!(!diff.verdict("date_created").equal);
//! ```
//!
//! ## Concurrency
//!
//! Runs are single-threaded and synchronous. The timeline store and the
//! current overview are shared across runs of the same collection identity;
//! the store lock serializes them, and a second concurrent run for the same
//! identity fails fast rather than corrupting history.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]

pub mod config;
pub mod diff;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod reports;
pub mod timeline;

// Re-export main types for convenience
pub use config::{IdentityTable, SiteLayout, DEFAULT_CREATION_ATTRIBUTE};
pub use diff::{DiffEngine, GranuleDiff, GranuleVerdict, VariableComparison};
pub use error::{CompareError, Result};
pub use model::{AttrValue, Granule, Variable, FILL_SENTINEL};
pub use pipeline::{compare_batch, load_granule, load_snapshot_dir, RunReport};
pub use reports::{DetailReporter, OverviewReporter, TimelineReporter};
pub use timeline::{Aggregator, PublishedRun, TimelineEntry, TimelineStore};
