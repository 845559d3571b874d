//! Timeline persistence and aggregation.
//!
//! The per-collection timeline store, archive rotation of the current
//! overview, and the [`Aggregator`] that ties a run's diff records to durable
//! report artifacts.

mod aggregator;
mod rotate;
mod store;

pub use aggregator::{Aggregator, PublishedRun};
pub use rotate::rotate_current;
pub use store::{ArchiveRef, StoreLock, TimelineEntry, TimelineStore, CURRENT_MARKER};
