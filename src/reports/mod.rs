//! Report generation for comparison runs.
//!
//! Three renderers share the run's diff records and verdicts:
//! - Detail: plain-text, one file per run, the full divergence listing
//! - Overview: HTML "current" page per collection, rotated into the archive
//! - Timeline: HTML history view regenerated from the persisted store
//!
//! Granule names and attribute values come from external files; the `escape`
//! module keeps them safe to embed in HTML.

mod detail;
pub mod escape;
pub mod html;
mod timeline_page;

pub use detail::DetailReporter;
pub use html::{ensure_stylesheet, OverviewReporter};
pub use timeline_page::TimelineReporter;
