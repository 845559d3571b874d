//! HTML timeline view.
//!
//! Regenerated in full from the persisted timeline store on every run: one
//! row per run, newest first, each linking either to the current overview or
//! to its archived snapshot. The page is never read back by the tool.

use crate::reports::escape::escape_html;
use crate::reports::html::page_header;
use crate::timeline::{ArchiveRef, TimelineStore};

/// Renders the per-collection timeline page.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineReporter;

impl TimelineReporter {
    /// Create a new timeline reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Render the timeline page from the store.
    pub fn generate(&self, store: &TimelineStore, identity: &str) -> String {
        let mut out = page_header(identity, "");
        out.push_str("<h1>Timeline Data</h1>\n");

        let mut body = String::new();
        for (timestamp, entry) in store.entries_newest_first() {
            let row_class = if entry.equal { "" } else { " class='not_equal'" };
            body.push_str(&format!("<tr{row_class}>"));
            body.push_str(&format!("<td>{timestamp}</td>"));
            body.push_str(&format!("<td>{}</td>", entry.reference_count));
            body.push_str(&format!("<td>{}</td>", entry.candidate_count));
            body.push_str(&format!("<td>{}</td>", entry.equal));
            match &entry.archive {
                ArchiveRef::Current => {
                    body.push_str(&format!(
                        "<td><a href='index-{identity}.html'>Current</a></td></tr>\n"
                    ));
                }
                ArchiveRef::Archived(name) => {
                    body.push_str(&format!(
                        "<td><a href='archive/{0}' target='_blank'>{0}</a></td></tr>\n",
                        escape_html(name)
                    ));
                }
            }
        }

        out.push_str(&format!(
            "<table>\n<thead>\n<tr><th>{}</th>\n</tr>\n</thead>\n<tbody>\n{}</tbody>\n</table>\n",
            ["Run", "# Reference", "# Candidate", "Equality", "Archive File"].join("</th><th>"),
            body
        ));
        out.push_str("</body>");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::TimelineEntry;

    fn store_with_runs() -> (tempfile::TempDir, TimelineStore) {
        let dir = tempfile::tempdir().unwrap();
        let mut store =
            TimelineStore::load(TimelineStore::path_for(dir.path(), "test")).unwrap();
        store.upsert(
            "20260805T000000".to_string(),
            TimelineEntry {
                reference_count: 4,
                candidate_count: 4,
                equal: false,
                archive: ArchiveRef::Archived("20260805T000000-test.html".to_string()),
            },
        );
        store.upsert(
            "20260806T000000".to_string(),
            TimelineEntry {
                reference_count: 5,
                candidate_count: 5,
                equal: true,
                archive: ArchiveRef::Current,
            },
        );
        (dir, store)
    }

    #[test]
    fn test_current_row_links_to_overview() {
        let (_dir, store) = store_with_runs();
        let page = TimelineReporter::new().generate(&store, "test");
        assert!(page.contains("<a href='index-test.html'>Current</a>"));
    }

    #[test]
    fn test_archived_row_links_into_archive() {
        let (_dir, store) = store_with_runs();
        let page = TimelineReporter::new().generate(&store, "test");
        assert!(page.contains("<a href='archive/20260805T000000-test.html'"));
    }

    #[test]
    fn test_rows_ordered_newest_first() {
        let (_dir, store) = store_with_runs();
        let page = TimelineReporter::new().generate(&store, "test");
        let newest = page.find("20260806T000000").unwrap();
        let older = page.find("20260805T000000").unwrap();
        assert!(newest < older);
    }

    #[test]
    fn test_unequal_run_row_flagged() {
        let (_dir, store) = store_with_runs();
        let page = TimelineReporter::new().generate(&store, "test");
        assert!(page.contains("<tr class='not_equal'><td>20260805T000000</td>"));
    }
}
