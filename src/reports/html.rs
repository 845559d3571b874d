//! HTML overview report.
//!
//! The overview is the "current" artifact for a collection: one page per run
//! summarizing counts, presence differences, and per-granule equality, with
//! links into the detail reports. When the next run publishes, this page is
//! rotated into the archive.

use crate::config::SiteLayout;
use crate::diff::GranuleVerdict;
use crate::error::{CompareError, Result};
use crate::pipeline::RunReport;
use crate::reports::escape::escape_html;
use indexmap::IndexMap;

/// Minimal stylesheet written alongside the pages when absent.
const STYLE_SHEET: &str = "\
body { font-family: sans-serif; margin: 2em; }
table { border-collapse: collapse; }
th, td { border: 1px solid #999; padding: 0.3em 0.8em; }
tr.not_equal { background-color: #f8d0d0; }
ul.nav { list-style-type: none; margin: 0; padding: 0; overflow: hidden; }
li.nav { float: left; margin-right: 1.5em; }
";

/// Shared page header: doctype, stylesheet link, and the nav bar.
///
/// `depth_prefix` is `""` for pages at the site root and `"../"` for archived
/// pages one directory down.
pub fn page_header(identity: &str, depth_prefix: &str) -> String {
    let mut out = String::new();
    out.push_str(
        "<!DOCTYPE html>\n<html>\n<head>\n<link rel='stylesheet' href='style.css'>\n</head>\n<body>\n",
    );
    out.push_str("<ul class='nav'>\n");
    out.push_str(&format!(
        "<li class='nav'><a href='{depth_prefix}index.html'>Home</a></li>\n"
    ));
    out.push_str(&format!(
        "<li class='nav'><a href='{depth_prefix}index-{identity}.html'>Overview</a></li>\n"
    ));
    out.push_str(&format!(
        "<li class='nav'><a href='{depth_prefix}timeline-{identity}.html'>Timeline</a></li>\n"
    ));
    out.push_str(&format!(
        "<li class='nav'><a href='{depth_prefix}detail-reports'>Detail Reports</a></li>\n"
    ));
    out.push_str(&format!(
        "<li class='nav'><a href='{depth_prefix}archive'>Archives</a></li>\n"
    ));
    out.push_str("</ul>\n");
    out
}

/// The `<h1>` marker line carrying the run timestamp.
///
/// The timestamp lives in the timeline store as well; this line is only the
/// best-effort fallback for recovering it from an orphaned overview page.
#[must_use]
pub fn marker_line(timestamp: &str) -> String {
    format!("<h1>{timestamp} Granule Comparison: Reference vs. Candidate</h1>\n")
}

fn table(columns: &[&str], body: &str) -> String {
    let head = format!(
        "<thead>\n<tr><th>{}</th>\n</tr>\n</thead>\n",
        columns.join("</th><th>")
    );
    format!("<table>\n{head}<tbody>\n{body}</tbody>\n</table>\n")
}

fn list(items: &[String]) -> String {
    let mut out = String::from("<ul>\n");
    for item in items {
        out.push_str(&format!("<li>{}</li>\n", escape_html(item)));
    }
    out.push_str("</ul>\n");
    out
}

/// Renders the per-run HTML overview page.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverviewReporter;

impl OverviewReporter {
    /// Create a new overview reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Render the overview page for one run.
    pub fn generate(
        &self,
        run: &RunReport,
        verdicts: &IndexMap<String, GranuleVerdict>,
        identity: &str,
        detail_report_name: &str,
    ) -> String {
        let mut out = page_header(identity, "");
        out.push_str(&marker_line(&run.timestamp));

        out.push_str("<h2>Overview Comparison</h2>\n");
        out.push_str(&table(
            &["Run", "# of Reference Granules", "# of Candidate Granules"],
            &format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                run.timestamp, run.reference_count, run.candidate_count
            ),
        ));

        if !run.reference_only.is_empty() || !run.candidate_only.is_empty() {
            out.push_str("<h2>Overview Differences</h2>\n");
        }
        if !run.reference_only.is_empty() {
            out.push_str("<b>Granules in reference only: </b>\n");
            out.push_str(&list(&run.reference_only));
        }
        if !run.candidate_only.is_empty() {
            out.push_str("<b>Granules in candidate only: </b>\n");
            out.push_str(&list(&run.candidate_only));
        }

        if run.nothing_to_compare() {
            out.push_str("<p>Nothing to compare: no matched granule pairs were found.</p>\n");
        } else {
            out.push_str("<h2>Granule-Level Comparison</h2>\n");
            let mut body = String::new();
            for (name, verdict) in verdicts {
                let row_class = if verdict.equal { "" } else { " class='not_equal'" };
                body.push_str(&format!("<tr{row_class}>"));
                body.push_str(&format!("<td>{}</td>", escape_html(name)));
                body.push_str(&format!(
                    "<td>{}</td>",
                    escape_html(verdict.reference_created.as_deref().unwrap_or("-"))
                ));
                body.push_str(&format!(
                    "<td>{}</td>",
                    escape_html(verdict.candidate_created.as_deref().unwrap_or("-"))
                ));
                body.push_str(&format!("<td>{}</td>", verdict.attributes_equal));
                body.push_str(&format!("<td>{}</td>", verdict.dimensions_equal));
                body.push_str(&format!("<td>{}</td>", verdict.variables_equal));
                body.push_str(&format!(
                    "<td><a href='detail-reports/{0}' target='_blank'>{0}</a></td></tr>\n",
                    escape_html(detail_report_name)
                ));
            }
            out.push_str(&table(
                &[
                    "Granule",
                    "Reference Creation Time",
                    "Candidate Creation Time",
                    "Attribute Equality",
                    "Dimension Equality",
                    "Variable Equality",
                    "Report File",
                ],
                &body,
            ));

            let unequal = RunReport::unequal_granules(verdicts);
            if !unequal.is_empty() {
                out.push_str("<h2>Unequal Granules: </h2>\n");
                out.push_str(&list(&unequal));
            }
        }

        out.push_str("</body>");
        out
    }
}

/// Write the shared stylesheet into the site root and archive directory.
pub fn ensure_stylesheet(layout: &SiteLayout) -> Result<()> {
    for dir in [layout.root().to_path_buf(), layout.archive_dir()] {
        let css = dir.join("style.css");
        if !css.exists() {
            std::fs::write(&css, STYLE_SHEET).map_err(|e| CompareError::io(css.clone(), e))?;
        }
    }
    Ok(())
}
