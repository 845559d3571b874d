//! Archive rotation of the current overview page.
//!
//! When a new run is about to publish, the previous run's overview moves from
//! `index-<identity>.html` into `archive/<timestamp>-<identity>.html` and its
//! nav links are rewritten for the new directory depth. The rotated snapshot
//! is never modified again.

use crate::config::SiteLayout;
use crate::error::{CompareError, Result, StoreErrorKind};
use crate::timeline::TimelineStore;
use regex::Regex;
use std::path::Path;

/// Rotate the prior current overview into the archive directory.
///
/// Returns the archive file name, or `None` when no prior overview exists
/// (first run for this identity, not an error). The prior run's timestamp
/// comes from the store entry marked current; parsing the overview's marker
/// line is the fallback for an orphaned page the store does not know about.
/// An unrecoverable timestamp degrades to a best-effort file name: losing a
/// pretty name is cosmetic, aborting the run is not.
pub fn rotate_current(
    layout: &SiteLayout,
    identity: &str,
    store: &TimelineStore,
) -> Result<Option<String>> {
    let current = layout.overview_path(identity);
    if !current.exists() {
        return Ok(None);
    }

    let timestamp = store
        .current()
        .map(|(ts, _)| ts.to_string())
        .or_else(|| parse_marker_timestamp(&current));
    let archive_name = match timestamp {
        Some(ts) => format!("{ts}-{identity}.html"),
        None => {
            tracing::warn!(
                page = %current.display(),
                "could not recover run timestamp; archiving under a fallback name"
            );
            format!("unrecovered-{identity}.html")
        }
    };

    let archive_path = layout.archive_dir().join(&archive_name);
    std::fs::rename(&current, &archive_path).map_err(|e| {
        CompareError::store(
            format!("archiving {}", current.display()),
            StoreErrorKind::Rotation(e.to_string()),
        )
    })?;
    rewrite_nav_links(&archive_path)?;
    tracing::info!(from = %current.display(), to = %archive_path.display(), "overview archived");

    Ok(Some(archive_name))
}

/// Best-effort recovery of the run timestamp from the overview's marker line.
fn parse_marker_timestamp(page: &Path) -> Option<String> {
    let content = std::fs::read_to_string(page).ok()?;
    let marker = Regex::new(r"<h1>(\d{8}T\d{6})").ok()?;
    marker
        .captures(&content)
        .map(|caps| caps[1].to_string())
}

/// Point the archived page's nav links one directory up.
fn rewrite_nav_links(page: &Path) -> Result<()> {
    let content =
        std::fs::read_to_string(page).map_err(|e| CompareError::io(page.to_path_buf(), e))?;
    let rewritten: Vec<String> = content
        .lines()
        .map(|line| {
            if line.contains("class='nav'") {
                line.replace("href='", "href='../")
            } else {
                line.to_string()
            }
        })
        .collect();
    std::fs::write(page, rewritten.join("\n"))
        .map_err(|e| CompareError::io(page.to_path_buf(), e))?;
    Ok(())
}
