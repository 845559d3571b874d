//! Unified error types for granule-tools.
//!
//! The comparison engine itself never fails: presence and value mismatches are
//! recorded in the diff, not raised. Errors here cover the edges of the
//! system, loading granule snapshots, rendering reports, and the persistence
//! of timeline state.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for granule-tools operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CompareError {
    /// Errors while loading granule snapshots
    #[error("Failed to load granule: {context}")]
    Load {
        context: String,
        #[source]
        source: LoadErrorKind,
    },

    /// Errors during report generation
    #[error("Report generation failed: {context}")]
    Report {
        context: String,
        #[source]
        source: ReportErrorKind,
    },

    /// Errors in the timeline store or archive rotation
    #[error("Timeline persistence failed: {context}")]
    Store {
        context: String,
        #[source]
        source: StoreErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Specific load error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LoadErrorKind {
    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Snapshot has no granule files: {0}")]
    EmptySnapshot(PathBuf),
}

/// Specific report error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReportErrorKind {
    #[error("Unknown collection short name: {0}")]
    UnknownCollection(String),

    #[error("Report directory missing: {0}")]
    MissingDirectory(PathBuf),
}

/// Specific timeline store error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StoreErrorKind {
    #[error("History is corrupt: {0}")]
    Corrupt(String),

    #[error("Another run holds the store lock: {0}")]
    Locked(PathBuf),

    #[error("Archive rotation failed: {0}")]
    Rotation(String),

    #[error("Atomic replace failed: {0}")]
    Replace(String),
}

/// Convenient Result type for granule-tools operations
pub type Result<T> = std::result::Result<T, CompareError>;

impl CompareError {
    /// Create a load error with context
    pub fn load(context: impl Into<String>, source: LoadErrorKind) -> Self {
        Self::Load {
            context: context.into(),
            source,
        }
    }

    /// Create a report error with context
    pub fn report(context: impl Into<String>, source: ReportErrorKind) -> Self {
        Self::Report {
            context: context.into(),
            source,
        }
    }

    /// Create a store error with context
    pub fn store(context: impl Into<String>, source: StoreErrorKind) -> Self {
        Self::Store {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<std::io::Error> for CompareError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for CompareError {
    fn from(err: serde_json::Error) -> Self {
        Self::load(
            "JSON deserialization",
            LoadErrorKind::InvalidJson(err.to_string()),
        )
    }
}
