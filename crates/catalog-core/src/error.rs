//! Error types for catalog loading, patching, and export.

use std::path::PathBuf;

/// Errors surfaced by catalog I/O and the codec boundary.
///
/// An unresolvable dependency is not represented here: the resolver returns
/// `None` and callers skip the location.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("not a valid catalog file")]
    UnrecognizedFormat,
    #[error("mode not supported: {0} (expected search, patch, or extract)")]
    UnsupportedMode(String),
    #[error("only {expected} are supported for drag&drop, got {name}")]
    UnsupportedDropTarget { name: String, expected: String },
    #[error("UnityFS archive catalogs need an archive-capable codec")]
    ArchiveUnsupported,
    #[error("catalog version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: String, found: String },
    #[error("location id {id} out of range (catalog has {len} locations)")]
    DanglingLocation { id: usize, len: usize },
    #[error("catalog JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("packed catalog codec error: {0}")]
    Packed(#[source] std::io::Error),
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
