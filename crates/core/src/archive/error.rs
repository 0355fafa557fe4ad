//! Error types for the archive module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while packaging. Source documents are always left
/// in place when one of these is returned.
#[derive(Debug, Error)]
pub enum PackagingError {
    /// Destination folder could not be created or written.
    #[error("Archive destination is not writable: {path}")]
    DestinationUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document to bundle does not exist.
    #[error("Document to archive not found: {path}")]
    SourceMissing { path: PathBuf },

    /// Two documents would share an entry name.
    #[error("Duplicate archive entry: {name}")]
    DuplicateEntry { name: String },

    /// The zip writer failed.
    #[error("Failed to write archive {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// I/O error reading a source or the finished archive.
    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The reopened archive does not hold the expected entries.
    #[error("Archive verification failed for {path}: {reason}")]
    VerificationFailed { path: PathBuf, reason: String },

    /// The blocking packaging task panicked or was cancelled.
    #[error("Packaging task failed: {reason}")]
    TaskFailed { reason: String },
}

impl PackagingError {
    /// Creates a new I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a new zip write error for `path`.
    pub fn write(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}
