//! Error types for the ms-sync crate.
//!
//! This module provides the [`SyncError`] type for failures during
//! stabilization and mirror link maintenance.
//!
//! All of these errors are handled at the worker-task boundary: a failing
//! task logs and terminates without affecting the dispatcher, the pool, or
//! other in-flight tasks. None is fatal to the process, and no operation is
//! retried.

use camino::Utf8PathBuf;

/// Errors that can occur while stabilizing or mirroring a source file.
///
/// # Examples
///
/// ```
/// use ms_sync::SyncError;
/// use camino::Utf8PathBuf;
///
/// let err = SyncError::AlreadyExists(Utf8PathBuf::from("/d/Series vol1.cbz"));
/// assert!(err.to_string().contains("Series vol1.cbz"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The source file vanished before the operation completed.
    ///
    /// Typically the file was deleted while waiting for its size to
    /// stabilize, or between stabilization and linking. The mirroring
    /// attempt for this event is abandoned.
    #[error("source file vanished: {0}")]
    SourceUnavailable(Utf8PathBuf),

    /// A mirror with the computed name already exists in the target
    /// directory.
    ///
    /// Policy is abandon-on-collision: the existing mirror is left alone and
    /// no overwrite happens.
    #[error("mirror already exists: {0}")]
    AlreadyExists(Utf8PathBuf),

    /// A generic filesystem failure on stat, link, or remove.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Classifies an I/O error from a size query or link operation against
    /// `source`.
    ///
    /// A `NotFound` means the source vanished mid-operation; anything else
    /// stays a generic I/O failure.
    #[must_use]
    pub fn from_source_io(error: std::io::Error, source: &camino::Utf8Path) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            Self::SourceUnavailable(source.to_owned())
        } else {
            Self::Io(error)
        }
    }

    /// Returns the path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::SourceUnavailable(path) | Self::AlreadyExists(path) => Some(path),
            Self::Io(_) => None,
        }
    }
}
