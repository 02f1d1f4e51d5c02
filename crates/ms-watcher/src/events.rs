//! Event types for filesystem change notifications.
//!
//! This module provides [`SourceEvent`], the transient record of a single
//! create or delete operation observed under the watched source root. Events
//! are produced by the watch thread, consumed once by the dispatcher, and
//! never stored.

use camino::Utf8PathBuf;
use std::time::Instant;

/// The lifecycle operation a [`SourceEvent`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A new entry appeared under the source root.
    Created,
    /// An entry disappeared from the source root.
    Deleted,
}

impl EventKind {
    /// Returns a short human-readable label for this kind.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Deleted => "deleted",
        }
    }
}

/// A single filesystem change event with a UTF-8 path guarantee.
///
/// The pair of `kind` and `is_directory` is everything downstream processing
/// needs: directory events are dropped wholesale, creations are stabilized
/// before mirroring, deletions tear the mirror down immediately.
///
/// Note that for deletions `is_directory` is a best-effort flag derived from
/// the watch backend's notification, since the entry no longer exists to be
/// inspected.
///
/// # Examples
///
/// ```
/// use ms_watcher::{EventKind, SourceEvent};
/// use camino::Utf8PathBuf;
///
/// let event = SourceEvent::new(
///     Utf8PathBuf::from("/m/Author/Series/vol1.cbz"),
///     EventKind::Created,
///     false,
/// );
/// assert_eq!(event.extension(), Some("cbz"));
/// assert!(event.is_created());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEvent {
    /// Absolute path of the affected entry.
    pub path: Utf8PathBuf,

    /// Whether the entry was created or deleted.
    pub kind: EventKind,

    /// Whether the affected entry is (or was reported as) a directory.
    pub is_directory: bool,

    /// When this event was received from the watch backend.
    ///
    /// Uses [`Instant`] for monotonic timing, suitable for measuring
    /// elapsed time but not for wall-clock display.
    pub timestamp: Instant,
}

impl SourceEvent {
    /// Creates a new event for the given path, stamped with the current
    /// instant.
    #[inline]
    #[must_use]
    pub fn new(path: Utf8PathBuf, kind: EventKind, is_directory: bool) -> Self {
        Self {
            path,
            kind,
            is_directory,
            timestamp: Instant::now(),
        }
    }

    /// Creates a new event with a specific timestamp.
    ///
    /// Useful for testing or when reconstructing events.
    #[inline]
    #[must_use]
    pub const fn with_timestamp(
        path: Utf8PathBuf,
        kind: EventKind,
        is_directory: bool,
        timestamp: Instant,
    ) -> Self {
        Self {
            path,
            kind,
            is_directory,
            timestamp,
        }
    }

    /// Returns `true` for creation events.
    #[inline]
    #[must_use]
    pub const fn is_created(&self) -> bool {
        matches!(self.kind, EventKind::Created)
    }

    /// Returns `true` for deletion events.
    #[inline]
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        matches!(self.kind, EventKind::Deleted)
    }

    /// Returns the file extension, if any.
    #[inline]
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.path.extension()
    }

    /// Returns the file name without the directory path.
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name()
    }
}
