//! Error types for the ms-watcher crate.
//!
//! This module provides the [`WatchError`] type for errors that can occur
//! while establishing or operating the filesystem watch.

use camino::Utf8PathBuf;

/// Errors that can occur during file watching operations.
///
/// Failure to establish the initial watch is the only error fatal to the
/// process; everything that happens per-event is recoverable (logged and
/// skipped) so one bad path never takes the watch down.
///
/// # Error Recovery Strategy
///
/// - **Notify errors** ([`WatchError::Notify`]): Fatal - the backend could
///   not be initialized or the registration failed
/// - **Root not found** ([`WatchError::RootNotFound`]): Fatal - the source
///   root must exist before watching starts
/// - **Channel closed** ([`WatchError::ChannelClosed`]): Fatal -
///   communication with the watch thread broke down
/// - **Non-UTF-8 path** ([`WatchError::NonUtf8Path`]): Recoverable - the
///   offending event is logged and skipped
/// - **I/O errors** ([`WatchError::Io`]): Fatal - root canonicalization or
///   validation failed
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Failed to initialize or operate the notify watcher.
    #[error("notify watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// The source root to watch does not exist.
    #[error("watch root does not exist: {0}")]
    RootNotFound(Utf8PathBuf),

    /// The event channel was closed unexpectedly.
    ///
    /// Indicates the watch thread went away while the consumer was still
    /// expecting events, or panicked during shutdown.
    #[error("event channel closed unexpectedly")]
    ChannelClosed,

    /// A path reported by the watch backend is not valid UTF-8.
    ///
    /// Paths are handled as UTF-8 throughout; events carrying non-UTF-8
    /// paths are logged and skipped.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// An I/O error occurred while validating the watch root.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatchError {
    /// Creates a new [`WatchError::RootNotFound`] error.
    #[inline]
    pub fn root_not_found(path: impl Into<Utf8PathBuf>) -> Self {
        Self::RootNotFound(path.into())
    }

    /// Returns `true` if this error is recoverable (watching can continue).
    ///
    /// Only non-UTF-8 path errors are recoverable; they affect a single
    /// event, not the watch itself.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::NonUtf8Path(_))
    }

    /// Returns `true` if this error is fatal (watching should stop).
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }
}
