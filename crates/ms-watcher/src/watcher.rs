//! Filesystem watch with async event streaming.
//!
//! This module provides the [`FileWatcher`] type that bridges the
//! synchronous `notify` backend to the async tokio runtime and owns the
//! recursive watch registration for the source library tree.
//!
//! Raw backend notifications are reduced to create/delete [`SourceEvent`]s
//! in the watch thread; modification and metadata noise never reaches the
//! channel.
//!
//! # Usage
//!
//! ```no_run
//! use ms_watcher::FileWatcher;
//! use ms_core::WatchConfig;
//! use camino::Utf8Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ms_watcher::WatchError> {
//!     let config = WatchConfig::default();
//!     let mut watcher = FileWatcher::new(Utf8Path::new("/library"), &config)?;
//!
//!     while let Some(event) = watcher.recv().await {
//!         println!("{} {}", event.kind.label(), event.path);
//!     }
//!
//!     Ok(())
//! }
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use notify::event::{CreateKind, EventKind as NotifyEventKind, RemoveKind};
use notify::{RecursiveMode, Watcher};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use ms_core::WatchConfig;

use crate::error::WatchError;
use crate::events::{EventKind, SourceEvent};

/// A filesystem watcher that streams create/delete events to an async
/// context.
///
/// `FileWatcher` manages a background thread running the `notify` backend.
/// Create and remove notifications are converted to [`SourceEvent`]s and
/// sent through a bounded tokio mpsc channel for consumption in async code.
///
/// # Lifecycle
///
/// 1. **Creation**: [`new()`](Self::new) validates the root, canonicalizes
///    it, and spawns a blocking task with the notify watcher registered
///    recursively (per [`WatchConfig`]).
///
/// 2. **Event Reception**: [`recv()`](Self::recv) /
///    [`try_recv()`](Self::try_recv) yield events in arrival order.
///
/// 3. **Shutdown**: [`shutdown()`](Self::shutdown) signals the watch thread
///    and awaits it. Dropping the watcher sends the signal best-effort
///    without waiting.
///
/// # Thread Safety
///
/// The watcher can be used from any async task. The notify backend runs in
/// a dedicated blocking thread managed by tokio's blocking pool.
pub struct FileWatcher {
    /// Shutdown signal sender.
    ///
    /// Sending on this channel signals the blocking task to stop.
    /// Set to `None` after shutdown is initiated.
    shutdown_tx: Option<oneshot::Sender<()>>,

    /// Handle to the blocking watcher task.
    ///
    /// Used to await completion during shutdown.
    task_handle: Option<JoinHandle<Result<(), WatchError>>>,

    /// Event receiver for async consumption.
    event_rx: mpsc::Receiver<SourceEvent>,

    /// The canonicalized root being watched.
    watch_root: Utf8PathBuf,
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("watch_root", &self.watch_root)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl FileWatcher {
    /// Creates a new file watcher for the given source root.
    ///
    /// Must be called from within a tokio runtime: the blocking watch loop
    /// is spawned onto the runtime's blocking pool.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::RootNotFound`] if the root doesn't exist,
    /// [`WatchError::Io`] if it cannot be canonicalized, and
    /// [`WatchError::Notify`] if the backend fails to initialize. These are
    /// the unrecoverable startup failures; once `new` returns `Ok`, per-event
    /// problems are logged and skipped inside the watch thread.
    pub fn new(root: &Utf8Path, config: &WatchConfig) -> Result<Self, WatchError> {
        if !root.exists() {
            return Err(WatchError::root_not_found(root));
        }

        // Canonicalize so emitted event paths share a stable absolute prefix
        let watch_root = root.canonicalize_utf8().map_err(WatchError::Io)?;

        let (event_tx, event_rx) = mpsc::channel(config.channel_capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task_root = watch_root.clone();
        let recursive = config.recursive;

        let task_handle = tokio::task::spawn_blocking(move || {
            run_watcher_loop(task_root, recursive, event_tx, shutdown_rx)
        });

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            task_handle: Some(task_handle),
            event_rx,
            watch_root,
        })
    }

    /// Receives the next source event asynchronously.
    ///
    /// Returns `None` when the watcher has been shut down or the channel
    /// is closed.
    pub async fn recv(&mut self) -> Option<SourceEvent> {
        self.event_rx.recv().await
    }

    /// Tries to receive a source event without blocking.
    pub fn try_recv(&mut self) -> Result<SourceEvent, mpsc::error::TryRecvError> {
        self.event_rx.try_recv()
    }

    /// Returns a mutable reference to the event receiver.
    ///
    /// Useful for driving the receiver directly with `tokio::select!`.
    pub fn events(&mut self) -> &mut mpsc::Receiver<SourceEvent> {
        &mut self.event_rx
    }

    /// Returns the canonicalized root being watched.
    #[must_use]
    pub fn watch_root(&self) -> &Utf8Path {
        &self.watch_root
    }

    /// Returns `true` if the watcher is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some() && self.task_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Gracefully shuts down the watcher.
    ///
    /// Sends the shutdown signal to the watch thread and awaits its
    /// completion, surfacing any error it exited with.
    ///
    /// # Errors
    ///
    /// Returns an error if the watch thread panicked or failed during
    /// operation.
    pub async fn shutdown(mut self) -> Result<(), WatchError> {
        if let Some(tx) = self.shutdown_tx.take() {
            // Ignore error if receiver is already dropped
            let _ = tx.send(());
        }

        if let Some(handle) = self.task_handle.take() {
            match handle.await {
                Ok(result) => result?,
                Err(_join_error) => return Err(WatchError::ChannelClosed),
            }
        }

        Ok(())
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        // Send shutdown signal on drop
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        // Drop is sync, so the task is not awaited here; it stops when it
        // sees the signal.
    }
}

/// Runs the notify watcher loop in a blocking context.
///
/// Called from `spawn_blocking`. Registers the watch, forwards create and
/// remove notifications to the async channel, and blocks until the shutdown
/// signal arrives.
fn run_watcher_loop(
    root: Utf8PathBuf,
    recursive: bool,
    event_tx: mpsc::Sender<SourceEvent>,
    shutdown_rx: oneshot::Receiver<()>,
) -> Result<(), WatchError> {
    let tx = event_tx;
    let mut watcher =
        notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => forward_event(&tx, &event),
            Err(error) => tracing::warn!(error = %error, "Watch backend error"),
        })?;

    let mode = if recursive {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };

    watcher.watch(root.as_std_path(), mode)?;

    tracing::info!(root = %root, recursive, "File watcher started");

    // Block until shutdown signal is received
    let _ = shutdown_rx.blocking_recv();

    tracing::info!(root = %root, "File watcher stopped");

    Ok(())
}

/// Converts one backend notification into [`SourceEvent`]s on the channel.
///
/// Only create and remove notifications are forwarded. For removals the
/// directory flag comes from the backend's report alone, since the entry no
/// longer exists to be inspected.
fn forward_event(tx: &mpsc::Sender<SourceEvent>, event: &notify::Event) {
    let (kind, folder_hint) = match event.kind {
        NotifyEventKind::Create(CreateKind::Folder) => (EventKind::Created, Some(true)),
        NotifyEventKind::Create(CreateKind::File) => (EventKind::Created, Some(false)),
        NotifyEventKind::Create(_) => (EventKind::Created, None),
        NotifyEventKind::Remove(RemoveKind::Folder) => (EventKind::Deleted, Some(true)),
        NotifyEventKind::Remove(_) => (EventKind::Deleted, Some(false)),
        _ => return,
    };

    for path in &event.paths {
        let path = match Utf8PathBuf::try_from(path.clone()) {
            Ok(p) => p,
            Err(e) => {
                let invalid = e.into_path_buf();
                tracing::warn!(
                    path = %invalid.display(),
                    "Skipping non-UTF-8 path in file event"
                );
                continue;
            }
        };

        // Backends that report CreateKind::Any leave the entry type unknown;
        // the entry still exists for creations, so ask the filesystem.
        let is_directory = folder_hint.unwrap_or_else(|| path.is_dir());

        let source_event = SourceEvent::new(path, kind, is_directory);

        if tx.blocking_send(source_event).is_err() {
            tracing::debug!("Event channel closed, stopping event forwarding");
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn create_temp_dir() -> TempDir {
        TempDir::new().expect("Failed to create temp directory")
    }

    #[tokio::test]
    async fn test_watcher_creation() {
        let temp_dir = create_temp_dir();
        let root = Utf8Path::from_path(temp_dir.path()).expect("Invalid path");

        let watcher = FileWatcher::new(root, &WatchConfig::default());

        let watcher = watcher.expect("Watcher should be created");
        assert!(watcher.is_running());
    }

    #[tokio::test]
    async fn test_watcher_root_not_found() {
        let root = Utf8Path::new("/nonexistent/path/that/does/not/exist");

        let result = FileWatcher::new(root, &WatchConfig::default());

        match result {
            Err(WatchError::RootNotFound(_)) => {}
            other => panic!("Expected RootNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_watcher_shutdown() {
        let temp_dir = create_temp_dir();
        let root = Utf8Path::from_path(temp_dir.path()).expect("Invalid path");

        let watcher =
            FileWatcher::new(root, &WatchConfig::default()).expect("Failed to create watcher");

        let result = watcher.shutdown().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_watcher_receives_creation_events() {
        let temp_dir = create_temp_dir();
        let root = Utf8Path::from_path(temp_dir.path()).expect("Invalid path");

        let mut watcher =
            FileWatcher::new(root, &WatchConfig::default()).expect("Failed to create watcher");

        // Create a file to trigger an event
        let file_path = temp_dir.path().join("vol1.cbz");
        fs::write(&file_path, "data").expect("Failed to write file");

        // Wait for the event with timeout
        let event = tokio::time::timeout(Duration::from_secs(2), watcher.recv()).await;

        watcher.shutdown().await.expect("Shutdown failed");

        // Event delivery is timing-dependent; only assert when one arrived
        if let Ok(Some(event)) = event {
            assert!(event.path.as_str().contains("vol1.cbz"));
            assert!(event.is_created());
        }
    }

    #[tokio::test]
    async fn test_watcher_watch_root_is_canonical() {
        let temp_dir = create_temp_dir();
        let root = Utf8Path::from_path(temp_dir.path()).expect("Invalid path");

        let watcher =
            FileWatcher::new(root, &WatchConfig::default()).expect("Failed to create watcher");

        assert!(!watcher.watch_root().as_str().is_empty());
        assert!(watcher.watch_root().is_absolute());
    }

    #[tokio::test]
    async fn test_watcher_honors_channel_capacity() {
        let temp_dir = create_temp_dir();
        let root = Utf8Path::from_path(temp_dir.path()).expect("Invalid path");

        let config = WatchConfig {
            channel_capacity: 10,
            ..WatchConfig::default()
        };

        let watcher = FileWatcher::new(root, &config).expect("Failed to create watcher");
        assert!(watcher.is_running());
    }
}
