//! Recursive filesystem watch with async create/delete event streaming.
//!
//! This crate owns the watch registration for the source library tree and
//! bridges the synchronous `notify` backend to an async tokio context. It
//! emits a raw stream of [`SourceEvent`]s — file and directory creations and
//! deletions — which the sync layer filters and schedules for processing.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │               Blocking Thread (spawn_blocking)             │
//! │  ┌────────────────────┐      ┌──────────────────────────┐  │
//! │  │ RecommendedWatcher │ ───► │ Callback                 │  │
//! │  │ (notify, recursive)│      │ (create/remove → events) │  │
//! │  └────────────────────┘      └────────────┬─────────────┘  │
//! └───────────────────────────────────────────│────────────────┘
//!                                blocking_send│
//!                                             ▼
//! ┌────────────────────────────────────────────────────────────┐
//! │                    Async Runtime (tokio)                   │
//! │  ┌────────────────────┐      ┌────────────────┐            │
//! │  │ FileWatcher        │      │ mpsc::Receiver │ ─► run loop│
//! │  │ (shutdown ctrl)    │      │ (SourceEvent)  │            │
//! │  └────────────────────┘      └────────────────┘            │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unlike a debouncing watcher, the event kind matters here: creations go
//! through size stabilization before mirroring while deletions are processed
//! immediately, so create and remove notifications are kept distinct and
//! everything else (modifications, metadata changes) is dropped at the
//! source.
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
//!         println!("{:?}: {}", event.kind, event.path);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Filtering
//!
//! The [`FileFilter`] trait and its implementations live here so the watch
//! and sync layers share one filtering vocabulary, but the authoritative
//! filter (directories dropped, only qualifying archive extensions kept) is
//! applied by the event dispatcher in `ms-sync`, not at the watch source:
//! the dispatcher owns the accepted/dropped decision for every event.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod filter;
pub mod watcher;

// Re-export error types
pub use error::WatchError;

// Re-export event types
pub use events::{EventKind, SourceEvent};

// Re-export filter types
pub use filter::{AcceptAllFilter, ArchiveFilter, CompositeFilter, FileFilter};

// Re-export watcher types
pub use watcher::FileWatcher;
