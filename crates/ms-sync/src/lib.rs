//! Stabilization, hard-link mirroring, and event dispatch for manga-shelf.
//!
//! This crate implements the file-lifecycle synchronizer: the logic that
//! turns raw create/delete events from `ms-watcher` into target-directory
//! mutations while keeping the two sides consistent under concurrent,
//! out-of-order filesystem events.
//!
//! # Components
//!
//! - [`StabilityDetector`] - waits until a newly created file has stopped
//!   growing (its size is unchanged across two consecutive samples) before
//!   it is considered fully written
//! - [`LinkSynchronizer`] - creates and removes the hard-linked mirrors in
//!   the flat target directory
//! - [`EventDispatcher`] - filters raw events and schedules the two
//!   pipelines onto a bounded worker pool
//! - [`SyncStats`] - atomic counters summarizing what the workers did
//!
//! # Event Pipelines
//!
//! ```text
//! Created  ─► filter ─► pool ─► wait_until_stable ─► materialize
//! Deleted  ─► filter ─► pool ─────────────────────► remove
//! ```
//!
//! There is no ordering guarantee across distinct source files. For the
//! same path, a rapid create-then-delete can race: the deletion's `remove`
//! may no-op before the creation finishes stabilizing and links a mirror
//! that is never cleaned up. This is an accepted limitation, not silently
//! corrected.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod dispatcher;
pub mod error;
pub mod linker;
pub mod stability;
pub mod stats;

// Re-export error types
pub use error::SyncError;

// Re-export synchronizer types
pub use linker::{LinkSynchronizer, MaterializeOutcome, RemoveOutcome};

// Re-export stability types
pub use stability::{FsProbe, SizeProbe, StabilityDetector};

// Re-export dispatcher types
pub use dispatcher::EventDispatcher;

// Re-export stats types
pub use stats::{StatsSnapshot, SyncStats};
