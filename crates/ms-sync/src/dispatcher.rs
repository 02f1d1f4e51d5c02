//! Event filtering and worker-pool scheduling.
//!
//! This module provides the [`EventDispatcher`], which sits between the
//! watch event stream and the mirror operations. Each raw event moves
//! through a small state machine:
//!
//! ```text
//! Received → Filtered(dropped | accepted) → Scheduled → Completed(ok | failed)
//! ```
//!
//! Directory events are always dropped, as are paths rejected by the
//! configured [`FileFilter`]. Accepted creations are scheduled onto the
//! bounded pool to run stabilization followed by
//! [`materialize`](LinkSynchronizer::materialize); accepted deletions run
//! [`remove`](LinkSynchronizer::remove) directly, with no stabilization.
//!
//! # Concurrency
//!
//! Scheduling is immediate — `dispatch` never waits — so event-arrival
//! latency is decoupled from event-processing latency. Concurrency is
//! capped by a semaphore with one permit per configured worker: a slow
//! download keeps one permit for its whole stabilization wait and delays
//! nothing but other queued work beyond the cap. There is no cancellation;
//! once scheduled, a task runs to completion or failure (a stabilization
//! wait whose file disappears simply fails its next size query).
//!
//! All worker errors are absorbed at the task boundary: logged, counted in
//! [`SyncStats`], and never propagated to the dispatcher or other tasks.

use std::sync::Arc;
use std::time::Duration;

use camino::Utf8Path;
use tokio::sync::Semaphore;

use ms_core::PoolConfig;
use ms_watcher::{EventKind, FileFilter, SourceEvent};

use crate::error::SyncError;
use crate::linker::{LinkSynchronizer, MaterializeOutcome, RemoveOutcome};
use crate::stability::StabilityDetector;
use crate::stats::{StatsSnapshot, SyncStats};

/// Filters raw watch events and schedules mirror work onto a bounded pool.
///
/// The dispatcher is cheap to clone-share via its internal [`Arc`]s and is
/// the only place that decides whether an event is processed at all.
///
/// # Ordering
///
/// No ordering is guaranteed across distinct source files. For one and the
/// same path, creation processing includes a multi-second stabilization
/// wait while deletion processing does not, so a rapid create-then-delete
/// can leave an orphan mirror behind. That race is accepted and only
/// documented, not corrected.
///
/// # Examples
///
/// ```no_run
/// use ms_sync::{EventDispatcher, LinkSynchronizer};
/// use ms_watcher::ArchiveFilter;
/// use ms_core::PoolConfig;
///
/// let dispatcher = EventDispatcher::new(
///     LinkSynchronizer::new("/downloads"),
///     ArchiveFilter::default(),
///     &PoolConfig::default(),
/// );
/// # let _ = dispatcher;
/// ```
pub struct EventDispatcher {
    /// The sole writer of the target directory.
    linker: Arc<LinkSynchronizer>,

    /// Write-completion detection for creation events.
    detector: Arc<StabilityDetector>,

    /// Decides which file paths qualify for mirroring.
    filter: Arc<dyn FileFilter>,

    /// One permit per worker; caps concurrent in-flight tasks.
    permits: Arc<Semaphore>,

    /// Outcome counters shared with all worker tasks.
    stats: Arc<SyncStats>,
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("target_dir", &self.linker.target_dir())
            .field("available_permits", &self.permits.available_permits())
            .finish_non_exhaustive()
    }
}

impl EventDispatcher {
    /// Creates a dispatcher feeding the given synchronizer.
    ///
    /// The pool size and the stabilization poll interval come from
    /// [`PoolConfig`].
    #[must_use]
    pub fn new<F: FileFilter>(linker: LinkSynchronizer, filter: F, config: &PoolConfig) -> Self {
        let detector = StabilityDetector::new(Duration::from_millis(config.poll_interval_ms));

        Self {
            linker: Arc::new(linker),
            detector: Arc::new(detector),
            filter: Arc::new(filter),
            permits: Arc::new(Semaphore::new(config.workers)),
            stats: Arc::new(SyncStats::new()),
        }
    }

    /// Filters one raw event and, if accepted, schedules its processing.
    ///
    /// Returns `true` if the event was accepted and scheduled, `false` if
    /// it was dropped by filtering. Must be called from within a tokio
    /// runtime.
    pub fn dispatch(&self, event: SourceEvent) -> bool {
        if event.is_directory {
            tracing::trace!(path = %event.path, "Dropped directory event");
            return false;
        }

        if !self.filter.should_process(&event.path) {
            tracing::trace!(path = %event.path, "Filtered out file event");
            return false;
        }

        let linker = Arc::clone(&self.linker);
        let detector = Arc::clone(&self.detector);
        let permits = Arc::clone(&self.permits);
        let stats = Arc::clone(&self.stats);

        tracing::debug!(path = %event.path, kind = event.kind.label(), "Scheduled event");

        tokio::spawn(async move {
            // Queue behind the pool cap. Acquisition fails only if the
            // semaphore is closed, which the dispatcher never does.
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };

            match event.kind {
                EventKind::Created => {
                    process_creation(&linker, &detector, &stats, &event.path).await;
                }
                EventKind::Deleted => {
                    process_deletion(&linker, &stats, &event.path).await;
                }
            }
        });

        true
    }

    /// Returns a snapshot of the outcome counters.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

/// Runs the creation pipeline: stabilize, then materialize the mirror.
async fn process_creation(
    linker: &LinkSynchronizer,
    detector: &StabilityDetector,
    stats: &SyncStats,
    path: &Utf8Path,
) {
    if let Err(error) = detector.wait_until_stable(path).await {
        record_abandoned(stats, &error);
        tracing::warn!(path = %path, error = %error, "Abandoned mirroring during stabilization");
        return;
    }

    match linker.materialize(path).await {
        Ok(MaterializeOutcome::Linked(target)) => {
            stats.increment_linked();
            tracing::info!(source = %path, target = %target, "Mirror created");
        }
        Ok(MaterializeOutcome::NotQualified) => {
            stats.increment_not_qualified();
            tracing::trace!(path = %path, "Path too shallow to mirror");
        }
        Err(error) => {
            record_abandoned(stats, &error);
            tracing::warn!(path = %path, error = %error, "Abandoned mirroring");
        }
    }
}

/// Runs the deletion pipeline: tear the mirror down if it exists.
async fn process_deletion(linker: &LinkSynchronizer, stats: &SyncStats, path: &Utf8Path) {
    match linker.remove(path).await {
        Ok(RemoveOutcome::Removed(target)) => {
            stats.increment_removed();
            tracing::info!(source = %path, target = %target, "Mirror removed");
        }
        Ok(RemoveOutcome::NoMirror) => {
            tracing::debug!(path = %path, "No mirror to remove");
        }
        Ok(RemoveOutcome::NotQualified) => {
            stats.increment_not_qualified();
            tracing::trace!(path = %path, "Path too shallow to mirror");
        }
        Err(error) => {
            stats.increment_failures();
            tracing::warn!(path = %path, error = %error, "Abandoned mirror removal");
        }
    }
}

/// Maps an abandoning error onto its outcome counter.
fn record_abandoned(stats: &SyncStats, error: &SyncError) {
    match error {
        SyncError::AlreadyExists(_) => stats.increment_collisions(),
        SyncError::SourceUnavailable(_) => stats.increment_vanished(),
        SyncError::Io(_) => stats.increment_failures(),
    }
}
