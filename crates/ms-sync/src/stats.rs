//! Sync statistics with atomic counters.
//!
//! This module provides [`SyncStats`] for tracking what the worker pool did
//! and [`StatsSnapshot`] for point-in-time views, logged at shutdown.
//!
//! # Thread Safety
//!
//! All counters use [`AtomicU64`] with
//! [`Relaxed`](std::sync::atomic::Ordering::Relaxed) ordering. Statistics
//! are informational and don't require strict ordering guarantees.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Atomic counters for mirror-sync outcomes.
///
/// Shared between the dispatcher's worker tasks; increment during
/// processing and take snapshots with [`snapshot()`](Self::snapshot) for
/// display or logging.
///
/// # Examples
///
/// ```
/// use ms_sync::SyncStats;
///
/// let stats = SyncStats::new();
/// stats.increment_linked();
///
/// let snap = stats.snapshot();
/// assert_eq!(snap.linked, 1);
/// ```
#[derive(Debug, Default)]
pub struct SyncStats {
    /// Mirrors created.
    linked: AtomicU64,
    /// Mirrors removed.
    removed: AtomicU64,
    /// Events skipped because the path was too shallow to qualify.
    not_qualified: AtomicU64,
    /// Creations abandoned because the mirror name already existed.
    collisions: AtomicU64,
    /// Creations abandoned because the source vanished mid-processing.
    vanished: AtomicU64,
    /// Tasks abandoned on any other filesystem failure.
    failures: AtomicU64,
}

impl SyncStats {
    /// Creates a new [`SyncStats`] with all counters at zero.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the mirrors-created counter.
    #[inline]
    pub fn increment_linked(&self) {
        self.linked.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the mirrors-removed counter.
    #[inline]
    pub fn increment_removed(&self) {
        self.removed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the unqualified-path counter.
    #[inline]
    pub fn increment_not_qualified(&self) {
        self.not_qualified.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the name-collision counter.
    #[inline]
    pub fn increment_collisions(&self) {
        self.collisions.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the vanished-source counter.
    #[inline]
    pub fn increment_vanished(&self) {
        self.vanished.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the generic-failure counter.
    #[inline]
    pub fn increment_failures(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time snapshot of all counters.
    ///
    /// Values are read at approximately the same time; due to relaxed
    /// ordering the snapshot may not reflect a perfectly consistent state.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            linked: self.linked.load(Ordering::Relaxed),
            removed: self.removed.load(Ordering::Relaxed),
            not_qualified: self.not_qualified.load(Ordering::Relaxed),
            collisions: self.collisions.load(Ordering::Relaxed),
            vanished: self.vanished.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of sync statistics.
///
/// Contains copied values from [`SyncStats`]; safe to store, serialize, and
/// send between threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Mirrors created.
    pub linked: u64,
    /// Mirrors removed.
    pub removed: u64,
    /// Events skipped because the path was too shallow to qualify.
    pub not_qualified: u64,
    /// Creations abandoned because the mirror name already existed.
    pub collisions: u64,
    /// Creations abandoned because the source vanished mid-processing.
    pub vanished: u64,
    /// Tasks abandoned on any other filesystem failure.
    pub failures: u64,
}

impl StatsSnapshot {
    /// Returns the total number of tasks abandoned without mutating the
    /// target directory.
    #[must_use]
    pub const fn abandoned(&self) -> u64 {
        self.collisions + self.vanished + self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_start_at_zero() {
        let snap = SyncStats::new().snapshot();
        assert_eq!(snap, StatsSnapshot::default());
    }

    #[test]
    fn test_stats_increments() {
        let stats = SyncStats::new();
        stats.increment_linked();
        stats.increment_linked();
        stats.increment_removed();
        stats.increment_collisions();

        let snap = stats.snapshot();
        assert_eq!(snap.linked, 2);
        assert_eq!(snap.removed, 1);
        assert_eq!(snap.collisions, 1);
        assert_eq!(snap.failures, 0);
    }

    #[test]
    fn test_snapshot_abandoned() {
        let stats = SyncStats::new();
        stats.increment_collisions();
        stats.increment_vanished();
        stats.increment_failures();
        stats.increment_linked();

        assert_eq!(stats.snapshot().abandoned(), 3);
    }

    #[test]
    fn test_snapshot_serialization_round_trip() {
        let stats = SyncStats::new();
        stats.increment_linked();
        stats.increment_not_qualified();

        let snap = stats.snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let parsed: StatsSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snap, parsed);
    }
}
