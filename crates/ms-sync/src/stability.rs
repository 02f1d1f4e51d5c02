//! Write-completion detection by size polling.
//!
//! This module provides the [`StabilityDetector`], which decides when a
//! newly created file has finished being written. There is no explicit
//! completion signal from the upstream downloader, so an unchanged size
//! across two consecutive samples one poll interval apart is used as a
//! portable proxy for "download complete".
//!
//! # Blocking Behavior
//!
//! [`wait_until_stable`](StabilityDetector::wait_until_stable) suspends
//! between samples for as long as the file keeps growing; there is no upper
//! bound on the wait. An arbitrarily slow download simply delays mirroring.
//! The wait runs on a pool worker, never on the event thread, so one slow
//! file occupies one pool slot and nothing else.
//!
//! # Size Queries
//!
//! Sampling goes through the [`SizeProbe`] seam. Production uses
//! [`FsProbe`] (a plain metadata stat); tests script the size sequence to
//! drive the sampling logic deterministically.

use std::time::Duration;

use camino::Utf8Path;

use crate::error::SyncError;

/// A source of file-size observations.
///
/// The single seam between the stabilization loop and the filesystem. A
/// size query failing with `NotFound` means the file vanished mid-poll,
/// which callers treat as abandonment of the mirroring attempt, not a
/// crash.
pub trait SizeProbe: Send + Sync + 'static {
    /// Returns the current size in bytes of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be inspected.
    fn size(&self, path: &Utf8Path) -> std::io::Result<u64>;
}

/// The production probe: one metadata stat per sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl SizeProbe for FsProbe {
    fn size(&self, path: &Utf8Path) -> std::io::Result<u64> {
        std::fs::metadata(path.as_std_path()).map(|m| m.len())
    }
}

/// Detects when a file has stopped changing size.
///
/// A file counts as stable once two consecutive samples, taken one poll
/// interval apart, observe the same byte size. The very first sample never
/// satisfies this, so the minimum is two samples with one sleep between
/// them.
///
/// # Examples
///
/// ```no_run
/// use ms_sync::StabilityDetector;
/// use camino::Utf8Path;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), ms_sync::SyncError> {
/// let detector = StabilityDetector::new(Duration::from_secs(1));
/// let final_size = detector
///     .wait_until_stable(Utf8Path::new("/m/Author/Series/vol1.cbz"))
///     .await?;
/// # let _ = final_size;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct StabilityDetector<P = FsProbe> {
    /// The size-observation source.
    probe: P,

    /// Time between consecutive size samples.
    interval: Duration,
}

impl StabilityDetector<FsProbe> {
    /// Creates a detector sampling real file sizes at the given interval.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self::with_probe(interval, FsProbe)
    }
}

impl<P: SizeProbe> StabilityDetector<P> {
    /// Creates a detector with a custom size probe.
    #[must_use]
    pub fn with_probe(interval: Duration, probe: P) -> Self {
        Self { probe, interval }
    }

    /// Returns the configured poll interval.
    #[inline]
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Blocks (asynchronously) until the file's size is observed identical
    /// on two consecutive samples, returning the final size.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::SourceUnavailable`] if the file is deleted
    /// mid-poll and [`SyncError::Io`] for any other failing size query.
    /// Either way the stabilization attempt ends; the caller logs and
    /// abandons the event.
    pub async fn wait_until_stable(&self, path: &Utf8Path) -> Result<u64, SyncError> {
        let mut last_size: Option<u64> = None;

        loop {
            let size = self
                .probe
                .size(path)
                .map_err(|e| SyncError::from_source_io(e, path))?;

            if last_size == Some(size) {
                tracing::debug!(path = %path, size, "File size stabilized");
                return Ok(size);
            }

            last_size = Some(size);
            tokio::time::sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// A probe that replays a scripted sequence of size observations.
    struct ScriptedProbe {
        observations: Mutex<VecDeque<io::Result<u64>>>,
        samples_taken: AtomicUsize,
    }

    impl ScriptedProbe {
        fn new(observations: impl IntoIterator<Item = io::Result<u64>>) -> Self {
            Self {
                observations: Mutex::new(observations.into_iter().collect()),
                samples_taken: AtomicUsize::new(0),
            }
        }

        fn samples_taken(&self) -> usize {
            self.samples_taken.load(Ordering::Relaxed)
        }
    }

    impl SizeProbe for std::sync::Arc<ScriptedProbe> {
        fn size(&self, _path: &Utf8Path) -> io::Result<u64> {
            self.samples_taken.fetch_add(1, Ordering::Relaxed);
            self.observations
                .lock()
                .expect("probe mutex poisoned")
                .pop_front()
                .expect("probe script exhausted")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stable_after_two_identical_samples() {
        let probe = std::sync::Arc::new(ScriptedProbe::new([Ok(10), Ok(10)]));
        let detector =
            StabilityDetector::with_probe(Duration::from_secs(1), std::sync::Arc::clone(&probe));

        let size = detector
            .wait_until_stable(Utf8Path::new("/m/a/b/v.cbz"))
            .await
            .expect("stabilizes");

        assert_eq!(size, 10);
        assert_eq!(probe.samples_taken(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_growing_file_requires_extra_samples() {
        let probe = std::sync::Arc::new(ScriptedProbe::new([Ok(10), Ok(20), Ok(20)]));
        let detector =
            StabilityDetector::with_probe(Duration::from_secs(1), std::sync::Arc::clone(&probe));

        let size = detector
            .wait_until_stable(Utf8Path::new("/m/a/b/v.cbz"))
            .await
            .expect("stabilizes");

        assert_eq!(size, 20);
        assert_eq!(probe.samples_taken(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_vanished_file_aborts_with_source_unavailable() {
        let probe = std::sync::Arc::new(ScriptedProbe::new([
            Ok(10),
            Err(io::Error::new(io::ErrorKind::NotFound, "gone")),
        ]));
        let detector =
            StabilityDetector::with_probe(Duration::from_secs(1), std::sync::Arc::clone(&probe));

        let result = detector
            .wait_until_stable(Utf8Path::new("/m/a/b/v.cbz"))
            .await;

        match result {
            Err(SyncError::SourceUnavailable(path)) => {
                assert_eq!(path.as_str(), "/m/a/b/v.cbz");
            }
            other => panic!("expected SourceUnavailable, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_io_failures_surface_as_io() {
        let probe = std::sync::Arc::new(ScriptedProbe::new([Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "denied",
        ))]));
        let detector =
            StabilityDetector::with_probe(Duration::from_secs(1), std::sync::Arc::clone(&probe));

        let result = detector
            .wait_until_stable(Utf8Path::new("/m/a/b/v.cbz"))
            .await;

        assert!(matches!(result, Err(SyncError::Io(_))));
    }

    #[tokio::test]
    async fn test_fs_probe_on_real_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let file_path = dir.path().join("vol1.cbz");
        std::fs::write(&file_path, b"0123456789").expect("write file");

        let path = Utf8Path::from_path(&file_path).expect("utf8 path");
        let detector = StabilityDetector::new(Duration::from_millis(5));

        let size = detector
            .wait_until_stable(path)
            .await
            .expect("static file stabilizes");

        assert_eq!(size, 10);
    }

    #[tokio::test]
    async fn test_fs_probe_missing_file() {
        let detector = StabilityDetector::new(Duration::from_millis(5));

        let result = detector
            .wait_until_stable(Utf8Path::new("/no/such/file.cbz"))
            .await;

        assert!(matches!(result, Err(SyncError::SourceUnavailable(_))));
    }
}
