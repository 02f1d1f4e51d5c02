//! Hard-link mirror maintenance.
//!
//! This module provides the [`LinkSynchronizer`], the sole writer of the
//! target directory. It creates a hard-linked mirror when a qualifying
//! source file finishes downloading and removes the mirror when the source
//! is deleted.
//!
//! Both operations derive the target file identity through
//! [`MirrorName::from_source`], so creation and deletion always agree on
//! which mirror a source path owns.
//!
//! # Hard Links
//!
//! A mirror shares the source file's storage extents; no data is copied,
//! and deleting either name leaves the other intact. This requires the
//! target directory to live on the same filesystem volume as the source
//! tree.

use camino::{Utf8Path, Utf8PathBuf};

use ms_core::MirrorName;

use crate::error::SyncError;

/// The result of a [`materialize`](LinkSynchronizer::materialize) call that
/// did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterializeOutcome {
    /// A mirror link was created at the contained target path.
    Linked(Utf8PathBuf),

    /// The source path is too shallow to be a series file; nothing was done.
    NotQualified,
}

/// The result of a [`remove`](LinkSynchronizer::remove) call that did not
/// fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The mirror at the contained target path was deleted.
    Removed(Utf8PathBuf),

    /// No mirror with the computed name existed; nothing was done.
    ///
    /// This makes removal idempotent: deleting a file with no mirror is not
    /// an error.
    NoMirror,

    /// The source path is too shallow to be a series file; nothing was done.
    NotQualified,
}

/// Creates and removes hard-linked mirrors in the flat target directory.
///
/// The synchronizer holds no state beyond the target directory; target file
/// identity is recomputed from the source path on every operation. Since
/// operations for different mirror names never conflict and the filesystem
/// makes create/delete of a single name atomic, no locking is needed.
///
/// # Examples
///
/// ```no_run
/// use ms_sync::{LinkSynchronizer, MaterializeOutcome};
/// use camino::Utf8Path;
///
/// # async fn example() -> Result<(), ms_sync::SyncError> {
/// let linker = LinkSynchronizer::new("/downloads");
///
/// match linker.materialize(Utf8Path::new("/m/Author/Series/vol1.cbz")).await? {
///     MaterializeOutcome::Linked(target) => println!("mirrored to {target}"),
///     MaterializeOutcome::NotQualified => {}
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LinkSynchronizer {
    /// The flat directory receiving mirror links.
    target_dir: Utf8PathBuf,
}

impl LinkSynchronizer {
    /// Creates a synchronizer writing mirrors into `target_dir`.
    #[must_use]
    pub fn new(target_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
        }
    }

    /// Returns the target directory.
    #[must_use]
    pub fn target_dir(&self) -> &Utf8Path {
        &self.target_dir
    }

    /// Creates the hard-linked mirror for a source file.
    ///
    /// Computes the mirror name from the source path; unqualified paths
    /// (fewer than four segments) are a no-op. Otherwise a hard link is
    /// created at `target_dir/mirror_name` pointing at the source.
    ///
    /// # Errors
    ///
    /// - [`SyncError::AlreadyExists`] if a mirror of that exact name is
    ///   already present. The existing mirror is left untouched.
    /// - [`SyncError::SourceUnavailable`] if the source vanished before
    ///   linking.
    /// - [`SyncError::Io`] for any other filesystem failure.
    pub async fn materialize(&self, source: &Utf8Path) -> Result<MaterializeOutcome, SyncError> {
        let Some(name) = MirrorName::from_source(source) else {
            return Ok(MaterializeOutcome::NotQualified);
        };

        let target = name.target_path(&self.target_dir);

        match tokio::fs::hard_link(source, &target).await {
            Ok(()) => Ok(MaterializeOutcome::Linked(target)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(SyncError::AlreadyExists(target))
            }
            Err(e) => Err(SyncError::from_source_io(e, source)),
        }
    }

    /// Removes the mirror corresponding to a deleted source file.
    ///
    /// Computes the mirror name with the same mapping as
    /// [`materialize`](Self::materialize); unqualified paths are a no-op,
    /// and an absent mirror is a no-op as well ([`RemoveOutcome::NoMirror`]).
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Io`] if deletion fails for a reason other than
    /// the mirror not existing.
    pub async fn remove(&self, source: &Utf8Path) -> Result<RemoveOutcome, SyncError> {
        let Some(name) = MirrorName::from_source(source) else {
            return Ok(RemoveOutcome::NotQualified);
        };

        let target = name.target_path(&self.target_dir);

        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(RemoveOutcome::Removed(target)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RemoveOutcome::NoMirror),
            Err(e) => Err(SyncError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        source_root: Utf8PathBuf,
        target_dir: Utf8PathBuf,
    }

    // Builds source tree `<tmp>/library/Author/Series/` and a flat target
    // directory on the same filesystem so hard links work.
    fn fixture() -> Fixture {
        let tmp = TempDir::new().expect("temp dir");
        let root = Utf8Path::from_path(tmp.path()).expect("utf8 path").to_owned();

        let source_root = root.join("library");
        let target_dir = root.join("downloads");
        fs::create_dir_all(source_root.join("Author/Series").as_std_path()).expect("source tree");
        fs::create_dir(target_dir.as_std_path()).expect("target dir");

        Fixture {
            _tmp: tmp,
            source_root,
            target_dir,
        }
    }

    fn write_source(fx: &Fixture, rel: &str, contents: &[u8]) -> Utf8PathBuf {
        let path = fx.source_root.join(rel);
        fs::write(path.as_std_path(), contents).expect("write source file");
        path
    }

    #[tokio::test]
    async fn test_materialize_creates_hard_link() {
        let fx = fixture();
        let source = write_source(&fx, "Author/Series/vol1.cbz", b"archive-bytes");
        let linker = LinkSynchronizer::new(fx.target_dir.clone());

        let outcome = linker.materialize(&source).await.expect("materialize");

        let expected = fx.target_dir.join("Series vol1.cbz");
        assert_eq!(outcome, MaterializeOutcome::Linked(expected.clone()));
        assert_eq!(
            fs::read(expected.as_std_path()).expect("mirror readable"),
            b"archive-bytes"
        );
    }

    #[tokio::test]
    async fn test_materialize_collision_is_abandoned() {
        let fx = fixture();
        let source = write_source(&fx, "Author/Series/vol1.cbz", b"new");
        fs::write(
            fx.target_dir.join("Series vol1.cbz").as_std_path(),
            b"existing",
        )
        .expect("pre-existing mirror");

        let linker = LinkSynchronizer::new(fx.target_dir.clone());
        let result = linker.materialize(&source).await;

        assert!(matches!(result, Err(SyncError::AlreadyExists(_))));
        // No overwrite: the pre-existing mirror is untouched
        assert_eq!(
            fs::read(fx.target_dir.join("Series vol1.cbz").as_std_path()).expect("mirror"),
            b"existing"
        );
    }

    #[tokio::test]
    async fn test_materialize_vanished_source() {
        let fx = fixture();
        let source = fx.source_root.join("Author/Series/never-written.cbz");

        let linker = LinkSynchronizer::new(fx.target_dir.clone());
        let result = linker.materialize(&source).await;

        assert!(matches!(result, Err(SyncError::SourceUnavailable(_))));
    }

    #[tokio::test]
    async fn test_materialize_shallow_path_is_noop() {
        let fx = fixture();
        let linker = LinkSynchronizer::new(fx.target_dir.clone());

        let outcome = linker
            .materialize(Utf8Path::new("/shallow.cbz"))
            .await
            .expect("no-op");

        assert_eq!(outcome, MaterializeOutcome::NotQualified);
        assert_eq!(
            fs::read_dir(fx.target_dir.as_std_path())
                .expect("target dir")
                .count(),
            0
        );
    }

    #[tokio::test]
    async fn test_remove_deletes_mirror_and_is_idempotent() {
        let fx = fixture();
        let source = write_source(&fx, "Author/Series/vol1.cbz", b"archive");
        let linker = LinkSynchronizer::new(fx.target_dir.clone());

        linker.materialize(&source).await.expect("materialize");
        fs::remove_file(source.as_std_path()).expect("delete source");

        let outcome = linker.remove(&source).await.expect("remove");
        assert_eq!(
            outcome,
            RemoveOutcome::Removed(fx.target_dir.join("Series vol1.cbz"))
        );

        // Second removal finds nothing and is not an error
        let outcome = linker.remove(&source).await.expect("second remove");
        assert_eq!(outcome, RemoveOutcome::NoMirror);
    }

    #[tokio::test]
    async fn test_remove_shallow_path_is_noop() {
        let fx = fixture();
        let linker = LinkSynchronizer::new(fx.target_dir.clone());

        let outcome = linker
            .remove(Utf8Path::new("/shallow.cbz"))
            .await
            .expect("no-op");

        assert_eq!(outcome, RemoveOutcome::NotQualified);
    }

    #[tokio::test]
    async fn test_create_and_delete_agree_on_mirror_identity() {
        let fx = fixture();
        let source = write_source(&fx, "Author/Series/chapter 7.cbz", b"data");
        let linker = LinkSynchronizer::new(fx.target_dir.clone());

        let linked = match linker.materialize(&source).await.expect("materialize") {
            MaterializeOutcome::Linked(target) => target,
            MaterializeOutcome::NotQualified => panic!("path should qualify"),
        };

        let removed = match linker.remove(&source).await.expect("remove") {
            RemoveOutcome::Removed(target) => target,
            other => panic!("expected Removed, got {other:?}"),
        };

        assert_eq!(linked, removed);
    }

    #[tokio::test]
    async fn test_deleting_source_keeps_mirror_contents() {
        // Hard link semantics: the mirror stays readable after the source
        // name is unlinked.
        let fx = fixture();
        let source = write_source(&fx, "Author/Series/vol2.cbz", b"kept-bytes");
        let linker = LinkSynchronizer::new(fx.target_dir.clone());

        linker.materialize(&source).await.expect("materialize");
        fs::remove_file(source.as_std_path()).expect("delete source");

        assert_eq!(
            fs::read(fx.target_dir.join("Series vol2.cbz").as_std_path()).expect("mirror"),
            b"kept-bytes"
        );
    }
}
