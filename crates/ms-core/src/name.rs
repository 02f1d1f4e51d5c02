//! Canonical mirror-name mapping.
//!
//! This module provides [`MirrorName`], the deterministic mapping from a
//! source file path to the flat file name used in the target directory.
//!
//! # Mapping Rule
//!
//! The mirror name is derived from the last two path segments only:
//!
//! ```text
//! /library/Author/Series/vol1.cbz
//!                 ──┬─── ───┬────
//!                 series   file name
//!
//! mirror name: "Series vol1.cbz"
//! ```
//!
//! The series segment (the immediate parent directory) acts as a namespace
//! prefix, so same-named volumes from different series do not collide in the
//! flat target directory.
//!
//! # Qualification
//!
//! Paths with fewer than [`MIN_QUALIFYING_SEGMENTS`] components do not map to
//! a mirror name at all: they sit too close to the library root to carry a
//! meaningful series directory. [`MirrorName::from_source`] returns `None`
//! for them, and both the creation and the deletion handling paths treat
//! that as a silent no-op.
//!
//! # Determinism
//!
//! Creation handling and deletion handling must agree on the target file
//! identity, so both go through this single implementation. For any source
//! path the mapping is a pure function of the path's last two segments,
//! stable across the file's lifetime.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};

/// Minimum number of path components for a file to qualify as a series file.
///
/// The count includes a root component for absolute paths, so
/// `/library/Series/vol1.cbz` has four components and qualifies, while
/// `/library/vol1.cbz` has three and is ignored.
pub const MIN_QUALIFYING_SEGMENTS: usize = 4;

/// The derived name of a mirror link in the target directory.
///
/// A `MirrorName` is computed from a source path's last two segments and is
/// the single source of truth for target file identity. Construct one with
/// [`from_source`](Self::from_source); it cannot be built from arbitrary
/// strings, which keeps the create and delete paths symmetric.
///
/// # Examples
///
/// ```
/// use ms_core::MirrorName;
/// use camino::Utf8Path;
///
/// let name = MirrorName::from_source(Utf8Path::new("/m/Author/Series/vol1.cbz"))
///     .expect("qualifying path");
///
/// assert_eq!(name.series(), "Series");
/// assert_eq!(name.file_name(), "vol1.cbz");
/// assert_eq!(name.to_string(), "Series vol1.cbz");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MirrorName {
    /// The series key: the name of the source file's parent directory.
    series: String,

    /// The source file's own name, including extension.
    file_name: String,
}

impl MirrorName {
    /// Derives the mirror name for a source file path.
    ///
    /// Returns `None` if the path has fewer than
    /// [`MIN_QUALIFYING_SEGMENTS`] components or lacks a file name or parent
    /// directory name. Callers treat `None` as "not a series file" and
    /// no-op.
    ///
    /// # Examples
    ///
    /// ```
    /// use ms_core::MirrorName;
    /// use camino::Utf8Path;
    ///
    /// // Deep enough: qualifies
    /// assert!(MirrorName::from_source(Utf8Path::new("/m/Author/Series/v1.cbz")).is_some());
    ///
    /// // Too shallow: ignored
    /// assert!(MirrorName::from_source(Utf8Path::new("/m/v1.cbz")).is_none());
    /// ```
    #[must_use]
    pub fn from_source(path: &Utf8Path) -> Option<Self> {
        if path.components().count() < MIN_QUALIFYING_SEGMENTS {
            return None;
        }

        let file_name = path.file_name()?;
        let series = path.parent()?.file_name()?;

        Some(Self {
            series: series.to_owned(),
            file_name: file_name.to_owned(),
        })
    }

    /// Returns the series key (the source file's parent directory name).
    #[inline]
    #[must_use]
    pub fn series(&self) -> &str {
        &self.series
    }

    /// Returns the source file's own name.
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Returns the combined mirror file name, `"{series} {file_name}"`.
    #[must_use]
    pub fn mirror_file_name(&self) -> String {
        format!("{} {}", self.series, self.file_name)
    }

    /// Returns the full path of the mirror link inside `target_dir`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ms_core::MirrorName;
    /// use camino::Utf8Path;
    ///
    /// let name = MirrorName::from_source(Utf8Path::new("/m/Author/Series/v1.cbz"))
    ///     .expect("qualifying path");
    ///
    /// assert_eq!(
    ///     name.target_path(Utf8Path::new("/d")),
    ///     Utf8Path::new("/d/Series v1.cbz"),
    /// );
    /// ```
    #[must_use]
    pub fn target_path(&self, target_dir: &Utf8Path) -> Utf8PathBuf {
        target_dir.join(self.mirror_file_name())
    }
}

impl fmt::Display for MirrorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.series, self.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_name_from_qualifying_path() {
        let name = MirrorName::from_source(Utf8Path::new("/m/Author/Series/vol1.cbz"))
            .expect("path qualifies");

        assert_eq!(name.series(), "Series");
        assert_eq!(name.file_name(), "vol1.cbz");
        assert_eq!(name.mirror_file_name(), "Series vol1.cbz");
    }

    #[test]
    fn test_mirror_name_minimum_depth() {
        // Exactly four components (root, library, series, file) qualifies.
        let name = MirrorName::from_source(Utf8Path::new("/m/Series/vol1.cbz"))
            .expect("four components qualify");
        assert_eq!(name.series(), "Series");
    }

    #[test]
    fn test_mirror_name_shallow_paths_do_not_qualify() {
        assert!(MirrorName::from_source(Utf8Path::new("/m/vol1.cbz")).is_none());
        assert!(MirrorName::from_source(Utf8Path::new("/vol1.cbz")).is_none());
        assert!(MirrorName::from_source(Utf8Path::new("vol1.cbz")).is_none());
    }

    #[test]
    fn test_mirror_name_relative_path_depth() {
        // Relative paths count plain segments only.
        assert!(MirrorName::from_source(Utf8Path::new("a/b/vol1.cbz")).is_none());

        let name = MirrorName::from_source(Utf8Path::new("a/b/c/vol1.cbz"))
            .expect("four segments qualify");
        assert_eq!(name.series(), "c");
    }

    #[test]
    fn test_mirror_name_is_deterministic() {
        let path = Utf8Path::new("/library/Author Name/Some Series/chapter 12.cbz");

        let first = MirrorName::from_source(path).expect("qualifies");
        let second = MirrorName::from_source(path).expect("qualifies");

        assert_eq!(first, second);
        assert_eq!(first.mirror_file_name(), "Some Series chapter 12.cbz");
    }

    #[test]
    fn test_mirror_name_display_matches_mirror_file_name() {
        let name = MirrorName::from_source(Utf8Path::new("/m/a/Series/v2.cbz"))
            .expect("qualifies");
        assert_eq!(name.to_string(), name.mirror_file_name());
    }

    #[test]
    fn test_target_path_joins_target_dir() {
        let name = MirrorName::from_source(Utf8Path::new("/m/Author/Series/vol1.cbz"))
            .expect("qualifies");

        assert_eq!(
            name.target_path(Utf8Path::new("/downloads")),
            Utf8PathBuf::from("/downloads/Series vol1.cbz"),
        );
    }

    #[test]
    fn test_mirror_name_spaces_preserved() {
        let name = MirrorName::from_source(Utf8Path::new("/m/x/My Series/vol 1.cbz"))
            .expect("qualifies");
        assert_eq!(name.mirror_file_name(), "My Series vol 1.cbz");
    }
}
