//! Path filtering for watch events.
//!
//! This module provides the [`FileFilter`] trait and the implementations
//! used to decide which source paths qualify for mirroring. The trait lives
//! here so the watch and sync layers share one filtering vocabulary; the
//! event dispatcher applies the configured filter to every event it
//! receives.
//!
//! # Examples
//!
//! ```
//! use ms_watcher::{ArchiveFilter, FileFilter};
//! use camino::Utf8Path;
//!
//! let filter = ArchiveFilter::default();
//!
//! // Comic archives pass
//! assert!(filter.should_process(Utf8Path::new("/m/Series/vol1.cbz")));
//!
//! // Everything else is filtered
//! assert!(!filter.should_process(Utf8Path::new("/m/Series/vol1.part")));
//! assert!(!filter.should_process(Utf8Path::new("/m/Series/cover.jpg")));
//! ```

use camino::Utf8Path;
use smallvec::SmallVec;

/// A predicate deciding which file paths qualify for processing.
///
/// Implementations are called for each file event the dispatcher receives;
/// events that return `false` from [`should_process`] are dropped before any
/// work is scheduled.
///
/// # Thread Safety
///
/// Filters must be [`Send`] and [`Sync`] plus `'static` because they are
/// shared with spawned worker tasks.
///
/// [`should_process`]: FileFilter::should_process
pub trait FileFilter: Send + Sync + 'static {
    /// Returns `true` if the file at the given path should be processed.
    fn should_process(&self, path: &Utf8Path) -> bool;
}

/// A filter that accepts all files.
///
/// Useful in tests and when every event should reach the dispatcher
/// unfiltered.
///
/// # Examples
///
/// ```
/// use ms_watcher::{AcceptAllFilter, FileFilter};
/// use camino::Utf8Path;
///
/// let filter = AcceptAllFilter;
/// assert!(filter.should_process(Utf8Path::new("anything.txt")));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllFilter;

impl FileFilter for AcceptAllFilter {
    #[inline]
    fn should_process(&self, _path: &Utf8Path) -> bool {
        true
    }
}

/// A filter for comic archive files.
///
/// This is the primary filter of the daemon: only completed comic archives
/// are mirrored, and everything else a downloader writes alongside them
/// (covers, metadata, partial files) is ignored.
///
/// # Configuration
///
/// By default only `.cbz` files are accepted. Additional archive extensions
/// can be added with [`with_extension`](Self::with_extension), or the whole
/// set replaced via [`from_extensions`](Self::from_extensions) (which is how
/// the configured extension list reaches the dispatcher).
///
/// # Examples
///
/// ```
/// use ms_watcher::{ArchiveFilter, FileFilter};
/// use camino::Utf8Path;
///
/// let filter = ArchiveFilter::default();
/// assert!(filter.should_process(Utf8Path::new("/m/s/vol1.cbz")));
/// assert!(!filter.should_process(Utf8Path::new("/m/s/vol1.cbr")));
///
/// let wider = ArchiveFilter::default().with_extension("cbr");
/// assert!(wider.should_process(Utf8Path::new("/m/s/vol1.cbr")));
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveFilter {
    /// Accepted file extensions (without the leading dot).
    extensions: SmallVec<[String; 4]>,
}

impl ArchiveFilter {
    /// Creates a new archive filter accepting only `.cbz` files.
    #[must_use]
    pub fn new() -> Self {
        Self {
            extensions: SmallVec::from_iter(["cbz".to_owned()]),
        }
    }

    /// Creates a filter from an arbitrary set of extensions.
    ///
    /// Extensions are matched without the leading dot. An empty set accepts
    /// nothing.
    #[must_use]
    pub fn from_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    /// Adds an additional extension to accept.
    #[must_use]
    pub fn with_extension(mut self, ext: impl Into<String>) -> Self {
        let ext = ext.into();
        if !self.extensions.contains(&ext) {
            self.extensions.push(ext);
        }
        self
    }

    /// Returns the accepted extensions.
    #[must_use]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}

impl Default for ArchiveFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl FileFilter for ArchiveFilter {
    fn should_process(&self, path: &Utf8Path) -> bool {
        path.extension()
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }
}

/// A composite filter that combines multiple filters with AND logic.
///
/// All filters must return `true` for the file to be processed. An empty
/// composite accepts everything.
///
/// # Examples
///
/// ```
/// use ms_watcher::{ArchiveFilter, CompositeFilter, FileFilter};
/// use camino::Utf8Path;
///
/// // Custom filter that ignores a downloader's temp directory
/// struct NoTmp;
/// impl FileFilter for NoTmp {
///     fn should_process(&self, path: &Utf8Path) -> bool {
///         !path.as_str().contains("/.tmp/")
///     }
/// }
///
/// let filter = CompositeFilter::new()
///     .and(ArchiveFilter::default())
///     .and(NoTmp);
///
/// assert!(filter.should_process(Utf8Path::new("/m/s/vol1.cbz")));
/// assert!(!filter.should_process(Utf8Path::new("/m/.tmp/s/vol1.cbz")));
/// ```
pub struct CompositeFilter {
    filters: Vec<Box<dyn FileFilter>>,
}

impl CompositeFilter {
    /// Creates a new empty composite filter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Adds a filter to the composite.
    #[must_use]
    pub fn and<F: FileFilter>(mut self, filter: F) -> Self {
        self.filters.push(Box::new(filter));
        self
    }
}

impl Default for CompositeFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl FileFilter for CompositeFilter {
    fn should_process(&self, path: &Utf8Path) -> bool {
        self.filters.is_empty() || self.filters.iter().all(|f| f.should_process(path))
    }
}

// Implement FileFilter for boxed filters
impl<F: FileFilter + ?Sized> FileFilter for Box<F> {
    fn should_process(&self, path: &Utf8Path) -> bool {
        (**self).should_process(path)
    }
}

// Implement FileFilter for Arc-wrapped filters (useful for shared filters)
impl<F: FileFilter + ?Sized> FileFilter for std::sync::Arc<F> {
    fn should_process(&self, path: &Utf8Path) -> bool {
        (**self).should_process(path)
    }
}
