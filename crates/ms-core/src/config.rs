//! Configuration structures for the manga-shelf daemon.
//!
//! This module provides configuration types for all components of the
//! application:
//!
//! - [`MirrorConfig`] - The watched source root, the flat target directory,
//!   and the archive extensions to mirror
//! - [`WatchConfig`] - File watcher settings (recursion, channel capacity)
//! - [`PoolConfig`] - Worker pool settings (worker count, stabilization poll
//!   interval)
//! - [`Config`] - Root configuration combining all settings
//!
//! All configuration types implement [`Default`] with values suitable for a
//! typical download-then-mirror setup, and deserialize from JSON with
//! missing fields filled from those defaults.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for the mirror target and qualifying files.
///
/// # Examples
///
/// ```
/// use ms_core::MirrorConfig;
///
/// let config = MirrorConfig::default();
/// assert_eq!(config.extensions, vec!["cbz"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Root of the source library tree to watch recursively.
    pub source_root: Utf8PathBuf,

    /// Flat directory receiving the mirror links.
    ///
    /// Must be on the same filesystem volume as the source root, since
    /// mirrors are hard links.
    pub target_dir: Utf8PathBuf,

    /// File extensions that qualify for mirroring (without the leading dot).
    pub extensions: Vec<String>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            source_root: Utf8PathBuf::new(),
            target_dir: Utf8PathBuf::new(),
            extensions: vec!["cbz".to_owned()],
        }
    }
}

/// Configuration for the file watcher.
///
/// # Examples
///
/// ```
/// use ms_core::WatchConfig;
///
/// let config = WatchConfig::default();
/// assert!(config.recursive);
/// assert_eq!(config.channel_capacity, 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Whether to watch subdirectories recursively.
    ///
    /// Newly created subdirectories are picked up automatically while this
    /// is enabled.
    pub recursive: bool,

    /// Capacity of the event channel between the watch thread and the
    /// async consumer.
    ///
    /// Bounds memory growth if the consumer falls behind a burst of events.
    pub channel_capacity: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            channel_capacity: 100,
        }
    }
}

/// Configuration for the event-processing worker pool.
///
/// The pool size caps how many files can be tracked through stabilization at
/// once: each in-progress download occupies one worker slot for its entire
/// duration.
///
/// # Examples
///
/// ```
/// use ms_core::PoolConfig;
///
/// let config = PoolConfig::default();
/// assert_eq!(config.workers, 4);
/// assert_eq!(config.poll_interval_ms, 1000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of concurrent event-processing workers.
    pub workers: usize,

    /// Interval between file-size samples during stabilization, in
    /// milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            poll_interval_ms: 1000,
        }
    }
}

/// Root configuration for the manga-shelf daemon.
///
/// Combines all component configurations into a single structure that can be
/// loaded from a JSON file or constructed programmatically.
///
/// # Examples
///
/// ```
/// use ms_core::Config;
///
/// let config = Config::default();
/// let json = serde_json::to_string_pretty(&config).unwrap();
/// # let _ = json;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Mirror source/target configuration.
    pub mirror: MirrorConfig,

    /// File watcher configuration.
    pub watch: WatchConfig,

    /// Worker pool configuration.
    pub pool: PoolConfig,
}

impl Config {
    /// Loads configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not valid JSON.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_std_path())?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Validates the configuration against the filesystem and value ranges.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingDirectory`] if the source root or target
    ///   directory does not exist
    /// - [`ConfigError::InvalidPath`] if either path exists but is not a
    ///   directory
    /// - [`ConfigError::InvalidOption`] for zero workers, a zero poll
    ///   interval, a zero channel capacity, or an empty extension list
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_dir(&self.mirror.source_root)?;
        validate_dir(&self.mirror.target_dir)?;

        if self.mirror.extensions.is_empty() {
            return Err(ConfigError::invalid_option(
                "mirror.extensions",
                "at least one extension is required",
            ));
        }
        if self.pool.workers == 0 {
            return Err(ConfigError::invalid_option(
                "pool.workers",
                "must be at least 1",
            ));
        }
        if self.pool.poll_interval_ms == 0 {
            return Err(ConfigError::invalid_option(
                "pool.poll_interval_ms",
                "must be at least 1",
            ));
        }
        if self.watch.channel_capacity == 0 {
            return Err(ConfigError::invalid_option(
                "watch.channel_capacity",
                "must be at least 1",
            ));
        }

        Ok(())
    }
}

fn validate_dir(path: &Utf8Path) -> Result<(), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingDirectory(path.to_owned()));
    }
    if !path.is_dir() {
        return Err(ConfigError::InvalidPath {
            path: path.to_owned(),
            reason: "not a directory".to_owned(),
        });
    }
    Ok(())
}
