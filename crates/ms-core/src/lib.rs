//! Core types and configuration for the manga-shelf mirror daemon.
//!
//! This crate provides the foundational pieces used across the workspace:
//!
//! - Configuration structures ([`Config`], [`MirrorConfig`], [`WatchConfig`],
//!   [`PoolConfig`]) with JSON file loading and validation
//! - [`ConfigError`] for configuration failures
//! - [`MirrorName`], the canonical source-path-to-mirror-name mapping shared
//!   by the creation and deletion handling paths

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod name;

pub use config::{Config, MirrorConfig, PoolConfig, WatchConfig};
pub use error::ConfigError;
pub use name::{MirrorName, MIN_QUALIFYING_SEGMENTS};
