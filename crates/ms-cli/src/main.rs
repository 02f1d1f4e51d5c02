//! CLI entry point for the manga-shelf mirror daemon.
//!
//! This binary watches a source library tree for completed comic archives
//! and maintains hard-linked mirrors of them in a flat target directory.
//!
//! # Usage
//!
//! ```bash
//! # Mirror completed .cbz files from a library into a flat directory
//! ms-mirror /srv/library /srv/downloads
//!
//! # Wider pool, faster polling, extra archive extension
//! ms-mirror /srv/library /srv/downloads --workers 8 --poll-interval-ms 500 --extension cbr
//!
//! # Load settings from a JSON file; CLI flags take precedence
//! ms-mirror --config /etc/manga-shelf.json
//! ```
//!
//! The daemon runs until interrupted (ctrl-c or SIGTERM). On interrupt the
//! filesystem watch is shut down and a final statistics snapshot is logged;
//! waiting for in-flight workers is best-effort only.

#![deny(clippy::all)]
#![warn(missing_docs)]

use camino::Utf8PathBuf;
use clap::Parser;
use color_eyre::eyre::eyre;
use ms_core::Config;
use ms_sync::{EventDispatcher, LinkSynchronizer};
use ms_watcher::{ArchiveFilter, FileWatcher};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Mirrors completed comic archives into a flat directory via hard links.
///
/// Watches SOURCE recursively; when a qualifying archive finishes
/// downloading it is hard-linked into TARGET as `"{series} {file}"`, and
/// the link is removed again when the source file is deleted.
#[derive(Parser)]
#[command(name = "ms-mirror", version, about, long_about = None)]
struct Cli {
    /// Root of the source library tree to watch recursively.
    #[arg(env = "MS_MIRROR_SOURCE")]
    source: Option<Utf8PathBuf>,

    /// Flat target directory receiving the mirror links.
    ///
    /// Must be on the same filesystem volume as the source tree.
    #[arg(env = "MS_MIRROR_TARGET")]
    target: Option<Utf8PathBuf>,

    /// Path to a JSON configuration file.
    ///
    /// Command-line flags take precedence over file settings.
    #[arg(short, long, env = "MS_MIRROR_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Number of concurrent event-processing workers.
    ///
    /// Also caps how many in-progress downloads can be tracked at once.
    #[arg(short, long)]
    workers: Option<usize>,

    /// Interval between file-size samples during stabilization, in
    /// milliseconds.
    #[arg(long, value_name = "MS")]
    poll_interval_ms: Option<u64>,

    /// Archive extension to mirror, without the leading dot (repeatable).
    #[arg(long = "extension", value_name = "EXT")]
    extensions: Vec<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long)]
    no_color: bool,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default. The
/// noisy `notify` backend is filtered to `warn` level.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},notify=warn"))
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_ansi(use_ansi))
        .with(filter)
        .init();
}

/// Builds a [`Config`] from the configuration file (if any) and CLI
/// overrides, then validates it.
///
/// # Errors
///
/// Returns an error if the config file cannot be loaded, if the source or
/// target directory is missing, or if validation rejects any option.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .map_err(|e| eyre!("Failed to load configuration from {path}: {e}"))?,
        None => Config::default(),
    };

    if let Some(source) = &cli.source {
        config.mirror.source_root.clone_from(source);
    }
    if let Some(target) = &cli.target {
        config.mirror.target_dir.clone_from(target);
    }
    if let Some(workers) = cli.workers {
        config.pool.workers = workers;
    }
    if let Some(poll_interval_ms) = cli.poll_interval_ms {
        config.pool.poll_interval_ms = poll_interval_ms;
    }
    if !cli.extensions.is_empty() {
        config.mirror.extensions.clone_from(&cli.extensions);
    }

    if config.mirror.source_root.as_str().is_empty() {
        return Err(eyre!(
            "A source directory is required (positional argument or config file)"
        ));
    }
    if config.mirror.target_dir.as_str().is_empty() {
        return Err(eyre!(
            "A target directory is required (positional argument or config file)"
        ));
    }

    config.validate()?;

    Ok(config)
}

// =============================================================================
// RUN LOOP
// =============================================================================

/// Runs the daemon until the event stream ends or a shutdown signal
/// arrives.
async fn run(config: Config) -> color_eyre::Result<()> {
    let mut watcher = FileWatcher::new(&config.mirror.source_root, &config.watch)
        .map_err(|e| eyre!("Failed to establish filesystem watch: {e}"))?;

    let dispatcher = EventDispatcher::new(
        LinkSynchronizer::new(config.mirror.target_dir.clone()),
        ArchiveFilter::from_extensions(config.mirror.extensions.clone()),
        &config.pool,
    );

    info!(
        source = %watcher.watch_root(),
        target = %config.mirror.target_dir,
        workers = config.pool.workers,
        "Mirror daemon started"
    );

    let result = tokio::select! {
        result = drive_events(&mut watcher, &dispatcher) => result,
        () = shutdown_signal() => {
            info!("Shutdown signal received");
            Ok(())
        }
    };

    if let Err(error) = watcher.shutdown().await {
        tracing::warn!(error = %error, "Watcher did not shut down cleanly");
    }

    let snapshot = dispatcher.stats();
    info!(
        linked = snapshot.linked,
        removed = snapshot.removed,
        not_qualified = snapshot.not_qualified,
        collisions = snapshot.collisions,
        vanished = snapshot.vanished,
        failures = snapshot.failures,
        "Final sync statistics"
    );

    result
}

/// Forwards watch events to the dispatcher until the stream closes.
///
/// The stream only closes if the watch thread goes away, which is an error
/// while the daemon is supposed to be running.
async fn drive_events(
    watcher: &mut FileWatcher,
    dispatcher: &EventDispatcher,
) -> color_eyre::Result<()> {
    while let Some(event) = watcher.recv().await {
        dispatcher.dispatch(event);
    }

    Err(eyre!("Filesystem watch event stream ended unexpectedly"))
}

/// Completes when an interrupt signal (ctrl-c, or SIGTERM on Unix)
/// arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %error, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(error) => {
                tracing::warn!(error = %error, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // Install color-eyre first, before anything can fail
    color_eyre::install()?;

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.no_color);

    let config = build_config(&cli)?;

    run(config).await
}
