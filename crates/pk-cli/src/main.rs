//! CLI entry point for packsync.
//!
//! Watches a directory tree and, on every change, regenerates the
//! identifiers in its JSON manifest and then archives or mirrors the tree.
//! Everything else is driven by the configuration file.
//!
//! # Usage
//!
//! ```bash
//! # Read ./config.json
//! packsync
//!
//! # Explicit config with debug logging
//! packsync --config packs/stone-tools.json --verbose
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use pk_core::{Config, DEFAULT_CONFIG_FILE};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Regenerates manifest identifiers and exports a directory tree whenever it
/// changes.
#[derive(Parser)]
#[command(name = "packsync", version, about, long_about = None)]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, env = "PACKSYNC_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: Utf8PathBuf,

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
/// `debug` level if `--verbose` is set, or `info` level by default.
/// `notify` is filtered to `warn` level.
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

/// Loads, resolves and validates the configuration.
///
/// The returned config holds absolute, canonical directories.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, if a directory
/// cannot be resolved, or if the watch and output directories are the same.
fn load_config(path: &Utf8Path) -> color_eyre::Result<Config> {
    let config = Config::load(path)?.resolve()?;
    config.validate()?;

    if config.output_inside_watch_dir() {
        warn!(
            watch_dir = %config.watch_dir,
            zip_dir = %config.zip_dir,
            "Output directory is inside the watched tree; changes there are ignored"
        );
    }

    info!(
        config = %path,
        watch_dir = %config.watch_dir,
        zip_dir = %config.zip_dir,
        manifest = %config.json_file,
        zip = config.zip,
        recursive = config.recursive,
        "Configuration loaded"
    );

    Ok(config)
}

/// Completes when the process is asked to stop.
async fn shutdown_signal() {
    // Handle SIGTERM for graceful shutdown on Unix
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                    _ = tokio::signal::ctrl_c() => info!("Received Ctrl-C, shutting down"),
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
                info!("Received Ctrl-C, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received Ctrl-C, shutting down");
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Load configuration; any problem here is fatal
    let config = load_config(&cli.config)?;

    // 5. Watch until a signal arrives or a fatal error occurs
    pk_sync::run_with_shutdown(config, shutdown_signal()).await?;

    Ok(())
}
