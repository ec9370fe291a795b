//! Change dispatcher for packsync.
//!
//! This crate ties the other crates together: it starts a [`FileWatcher`]
//! on the configured directory and feeds every change to a [`Dispatcher`],
//! which rewrites the manifest identifiers and exports the tree.
//!
//! # Flow
//!
//! ```text
//! FileWatcher ──FileEvent──▶ Dispatcher::handle_event
//!                               │ write/create?   no ─▶ Ignored
//!                               │ stat ok?        no ─▶ StatFailed
//!                               │ mtime > marker? no ─▶ Stale
//!                               ▼
//!                         rewrite_manifest, marker = now
//!                               ▼
//!                     build_archive │ mirror_tree
//! ```
//!
//! Events are handled strictly one at a time. Each one runs on tokio's
//! blocking pool and the loop waits for it before receiving the next.
//!
//! # Usage
//!
//! ```no_run
//! use pk_core::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pk_sync::SyncError> {
//!     let config = Config::load("config.json")?;
//!     pk_sync::run(config).await
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod context;
pub mod dispatcher;
pub mod error;

use std::future::Future;

use pk_core::Config;
use pk_watcher::{ChangeKindFilter, CompositeFilter, ExcludeDirFilter, FileWatcher, WatchOptions};
use tracing::{debug, error, info, warn};

pub use context::SyncContext;
pub use dispatcher::{Dispatcher, Outcome};
pub use error::SyncError;

/// Runs the sync loop until the process is interrupted.
///
/// # Errors
///
/// See [`run_with_shutdown`].
pub async fn run(config: Config) -> Result<(), SyncError> {
    run_with_shutdown(config, std::future::pending()).await
}

/// Runs the sync loop until `shutdown` completes.
///
/// The configuration is resolved and validated before anything is watched,
/// and only the resolved directories are used from then on. Once the
/// watcher is running, events are handled in arrival order; export failures
/// are logged and the loop continues.
///
/// # Errors
///
/// Returns an error if:
/// - The watch and output directories are the same
/// - The watcher cannot be started
/// - A manifest rewrite fails
pub async fn run_with_shutdown<S>(config: Config, shutdown: S) -> Result<(), SyncError>
where
    S: Future<Output = ()>,
{
    let config = config.resolve()?;
    config.validate()?;

    let options = WatchOptions {
        recursive: config.recursive,
    };
    let mut watcher = FileWatcher::new(&config.watch_dir, &options, build_filter(&config)).await?;

    let output = if config.zip {
        config.archive_path()
    } else {
        config.zip_dir.clone()
    };
    info!(
        watch_dir = %config.watch_dir,
        output = %output,
        zip = config.zip,
        "Watching for changes"
    );

    let result = event_loop(&mut watcher, Dispatcher::new(config), shutdown).await;

    info!("Shutting down file watcher");
    if let Err(e) = watcher.shutdown().await {
        error!(error = %e, "Error shutting down watcher");
    }

    result
}

/// Receives events and hands each one to the dispatcher.
async fn event_loop<S>(
    watcher: &mut FileWatcher,
    mut dispatcher: Dispatcher,
    shutdown: S,
) -> Result<(), SyncError>
where
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        let event = tokio::select! {
            event = watcher.recv() => event,
            () = &mut shutdown => {
                info!("Shutdown requested");
                return Ok(());
            }
        };

        let Some(event) = event else {
            warn!("Watcher stopped delivering events");
            return Ok(());
        };

        let (returned, outcome) = tokio::task::spawn_blocking(move || {
            let outcome = dispatcher.handle_event(&event);
            (dispatcher, outcome)
        })
        .await?;
        dispatcher = returned;

        match outcome? {
            Outcome::Exported(summary) => {
                debug!(files = summary.files, bytes = summary.bytes, "Sync complete");
            }
            outcome => debug!(?outcome, "Event handled"),
        }
    }
}

/// Builds the event filter for a resolved `config`.
///
/// Only writes and creations pass. When the output directory is nested in
/// the watched tree, events below it are dropped as well. Events carry
/// canonical paths, so `config` must have gone through [`Config::resolve`].
fn build_filter(config: &Config) -> CompositeFilter {
    let filter = CompositeFilter::new().and(ChangeKindFilter::write_or_create());
    if !config.output_inside_watch_dir() {
        return filter;
    }

    debug!(path = %config.zip_dir, "Excluding output directory from events");
    filter.and(ExcludeDirFilter::new(config.zip_dir.clone()))
}
