//! Per-event handling: debounce gate, manifest rewrite, export.

use std::fs;

use pk_core::{Config, rewrite_manifest};
use pk_export::{ExportError, ExportSummary, build_archive, mirror_tree};
use pk_watcher::FileEvent;

use crate::context::SyncContext;
use crate::error::SyncError;

/// What handling one event amounted to.
#[derive(Debug)]
pub enum Outcome {
    /// The event was neither a write nor a creation.
    Ignored,
    /// The changed path could not be stat'ed; the event was skipped.
    StatFailed,
    /// The changed file is not newer than the last-modified marker.
    Stale,
    /// The manifest was rewritten and the export succeeded.
    Exported(ExportSummary),
    /// The manifest was rewritten but the export failed.
    ///
    /// The failure has already been logged; the watcher keeps running.
    ExportFailed(ExportError),
}

impl Outcome {
    /// Returns `true` if the event led to a manifest rewrite.
    #[must_use]
    pub const fn rewrote_manifest(&self) -> bool {
        matches!(self, Self::Exported(_) | Self::ExportFailed(_))
    }
}

/// Handles change events one at a time.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8PathBuf;
/// use pk_core::Config;
/// use pk_sync::Dispatcher;
/// use pk_watcher::{ChangeKind, FileEvent};
///
/// # fn main() -> Result<(), pk_sync::SyncError> {
/// let config = Config::load("config.json")?;
/// let mut dispatcher = Dispatcher::new(config);
///
/// let event = FileEvent::new(Utf8PathBuf::from("/src/blocks/stone.json"), ChangeKind::Write);
/// let outcome = dispatcher.handle_event(&event)?;
/// println!("{outcome:?}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Dispatcher {
    context: SyncContext,
}

impl Dispatcher {
    /// Creates a dispatcher with a fresh context.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            context: SyncContext::new(config),
        }
    }

    /// Returns the dispatcher's context.
    #[must_use]
    pub fn context(&self) -> &SyncContext {
        &self.context
    }

    /// Handles one change event.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Manifest`] if the manifest cannot be rewritten.
    /// That error is fatal: no export is attempted and the marker is left
    /// where it was.
    pub fn handle_event(&mut self, event: &FileEvent) -> Result<Outcome, SyncError> {
        if !event.kind.is_write_or_create() {
            return Ok(Outcome::Ignored);
        }

        let modified = match fs::metadata(&event.path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(error) => {
                tracing::warn!(path = %event.path, error = %error, "Failed to stat changed path");
                return Ok(Outcome::StatFailed);
            }
        };

        if !self.context.is_newer(modified) {
            tracing::debug!(path = %event.path, "Change predates last sync, skipping");
            return Ok(Outcome::Stale);
        }

        tracing::info!(path = %event.path, kind = ?event.kind, "Modified file");

        rewrite_manifest(&self.context.config().manifest_path())?;
        self.context.mark_now();

        match self.export() {
            Ok(summary) => Ok(Outcome::Exported(summary)),
            Err(error) => {
                tracing::error!(
                    error = %error,
                    path = ?error.path(),
                    "Export failed, continuing to watch"
                );
                Ok(Outcome::ExportFailed(error))
            }
        }
    }

    /// Archives or mirrors the watched tree according to the configuration.
    fn export(&self) -> Result<ExportSummary, ExportError> {
        let config = self.context.config();
        if config.zip {
            build_archive(&config.watch_dir, &config.archive_path())
        } else {
            mirror_tree(&config.watch_dir, &config.zip_dir)
        }
    }
}
