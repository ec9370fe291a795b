//! Error types for the pk-sync crate.

use pk_core::{ConfigError, ManifestError};
use pk_watcher::WatchError;

/// Errors that stop the sync loop.
///
/// Export failures are not part of this type: the dispatcher logs them and
/// keeps watching (see [`Outcome::ExportFailed`](crate::Outcome::ExportFailed)).
/// Stat failures on a changed path are skipped the same way. Everything that
/// does reach this type ends the loop.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The configuration violates a startup invariant.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The manifest could not be rewritten.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// The watcher could not be started.
    #[error(transparent)]
    Watch(#[from] WatchError),

    /// The blocking task running an event's work panicked or was cancelled.
    #[error("event handler task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
