//! Error types for the pk-watcher crate.
//!
//! Every [`WatchError`] comes from starting or stopping the watcher. Problems
//! with individual events (a path that is not UTF-8, a notify error on the
//! notify thread) are logged where they happen and never reach the caller.

use camino::Utf8PathBuf;

/// Errors raised while starting or stopping a [`FileWatcher`].
///
/// The caller cannot watch anything after any of these, so none of them is
/// retried.
///
/// [`FileWatcher`]: crate::FileWatcher
///
/// # Examples
///
/// ```
/// use pk_watcher::WatchError;
///
/// let err = WatchError::root_not_found("/srv/pack");
/// assert_eq!(err.to_string(), "watched directory does not exist: /srv/pack");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The watched directory does not exist.
    #[error("watched directory does not exist: {0}")]
    RootNotFound(Utf8PathBuf),

    /// The watched directory exists but could not be canonicalized.
    #[error("failed to resolve watched directory {path}: {source}")]
    Resolve {
        /// The directory as given.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The platform watcher could not be created.
    #[error("failed to start the notify watcher: {0}")]
    Start(#[source] notify::Error),

    /// A directory could not be subscribed.
    #[error("failed to subscribe {path}: {source}")]
    Subscribe {
        /// The directory that was being subscribed.
        path: Utf8PathBuf,
        /// The underlying notify error.
        #[source]
        source: notify::Error,
    },

    /// Listing the directories to subscribe failed.
    #[error("failed to list watched directories: {0}")]
    ListDirectories(#[from] ignore::Error),

    /// The task owning the platform watcher panicked or was cancelled.
    #[error("watcher task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl WatchError {
    /// Creates a new [`WatchError::RootNotFound`] error.
    #[inline]
    pub fn root_not_found(path: impl Into<Utf8PathBuf>) -> Self {
        Self::RootNotFound(path.into())
    }

    /// Creates a new [`WatchError::Resolve`] error.
    #[inline]
    pub fn resolve(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Resolve {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`WatchError::Subscribe`] error.
    #[inline]
    pub fn subscribe(path: impl Into<Utf8PathBuf>, source: notify::Error) -> Self {
        Self::Subscribe {
            path: path.into(),
            source,
        }
    }
}
