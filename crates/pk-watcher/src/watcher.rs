//! File watcher with async event streaming.
//!
//! This module provides the [`FileWatcher`] type that bridges the synchronous
//! `notify` file watching crate to the async tokio runtime.
//!
//! Subscriptions are made before [`FileWatcher::new`] returns, so a failure to
//! watch any directory is reported to the caller instead of being lost in the
//! background task.

use camino::{Utf8Path, Utf8PathBuf};
use ignore::WalkBuilder;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::WatchError;
use crate::events::{ChangeKind, FileEvent};
use crate::filter::FileFilter;

/// Default channel capacity for file events.
const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// How the watched tree is subscribed.
///
/// # Examples
///
/// ```
/// use pk_watcher::WatchOptions;
///
/// let options = WatchOptions::default();
/// assert!(!options.recursive);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchOptions {
    /// Subscribe the root recursively.
    ///
    /// When `false`, the root and every directory that exists at startup are
    /// subscribed one by one, and directories created later are not watched.
    pub recursive: bool,
}

/// A file watcher that streams events to an async context.
///
/// # Lifecycle
///
/// 1. **Creation**: `FileWatcher::new()` validates the path, subscribes the
///    tree and parks the notify watcher in a blocking task.
///
/// 2. **Event Reception**: `recv()` yields filtered events in arrival order.
///
/// 3. **Shutdown**: `shutdown()` stops the task and waits for it; dropping
///    the watcher sends the same signal without waiting.
pub struct FileWatcher {
    /// Shutdown signal sender. `None` once shutdown has started.
    shutdown_tx: Option<oneshot::Sender<()>>,

    /// Handle to the blocking task that owns the notify watcher.
    task_handle: Option<JoinHandle<()>>,

    /// Event receiver for async consumption.
    event_rx: mpsc::Receiver<FileEvent>,

    /// The canonical path being watched.
    watch_path: Utf8PathBuf,

    /// Number of directory subscriptions made at startup.
    subscriptions: usize,
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("watch_path", &self.watch_path)
            .field("subscriptions", &self.subscriptions)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl FileWatcher {
    /// Creates a new file watcher for the specified path.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::RootNotFound`] if the path doesn't exist,
    /// [`WatchError::ListDirectories`] if the startup directories cannot be
    /// listed, and [`WatchError::Start`] or [`WatchError::Subscribe`] if the
    /// platform watcher cannot be created or a directory cannot be watched.
    #[allow(clippy::unused_async)] // Async for API consistency with shutdown()
    pub async fn new<F: FileFilter>(
        path: &Utf8Path,
        options: &WatchOptions,
        filter: F,
    ) -> Result<Self, WatchError> {
        Self::with_capacity(path, options, filter, DEFAULT_CHANNEL_CAPACITY).await
    }

    /// Creates a file watcher with a custom channel capacity.
    ///
    /// When the channel is full the notify thread blocks until the consumer
    /// catches up, so no event is dropped.
    ///
    /// # Errors
    ///
    /// See [`FileWatcher::new`].
    #[allow(clippy::unused_async)] // Async for API consistency with shutdown()
    pub async fn with_capacity<F: FileFilter>(
        path: &Utf8Path,
        options: &WatchOptions,
        filter: F,
        channel_capacity: usize,
    ) -> Result<Self, WatchError> {
        if !path.exists() {
            return Err(WatchError::root_not_found(path));
        }
        let watch_path = path
            .canonicalize_utf8()
            .map_err(|e| WatchError::resolve(path, e))?;

        let (event_tx, event_rx) = mpsc::channel(channel_capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => forward_event(event, &filter, &event_tx),
                Err(error) => tracing::warn!(error = %error, "Watcher error"),
            }
        })
        .map_err(WatchError::Start)?;

        let subscriptions = subscribe(&mut watcher, &watch_path, options.recursive)?;

        tracing::info!(
            path = %watch_path,
            recursive = options.recursive,
            subscriptions,
            "File watcher started"
        );

        let task_path = watch_path.clone();
        let task_handle = tokio::task::spawn_blocking(move || {
            // The watcher stops delivering events once dropped
            let _watcher = watcher;
            let _ = shutdown_rx.blocking_recv();
            tracing::info!(path = %task_path, "File watcher stopped");
        });

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            task_handle: Some(task_handle),
            event_rx,
            watch_path,
            subscriptions,
        })
    }

    /// Receives the next file event asynchronously.
    ///
    /// Returns `None` once the watcher has been shut down and every queued
    /// event has been received.
    pub async fn recv(&mut self) -> Option<FileEvent> {
        self.event_rx.recv().await
    }

    /// Returns the canonical path being watched.
    #[must_use]
    pub fn watch_path(&self) -> &Utf8Path {
        &self.watch_path
    }

    /// Returns the number of directory subscriptions made at startup.
    #[must_use]
    pub fn subscriptions(&self) -> usize {
        self.subscriptions
    }

    /// Returns `true` if the watcher is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some() && self.task_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Gracefully shuts down the watcher and waits for its task to finish.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Task`] if the watcher task panicked.
    pub async fn shutdown(mut self) -> Result<(), WatchError> {
        if let Some(tx) = self.shutdown_tx.take() {
            // Ignore error if receiver is already dropped
            let _ = tx.send(());
        }

        if let Some(handle) = self.task_handle.take() {
            handle.await?;
        }

        Ok(())
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Subscribes the tree under `root` and returns the number of subscriptions.
fn subscribe(
    watcher: &mut RecommendedWatcher,
    root: &Utf8Path,
    recursive: bool,
) -> Result<usize, WatchError> {
    if recursive {
        watcher
            .watch(root.as_std_path(), RecursiveMode::Recursive)
            .map_err(|e| WatchError::subscribe(root, e))?;
        return Ok(1);
    }

    let mut count = 0;
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .filter_entry(|entry| entry.file_type().is_some_and(|ft| ft.is_dir()))
        .build();

    for result in walker {
        let entry = result?;
        let Ok(dir) = Utf8PathBuf::from_path_buf(entry.into_path()) else {
            // Nothing below it could be reported as a UTF-8 event
            tracing::warn!("Skipping directory with a non-UTF-8 name");
            continue;
        };
        watcher
            .watch(dir.as_std_path(), RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::subscribe(&dir, e))?;
        tracing::trace!(path = %dir, "Subscribed directory");
        count += 1;
    }

    Ok(count)
}

/// Converts a raw notify event and sends the accepted parts to the channel.
fn forward_event<F: FileFilter>(
    event: notify::Event,
    filter: &F,
    tx: &mpsc::Sender<FileEvent>,
) {
    let kind = ChangeKind::from(&event.kind);

    for path in event.paths {
        let utf8_path = match Utf8PathBuf::try_from(path) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(
                    path = %e.as_path().display(),
                    "Skipping event for non-UTF-8 path"
                );
                continue;
            }
        };

        let file_event = FileEvent::new(utf8_path, kind);
        if !filter.should_process(&file_event) {
            tracing::trace!(path = %file_event.path, kind = ?kind, "Filtered out file event");
            continue;
        }

        // Called on the notify thread, outside the runtime
        if tx.blocking_send(file_event).is_err() {
            tracing::debug!("Event channel closed, dropping file event");
            break;
        }
    }
}
