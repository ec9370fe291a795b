//! State shared by every event the dispatcher handles.

use std::time::SystemTime;

use pk_core::Config;

/// Configuration plus the last-modified marker.
///
/// The marker starts at the Unix epoch and moves to "now" after each manifest
/// rewrite. A changed file is only acted on if its modification time is
/// strictly after the marker, which keeps the manifest rewrite itself from
/// triggering another sync.
///
/// The context has a single owner, the dispatcher, so it needs no locking.
#[derive(Debug, Clone)]
pub struct SyncContext {
    config: Config,
    last_modified: SystemTime,
}

impl SyncContext {
    /// Creates a context with the marker at the Unix epoch.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            last_modified: SystemTime::UNIX_EPOCH,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the current marker.
    #[must_use]
    pub fn last_modified(&self) -> SystemTime {
        self.last_modified
    }

    /// Returns `true` if `modified` is strictly after the marker.
    #[must_use]
    pub fn is_newer(&self, modified: SystemTime) -> bool {
        modified > self.last_modified
    }

    /// Moves the marker to the current time.
    pub fn mark_now(&mut self) {
        self.last_modified = SystemTime::now();
    }
}
