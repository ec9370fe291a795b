//! File filtering for watch events.
//!
//! Filters run on the notify thread before an event is sent to the channel,
//! so rejected events never reach the dispatcher.
//!
//! # Examples
//!
//! ```
//! use pk_watcher::{ChangeKind, ChangeKindFilter, CompositeFilter, ExcludeDirFilter, FileEvent, FileFilter};
//! use camino::Utf8PathBuf;
//!
//! let filter = CompositeFilter::new()
//!     .and(ChangeKindFilter::write_or_create())
//!     .and(ExcludeDirFilter::new("/src/dist"));
//!
//! let write = FileEvent::new(Utf8PathBuf::from("/src/a.json"), ChangeKind::Write);
//! let chmod = FileEvent::new(Utf8PathBuf::from("/src/a.json"), ChangeKind::Metadata);
//! let output = FileEvent::new(Utf8PathBuf::from("/src/dist/pkg.zip"), ChangeKind::Create);
//!
//! assert!(filter.should_process(&write));
//! assert!(!filter.should_process(&chmod));
//! assert!(!filter.should_process(&output));
//! ```

use camino::Utf8PathBuf;
use smallvec::SmallVec;

use crate::events::{ChangeKind, FileEvent};

/// A filter for determining which file events to process.
///
/// # Thread Safety
///
/// Filters must be [`Send`] and [`Sync`] because they run on the notify
/// thread, and `'static` to be moved into its callback.
pub trait FileFilter: Send + Sync + 'static {
    /// Returns `true` if the event should be sent to the channel.
    fn should_process(&self, event: &FileEvent) -> bool;
}

/// A filter that accepts every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllFilter;

impl FileFilter for AcceptAllFilter {
    #[inline]
    fn should_process(&self, _event: &FileEvent) -> bool {
        true
    }
}

/// A filter that accepts events of the listed kinds only.
#[derive(Debug, Clone)]
pub struct ChangeKindFilter {
    kinds: SmallVec<[ChangeKind; 4]>,
}

impl ChangeKindFilter {
    /// Creates a filter accepting the given kinds.
    #[must_use]
    pub fn new(kinds: &[ChangeKind]) -> Self {
        Self {
            kinds: SmallVec::from_slice(kinds),
        }
    }

    /// Creates the filter used for syncing: writes and creations only.
    #[must_use]
    pub fn write_or_create() -> Self {
        Self::new(&[ChangeKind::Write, ChangeKind::Create])
    }
}

impl FileFilter for ChangeKindFilter {
    fn should_process(&self, event: &FileEvent) -> bool {
        self.kinds.contains(&event.kind)
    }
}

/// A filter that drops events at or below a directory.
///
/// Used when the export destination sits inside the watched tree, so that
/// writing an archive or mirror does not trigger another sync.
#[derive(Debug, Clone)]
pub struct ExcludeDirFilter {
    dir: Utf8PathBuf,
}

impl ExcludeDirFilter {
    /// Creates a filter excluding `dir` and everything below it.
    #[must_use]
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FileFilter for ExcludeDirFilter {
    fn should_process(&self, event: &FileEvent) -> bool {
        !event.path.starts_with(&self.dir)
    }
}

/// A composite filter that combines multiple filters with AND logic.
///
/// An empty composite accepts everything.
#[derive(Default)]
pub struct CompositeFilter {
    filters: Vec<Box<dyn FileFilter>>,
}

impl CompositeFilter {
    /// Creates a new empty composite filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter to the composite.
    #[must_use]
    pub fn and<F: FileFilter>(mut self, filter: F) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Returns the number of combined filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns `true` if no filter has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl std::fmt::Debug for CompositeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeFilter")
            .field("filters", &self.filters.len())
            .finish()
    }
}

impl FileFilter for CompositeFilter {
    fn should_process(&self, event: &FileEvent) -> bool {
        self.filters.iter().all(|f| f.should_process(event))
    }
}
