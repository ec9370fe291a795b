//! Event types for file change notifications.
//!
//! A single `notify` event may name several paths; the watcher splits it into
//! one [`FileEvent`] per path, each tagged with a [`ChangeKind`].
//!
//! # Event Flow
//!
//! ```text
//! File System Change
//!        │
//!        ▼
//!   notify::Event (kind + paths)
//!        │
//!        ▼
//!   FileEvent per path, ChangeKind classified
//!        │
//!        ▼
//!   FileFilter, then channel to the dispatcher
//! ```

use std::time::Instant;

use camino::Utf8PathBuf;
use notify::EventKind;
use notify::event::ModifyKind;

/// The kind of change a [`FileEvent`] reports.
///
/// Only [`Create`](Self::Create) and [`Write`](Self::Write) trigger a sync;
/// the other kinds exist so filters and logs can tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// A file or directory was created.
    Create,
    /// File content was written.
    Write,
    /// A file or directory was removed.
    Remove,
    /// A file or directory was renamed or moved.
    Rename,
    /// Permissions, timestamps or other metadata changed.
    Metadata,
    /// Access notifications and anything the backend could not classify.
    Other,
}

impl ChangeKind {
    /// Returns `true` for kinds that trigger a sync.
    ///
    /// # Examples
    ///
    /// ```
    /// use pk_watcher::ChangeKind;
    ///
    /// assert!(ChangeKind::Write.is_write_or_create());
    /// assert!(!ChangeKind::Metadata.is_write_or_create());
    /// ```
    #[inline]
    #[must_use]
    pub const fn is_write_or_create(self) -> bool {
        matches!(self, Self::Create | Self::Write)
    }
}

impl From<&EventKind> for ChangeKind {
    fn from(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) => Self::Create,
            EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any) => Self::Write,
            EventKind::Modify(ModifyKind::Metadata(_)) => Self::Metadata,
            EventKind::Modify(ModifyKind::Name(_)) => Self::Rename,
            EventKind::Remove(_) => Self::Remove,
            EventKind::Modify(ModifyKind::Other)
            | EventKind::Access(_)
            | EventKind::Any
            | EventKind::Other => Self::Other,
        }
    }
}

/// A file change event with a UTF-8 path guarantee.
///
/// # Examples
///
/// ```
/// use pk_watcher::{ChangeKind, FileEvent};
/// use camino::Utf8PathBuf;
///
/// let event = FileEvent::new(Utf8PathBuf::from("/src/manifest.json"), ChangeKind::Write);
/// assert_eq!(event.file_name(), Some("manifest.json"));
/// assert!(event.kind.is_write_or_create());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    /// The path that changed.
    pub path: Utf8PathBuf,

    /// What happened to it.
    pub kind: ChangeKind,

    /// When the watcher received the event.
    ///
    /// Monotonic; suitable for measuring latency, not for comparing against
    /// file modification times.
    pub timestamp: Instant,
}

impl FileEvent {
    /// Creates a new file event stamped with the current instant.
    #[inline]
    #[must_use]
    pub fn new(path: Utf8PathBuf, kind: ChangeKind) -> Self {
        Self {
            path,
            kind,
            timestamp: Instant::now(),
        }
    }

    /// Returns the file name without the directory path.
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{
        AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind, RenameMode,
    };

    #[test]
    fn test_change_kind_from_notify() {
        let cases = [
            (EventKind::Create(CreateKind::File), ChangeKind::Create),
            (EventKind::Create(CreateKind::Folder), ChangeKind::Create),
            (
                EventKind::Modify(ModifyKind::Data(DataChange::Content)),
                ChangeKind::Write,
            ),
            (
                EventKind::Modify(ModifyKind::Data(DataChange::Any)),
                ChangeKind::Write,
            ),
            (EventKind::Modify(ModifyKind::Any), ChangeKind::Write),
            (
                EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
                ChangeKind::Metadata,
            ),
            (
                EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
                ChangeKind::Rename,
            ),
            (EventKind::Remove(RemoveKind::File), ChangeKind::Remove),
            (EventKind::Access(AccessKind::Read), ChangeKind::Other),
            (EventKind::Any, ChangeKind::Other),
        ];

        for (notify_kind, expected) in cases {
            assert_eq!(ChangeKind::from(&notify_kind), expected, "{notify_kind:?}");
        }
    }

    #[test]
    fn test_is_write_or_create() {
        assert!(ChangeKind::Create.is_write_or_create());
        assert!(ChangeKind::Write.is_write_or_create());
        assert!(!ChangeKind::Remove.is_write_or_create());
        assert!(!ChangeKind::Rename.is_write_or_create());
        assert!(!ChangeKind::Metadata.is_write_or_create());
        assert!(!ChangeKind::Other.is_write_or_create());
    }

    #[test]
    fn test_file_event_new() {
        let before = Instant::now();
        let event = FileEvent::new(Utf8PathBuf::from("src/textures/stone.png"), ChangeKind::Create);
        assert_eq!(event.path.as_str(), "src/textures/stone.png");
        assert_eq!(event.file_name(), Some("stone.png"));
        assert!(event.timestamp >= before);
    }
}
