//! Deterministic traversal of the watched tree.
//!
//! This module provides [`TreeWalker`], which uses the `ignore` crate to walk
//! a directory with every filter turned off: hidden files, `.gitignore` and
//! `.ignore` rules are all ignored so the export sees exactly what is on
//! disk.
//!
//! # Ordering
//!
//! Entries come out parents first, each directory's children sorted by file
//! name. The same directory state always yields the same sequence, which
//! keeps archive entry order stable between runs.
//!
//! # Examples
//!
//! ```no_run
//! use pk_export::TreeWalker;
//! use camino::Utf8Path;
//!
//! # fn main() -> Result<(), pk_export::ExportError> {
//! let walker = TreeWalker::new(Utf8Path::new("/src"))?;
//! for entry in walker.entries()? {
//!     println!("{:?} {}", entry.kind, entry.relative);
//! }
//! # Ok(())
//! # }
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use ignore::WalkBuilder;

use crate::error::ExportError;

/// What a [`TreeEntry`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A directory.
    Directory,
    /// Anything else: regular files and symbolic links.
    ///
    /// Links are not followed during the walk; exporting one reads through
    /// it to the target's content.
    File,
}

/// A single entry below the walked root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Full path of the entry.
    pub path: Utf8PathBuf,
    /// Path relative to the walked root.
    pub relative: Utf8PathBuf,
    /// Entry kind.
    pub kind: EntryKind,
}

impl TreeEntry {
    /// Returns `true` if this entry is a directory.
    #[inline]
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Returns the relative path joined with `/`, independent of platform.
    ///
    /// This is the form used for archive entry names.
    #[must_use]
    pub fn portable_name(&self) -> String {
        let parts: Vec<&str> = self.relative.components().map(|c| c.as_str()).collect();
        parts.join("/")
    }

    /// Returns the unix permission bits of the entry, or `None` on platforms
    /// without them.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the entry cannot be stat'ed.
    #[cfg(unix)]
    pub fn unix_mode(&self) -> Result<Option<u32>, ExportError> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = std::fs::metadata(&self.path).map_err(|e| ExportError::io(&self.path, e))?;
        Ok(Some(metadata.permissions().mode()))
    }

    /// Returns the unix permission bits of the entry, or `None` on platforms
    /// without them.
    #[cfg(not(unix))]
    #[allow(clippy::unnecessary_wraps)]
    pub fn unix_mode(&self) -> Result<Option<u32>, ExportError> {
        Ok(None)
    }
}

/// A walker that lists every entry below a root directory.
#[derive(Debug)]
pub struct TreeWalker {
    /// The root directory to walk.
    root: Utf8PathBuf,
}

impl TreeWalker {
    /// Creates a new walker for the given root directory.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidRoot`] if the root doesn't exist or
    /// isn't a directory.
    pub fn new(root: &Utf8Path) -> Result<Self, ExportError> {
        if !root.exists() {
            return Err(ExportError::invalid_root(root, "does not exist"));
        }
        if !root.is_dir() {
            return Err(ExportError::invalid_root(root, "not a directory"));
        }

        Ok(Self {
            root: root.to_owned(),
        })
    }

    /// Collects every entry below the root, excluding the root itself.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Walk`] if traversal fails and
    /// [`ExportError::NonUtf8Path`] for a path that is not valid UTF-8.
    pub fn entries(&self) -> Result<Vec<TreeEntry>, ExportError> {
        let mut entries = Vec::new();

        for result in self.build_walker() {
            let entry = result?;
            if entry.depth() == 0 {
                continue;
            }

            let path = Utf8Path::from_path(entry.path())
                .ok_or_else(|| ExportError::NonUtf8Path(entry.path().to_owned()))?;
            let relative = path
                .strip_prefix(&self.root)
                .map_err(|_| {
                    ExportError::io(path, std::io::Error::other("entry is outside the walked root"))
                })?;

            let kind = if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                EntryKind::Directory
            } else {
                EntryKind::File
            };

            entries.push(TreeEntry {
                path: path.to_owned(),
                relative: relative.to_owned(),
                kind,
            });
        }

        tracing::trace!(root = %self.root, count = entries.len(), "Walked tree");

        Ok(entries)
    }

    /// Builds the ignore walker with every filter disabled.
    ///
    /// Symbolic links are listed but never descended into.
    fn build_walker(&self) -> ignore::Walk {
        WalkBuilder::new(&self.root)
            // Export everything on disk: no hidden-file or ignore-file rules
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .threads(1)
            .build()
    }

    /// Returns the root directory being walked.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}
