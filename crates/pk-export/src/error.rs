//! Error types for the pk-export crate.
//!
//! This module provides the [`ExportError`] type for errors that can occur
//! while walking the watched tree and writing an archive or a mirror.

use camino::Utf8PathBuf;

/// Errors that can occur during an export.
///
/// Any error aborts the export in progress and is returned to the caller.
/// Whether the caller keeps running afterwards is its own policy.
///
/// # Examples
///
/// ```
/// use pk_export::ExportError;
/// use camino::Utf8PathBuf;
///
/// fn describe(err: &ExportError) -> String {
///     match err.path() {
///         Some(path) => format!("export failed at {path}: {err}"),
///         None => format!("export failed: {err}"),
///     }
/// }
///
/// let err = ExportError::invalid_root("/missing", "does not exist");
/// assert!(describe(&err).contains("/missing"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Directory traversal failed.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// An I/O operation on a specific path failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path being read or written.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing the ZIP container failed.
    #[error("failed to write archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The export source is not a usable directory.
    #[error("invalid source directory {path}: {reason}")]
    InvalidRoot {
        /// The offending root.
        path: Utf8PathBuf,
        /// Why the root was rejected.
        reason: String,
    },

    /// A path below the root is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),
}

impl ExportError {
    /// Creates a new [`ExportError::Io`] error.
    #[inline]
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ExportError::InvalidRoot`] error.
    #[inline]
    pub fn invalid_root(path: impl Into<Utf8PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidRoot {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns the path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Io { path, .. } | Self::InvalidRoot { path, .. } => Some(path),
            Self::Walk(_) | Self::Zip(_) | Self::NonUtf8Path(_) => None,
        }
    }
}
