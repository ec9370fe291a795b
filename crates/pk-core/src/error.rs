//! Error types for the pk-core crate.
//!
//! This module provides [`ConfigError`] for failures while loading and
//! validating the configuration, and [`ManifestError`] for failures while
//! rewriting the manifest. Both are fatal to the process: the binary reports
//! them and exits.

use camino::Utf8PathBuf;

/// Errors that can occur during configuration loading and validation.
///
/// # Examples
///
/// ```
/// use pk_core::ConfigError;
/// use camino::Utf8PathBuf;
///
/// let error = ConfigError::SameDirectory(Utf8PathBuf::from("/srv/pack"));
/// assert!(error.to_string().contains("/srv/pack"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be opened or read.
    #[error("failed to read configuration {path}: {source}")]
    Io {
        /// The configuration file path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not a JSON object of the expected shape.
    #[error("failed to parse configuration {path}: {source}")]
    Parse {
        /// The configuration file path.
        path: Utf8PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A configured directory could not be resolved to an absolute path.
    #[error("failed to resolve directory {path}: {source}")]
    Resolve {
        /// The directory as configured.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The watched directory and the output directory are the same path.
    #[error("watch directory and output directory cannot be the same: {0}")]
    SameDirectory(Utf8PathBuf),
}

impl ConfigError {
    /// Creates a new [`ConfigError::Io`] error.
    #[inline]
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ConfigError::Parse`] error.
    #[inline]
    pub fn parse(path: impl Into<Utf8PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ConfigError::Resolve`] error.
    #[inline]
    pub fn resolve(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Resolve {
            path: path.into(),
            source,
        }
    }

    /// Returns the file or directory path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Utf8PathBuf {
        match self {
            Self::Io { path, .. }
            | Self::Parse { path, .. }
            | Self::Resolve { path, .. }
            | Self::SameDirectory(path) => path,
        }
    }
}

/// Errors that can occur while rewriting the manifest.
///
/// Every variant is fatal: a manifest that cannot be read, parsed or written
/// back stops the watcher before any archive or mirror is produced.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("failed to read manifest {path}: {source}")]
    Read {
        /// The manifest path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid JSON or does not match the manifest shape.
    #[error("failed to parse manifest {path}: {source}")]
    Parse {
        /// The manifest path.
        path: Utf8PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The rewritten manifest could not be serialized.
    #[error("failed to serialize manifest: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The rewritten manifest could not be written back.
    #[error("failed to write manifest {path}: {source}")]
    Write {
        /// The manifest path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ManifestError {
    /// Creates a new [`ManifestError::Read`] error.
    #[inline]
    pub fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ManifestError::Parse`] error.
    #[inline]
    pub fn parse(path: impl Into<Utf8PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ManifestError::Write`] error.
    #[inline]
    pub fn write(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Returns the manifest path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } | Self::Write { path, .. } => {
                Some(path)
            }
            Self::Serialize(_) => None,
        }
    }
}
