//! Configuration for packsync.
//!
//! The configuration is a single JSON object read once at startup:
//!
//! ```json
//! {
//!   "watchDir": "/src",
//!   "zipDir": "/out",
//!   "jsonFile": "manifest.json",
//!   "zipFileName": "pkg.zip",
//!   "zip": true
//! }
//! ```
//!
//! Missing keys are not an error; they fall back to zero values (empty
//! strings and `false`). No other defaults are substituted.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::paths::resolve_dir;

/// File name of the configuration, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Root configuration for packsync.
///
/// # Examples
///
/// ```
/// use pk_core::Config;
///
/// let json = r#"{"watchDir": "/src", "zipDir": "/out", "jsonFile": "manifest.json",
///                "zipFileName": "pkg.zip", "zip": true}"#;
/// let config: Config = serde_json::from_str(json).unwrap();
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.manifest_path(), "/src/manifest.json");
/// assert_eq!(config.archive_path(), "/out/pkg.zip");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Directory to watch and to archive or mirror from.
    pub watch_dir: Utf8PathBuf,

    /// Destination directory for the archive or the mirrored tree.
    pub zip_dir: Utf8PathBuf,

    /// Manifest file name, relative to [`watch_dir`](Self::watch_dir).
    pub json_file: String,

    /// Archive file name inside [`zip_dir`](Self::zip_dir), used in archive mode.
    pub zip_file_name: String,

    /// `true` produces an archive, `false` mirrors the directory.
    pub zip: bool,

    /// Subscribe the watched tree recursively, so directories created after
    /// startup are watched too.
    ///
    /// Off by default: only the directories present at startup are watched.
    pub recursive: bool,
}

impl Config {
    /// Reads the configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file is missing or unreadable and
    /// [`ConfigError::Parse`] if it is not a JSON object of the expected shape.
    pub fn load(path: impl AsRef<Utf8Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let config: Self =
            serde_json::from_str(&contents).map_err(|e| ConfigError::parse(path, e))?;

        tracing::debug!(
            path = %path,
            watch_dir = %config.watch_dir,
            zip_dir = %config.zip_dir,
            zip = config.zip,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Returns a copy with both directories resolved to absolute,
    /// normalized paths (see [`resolve_dir`]).
    ///
    /// Run this once at startup: the resolved configuration no longer depends
    /// on the working directory or on how the directories were spelled.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Resolve`] if either directory cannot be resolved.
    pub fn resolve(&self) -> Result<Self, ConfigError> {
        let watch_dir =
            resolve_dir(&self.watch_dir).map_err(|e| ConfigError::resolve(&self.watch_dir, e))?;
        let zip_dir =
            resolve_dir(&self.zip_dir).map_err(|e| ConfigError::resolve(&self.zip_dir, e))?;

        Ok(Self {
            watch_dir,
            zip_dir,
            ..self.clone()
        })
    }

    /// Checks the startup invariants.
    ///
    /// Directories are compared after resolution, so `pack`, `./pack` and the
    /// absolute path of `pack` are all the same directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SameDirectory`] when the watched directory and
    /// the output directory resolve to the same path, and
    /// [`ConfigError::Resolve`] if either cannot be resolved.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let resolved = self.resolve()?;
        if resolved.watch_dir == resolved.zip_dir {
            return Err(ConfigError::SameDirectory(resolved.watch_dir));
        }
        Ok(())
    }

    /// Returns the full path of the manifest file.
    #[must_use]
    pub fn manifest_path(&self) -> Utf8PathBuf {
        self.watch_dir.join(&self.json_file)
    }

    /// Returns the full path of the archive file.
    #[must_use]
    pub fn archive_path(&self) -> Utf8PathBuf {
        self.zip_dir.join(&self.zip_file_name)
    }

    /// Returns `true` if the output directory lies inside the watched tree.
    ///
    /// Exports into such a directory produce filesystem events of their own.
    /// Both directories are resolved first; if that fails the configured
    /// spellings are compared as they are.
    #[must_use]
    pub fn output_inside_watch_dir(&self) -> bool {
        self.resolve().unwrap_or_else(|_| self.clone()).nests_output()
    }

    fn nests_output(&self) -> bool {
        self.zip_dir != self.watch_dir && self.zip_dir.starts_with(&self.watch_dir)
    }
}
