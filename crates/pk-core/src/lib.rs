//! Core types, errors, and utilities for packsync.
//!
//! This crate provides the pieces shared across the workspace:
//!
//! - [`Config`]: the static configuration record read once at startup
//! - [`Manifest`]: the JSON manifest whose identifiers are regenerated on
//!   every qualifying change
//! - [`resolve_dir`]: the path normalization behind every directory comparison
//! - [`ConfigError`] and [`ManifestError`] for consistent error handling
//!
//! # Example
//!
//! ```no_run
//! use pk_core::{Config, rewrite_manifest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load("config.json")?;
//! config.validate()?;
//!
//! let manifest = rewrite_manifest(&config.manifest_path())?;
//! println!("new header id: {}", manifest.header.uuid);
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod manifest;
pub mod paths;

pub use config::{Config, DEFAULT_CONFIG_FILE};
pub use error::{ConfigError, ManifestError};
pub use manifest::{Manifest, ManifestHeader, ManifestModule, rewrite_manifest};
pub use paths::resolve_dir;
