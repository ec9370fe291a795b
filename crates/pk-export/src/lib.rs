//! Directory walking, ZIP archiving and mirroring for packsync.
//!
//! Both exporters share one traversal, [`TreeWalker`], which lists every
//! entry below a root in a deterministic order (lexicographic per
//! directory, parents before children). The root itself is never exported.
//!
//! - [`build_archive`] writes the tree into a single ZIP file: directories as
//!   `name/` entries, files Deflate-compressed.
//! - [`mirror_tree`] replicates the tree into a destination directory,
//!   overwriting files that already exist there and leaving unrelated files
//!   alone.
//!
//! # Example
//!
//! ```no_run
//! use camino::Utf8Path;
//! use pk_export::{build_archive, mirror_tree};
//!
//! # fn main() -> Result<(), pk_export::ExportError> {
//! let summary = build_archive(Utf8Path::new("/src"), Utf8Path::new("/out/pkg.zip"))?;
//! println!("archived {} files", summary.files);
//!
//! mirror_tree(Utf8Path::new("/src"), Utf8Path::new("/out"))?;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod archive;
pub mod error;
pub mod mirror;
pub mod walker;

pub use archive::build_archive;
pub use error::ExportError;
pub use mirror::mirror_tree;
pub use walker::{EntryKind, TreeEntry, TreeWalker};

/// Counts of what an export wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Directory entries written.
    pub directories: usize,

    /// File entries written.
    pub files: usize,

    /// File content bytes copied (uncompressed).
    pub bytes: u64,
}
