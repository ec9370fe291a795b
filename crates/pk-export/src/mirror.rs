//! Directory mirroring.
//!
//! [`mirror_tree`] replicates the source tree into a destination directory.
//! It only ever adds or overwrites: files in the destination without a
//! counterpart in the source are left where they are.

use std::fs::{self, DirBuilder, File};
use std::io;

use camino::Utf8Path;
use pk_core::resolve_dir;

use crate::ExportSummary;
use crate::error::ExportError;
use crate::walker::{TreeEntry, TreeWalker};

/// Copies every entry under `source` into `target`.
///
/// Directories are created along with any missing parents; on unix, a newly
/// created directory takes the permission bits of its source directory.
/// Files are created or truncated and receive the full source content with
/// default creation permissions. The destination root is created if needed.
///
/// Both directories are resolved to absolute paths first, so a destination
/// nested in the source is recognized and skipped however the two were
/// spelled.
///
/// # Errors
///
/// The first failure while walking or copying aborts the mirror and is
/// returned. Entries copied before the failure stay in place.
pub fn mirror_tree(source: &Utf8Path, target: &Utf8Path) -> Result<ExportSummary, ExportError> {
    let source = resolve_dir(source).map_err(|e| ExportError::io(source, e))?;
    let target = resolve_dir(target).map_err(|e| ExportError::io(target, e))?;
    let entries = TreeWalker::new(&source)?.entries()?;

    fs::create_dir_all(&target).map_err(|e| ExportError::io(&target, e))?;
    let mut summary = ExportSummary::default();

    for entry in &entries {
        let destination = target.join(&entry.relative);

        // A destination nested in the source shows up in its own walk.
        if entry.path.starts_with(&target) {
            continue;
        }

        if entry.is_dir() {
            create_dir(entry, &destination)?;
            summary.directories += 1;
            continue;
        }

        let mut reader = File::open(&entry.path).map_err(|e| ExportError::io(&entry.path, e))?;
        let mut writer = File::create(&destination).map_err(|e| ExportError::io(&destination, e))?;
        summary.bytes +=
            io::copy(&mut reader, &mut writer).map_err(|e| ExportError::io(&destination, e))?;
        summary.files += 1;
    }

    tracing::info!(
        source = %source,
        target = %target,
        directories = summary.directories,
        files = summary.files,
        bytes = summary.bytes,
        "Mirror updated"
    );

    Ok(summary)
}

fn create_dir(entry: &TreeEntry, destination: &Utf8Path) -> Result<(), ExportError> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    if let Some(mode) = entry.unix_mode()? {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = entry;

    builder
        .create(destination)
        .map_err(|e| ExportError::io(destination, e))
}
