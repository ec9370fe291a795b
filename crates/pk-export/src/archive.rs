//! ZIP snapshot of the watched tree.
//!
//! [`build_archive`] writes every entry below the source root into one ZIP
//! file. Entry names are the `/`-joined paths relative to the root;
//! directories get a trailing `/` and no content, files are Deflate
//! compressed with their full content.

use std::fs::{self, File};
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use pk_core::resolve_dir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::ExportSummary;
use crate::error::ExportError;
use crate::walker::{TreeEntry, TreeWalker};

/// Archives the tree under `source` into the ZIP file at `target`.
///
/// An existing file at `target` is truncated and replaced. Missing parent
/// directories of `target` are created. If `target` itself lies inside
/// `source`, it is left out of the archive; both paths are resolved to
/// absolute form before that comparison.
///
/// # Errors
///
/// Any failure while walking, creating an entry or copying content aborts
/// the archive and is returned. The partially written file is left behind.
pub fn build_archive(source: &Utf8Path, target: &Utf8Path) -> Result<ExportSummary, ExportError> {
    let source = resolve_dir(source).map_err(|e| ExportError::io(source, e))?;
    let target = resolve_file(target)?;
    let entries = TreeWalker::new(&source)?.entries()?;

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| ExportError::io(parent, e))?;
    }
    let file = File::create(&target).map_err(|e| ExportError::io(&target, e))?;
    let mut archive = ZipWriter::new(file);
    let mut summary = ExportSummary::default();

    for entry in &entries {
        if entry.path == target {
            continue;
        }

        let options = entry_options(entry)?;
        let name = entry.portable_name();

        if entry.is_dir() {
            archive.add_directory(format!("{name}/"), options)?;
            summary.directories += 1;
            continue;
        }

        archive.start_file(name, options)?;
        let mut reader = File::open(&entry.path).map_err(|e| ExportError::io(&entry.path, e))?;
        summary.bytes +=
            io::copy(&mut reader, &mut archive).map_err(|e| ExportError::io(&entry.path, e))?;
        summary.files += 1;
    }

    archive.finish()?;

    tracing::info!(
        source = %source,
        target = %target,
        directories = summary.directories,
        files = summary.files,
        bytes = summary.bytes,
        "Archive written"
    );

    Ok(summary)
}

/// Resolves the archive path through its parent directory.
fn resolve_file(target: &Utf8Path) -> Result<Utf8PathBuf, ExportError> {
    let Some(name) = target.file_name() else {
        return Err(ExportError::io(
            target,
            io::Error::new(io::ErrorKind::InvalidInput, "archive path has no file name"),
        ));
    };
    let parent = target.parent().unwrap_or_else(|| Utf8Path::new(""));
    let parent = resolve_dir(parent).map_err(|e| ExportError::io(parent, e))?;
    Ok(parent.join(name))
}

/// Builds the per-entry ZIP options: Deflate for files, permission bits for
/// both files and directories.
fn entry_options(entry: &TreeEntry) -> Result<SimpleFileOptions, ExportError> {
    let mut options = SimpleFileOptions::default();
    if !entry.is_dir() {
        options = options.compression_method(CompressionMethod::Deflated);
    }
    if let Some(mode) = entry.unix_mode()? {
        options = options.unix_permissions(mode);
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8Path::from_path(dir.path()).expect("Invalid path").to_owned()
    }

    fn sample_tree() -> TempDir {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let root = dir.path();
        fs::create_dir_all(root.join("scripts/lib")).unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();
        fs::write(root.join("manifest.json"), r#"{"format_version": 2}"#).unwrap();
        fs::write(root.join("scripts/main.js"), "a".repeat(4096)).unwrap();
        fs::write(root.join("scripts/lib/util.js"), "export const x = 1;\n").unwrap();
        fs::write(root.join("icon.png"), [0x89u8, b'P', b'N', b'G', 0, 255]).unwrap();
        dir
    }

    fn open(path: &Utf8Path) -> ZipArchive<File> {
        ZipArchive::new(File::open(path).expect("Failed to open archive"))
            .expect("Failed to read archive")
    }

    #[test]
    fn test_archive_entry_listing() {
        let src = sample_tree();
        let out = TempDir::new().unwrap();
        let target = utf8(&out).join("pkg.zip");

        let summary = build_archive(&utf8(&src), &target).expect("Archive should be built");
        assert_eq!(summary.directories, 3);
        assert_eq!(summary.files, 4);

        let mut archive = open(&target);
        let mut listing = String::new();
        for i in 0..archive.len() {
            let file = archive.by_index(i).unwrap();
            let kind = if file.is_dir() { "dir " } else { "file" };
            listing.push_str(&format!("{kind} {}\n", file.name()));
        }

        insta::assert_snapshot!(listing.trim_end(), @r"
        dir  empty/
        file icon.png
        file manifest.json
        dir  scripts/
        dir  scripts/lib/
        file scripts/lib/util.js
        file scripts/main.js
        ");
    }

    #[test]
    fn test_archive_round_trips_content() {
        let src = sample_tree();
        let out = TempDir::new().unwrap();
        let source = utf8(&src);
        let target = utf8(&out).join("pkg.zip");

        build_archive(&source, &target).unwrap();
        let mut archive = open(&target);

        for rel in ["manifest.json", "scripts/main.js", "scripts/lib/util.js", "icon.png"] {
            let mut extracted = Vec::new();
            archive
                .by_name(rel)
                .unwrap()
                .read_to_end(&mut extracted)
                .unwrap();
            assert_eq!(extracted, fs::read(source.join(rel)).unwrap(), "{rel}");
        }
    }

    #[test]
    fn test_archive_uses_deflate_for_files() {
        let src = sample_tree();
        let out = TempDir::new().unwrap();
        let target = utf8(&out).join("pkg.zip");

        build_archive(&utf8(&src), &target).unwrap();
        let mut archive = open(&target);

        let main = archive.by_name("scripts/main.js").unwrap();
        assert_eq!(main.compression(), CompressionMethod::Deflated);
        assert!(main.compressed_size() < main.size());
    }

    #[test]
    fn test_archive_overwrites_existing_file() {
        let src = sample_tree();
        let out = TempDir::new().unwrap();
        let target = utf8(&out).join("pkg.zip");
        fs::write(&target, "not a zip file at all").unwrap();

        build_archive(&utf8(&src), &target).unwrap();
        assert_eq!(open(&target).len(), 7);
    }

    #[test]
    fn test_archive_creates_missing_parent() {
        let src = sample_tree();
        let out = TempDir::new().unwrap();
        let target = utf8(&out).join("nested/dist/pkg.zip");

        build_archive(&utf8(&src), &target).unwrap();
        assert!(target.is_file());
    }

    #[test]
    fn test_archive_skips_itself_when_inside_source() {
        let src = sample_tree();
        let source = utf8(&src);
        let target = source.join("pkg.zip");
        fs::write(&target, "previous snapshot").unwrap();

        let summary = build_archive(&source, &target).unwrap();
        assert_eq!(summary.files, 4);
        assert!(open(&target).by_name("pkg.zip").is_err());
    }

    #[test]
    fn test_archive_skips_itself_when_spelled_differently() {
        let src = sample_tree();
        let source = utf8(&src);
        let target = source.join("scripts/../pkg.zip");

        build_archive(&source.join("."), &target).unwrap();
        let summary = build_archive(&source, &target).unwrap();

        assert_eq!(summary.files, 4);
        assert!(source.join("pkg.zip").is_file());
        assert!(open(&source.join("pkg.zip")).by_name("pkg.zip").is_err());
    }

    #[test]
    fn test_archive_missing_source() {
        let out = TempDir::new().unwrap();
        let target = utf8(&out).join("pkg.zip");

        let err = build_archive(Utf8Path::new("/nonexistent/path/that/does/not/exist"), &target)
            .unwrap_err();
        assert!(matches!(err, ExportError::InvalidRoot { .. }));
        assert!(!target.exists());
    }
}
