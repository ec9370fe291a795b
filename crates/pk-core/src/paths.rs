//! Directory path resolution.
//!
//! The watched and output directories come from the configuration as typed
//! by the user: relative or absolute, with `.`/`..` segments or symlinks in
//! them. Two spellings of the same directory must compare equal before any
//! "same directory" or "nested output" decision is made, so every such
//! decision goes through [`resolve_dir`].

use std::io;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// Resolves `path` to an absolute, normalized form.
///
/// Relative paths are taken from the current working directory. `.` and
/// `..` segments are removed lexically. The longest prefix that exists on
/// disk is then canonicalized (resolving symlinks) and the missing tail, if
/// any, is appended unchanged. The path does not need to exist.
///
/// # Errors
///
/// Returns an error if the working directory cannot be determined or is not
/// valid UTF-8, or if canonicalizing the existing prefix fails for a reason
/// other than the path not existing.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use pk_core::resolve_dir;
///
/// let a = resolve_dir(Utf8Path::new("/nonexistent/pack/./dist/")).unwrap();
/// let b = resolve_dir(Utf8Path::new("/nonexistent/pack/dist/../dist")).unwrap();
/// assert_eq!(a, b);
/// ```
pub fn resolve_dir(path: &Utf8Path) -> io::Result<Utf8PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_owned()
    } else {
        current_dir()?.join(path)
    };

    let normalized = normalize(&absolute);

    let mut existing = normalized.as_path();
    let mut missing = Vec::new();
    loop {
        match existing.canonicalize_utf8() {
            Ok(mut resolved) => {
                for name in missing.iter().rev() {
                    resolved.push(name);
                }
                return Ok(resolved);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                match (existing.parent(), existing.file_name()) {
                    (Some(parent), Some(name)) => {
                        missing.push(name);
                        existing = parent;
                    }
                    _ => return Err(e),
                }
            }
            Err(e) => return Err(e),
        }
    }
}

fn current_dir() -> io::Result<Utf8PathBuf> {
    let dir = std::env::current_dir()?;
    Utf8PathBuf::try_from(dir).map_err(|e| e.into_io_error())
}

/// Drops `.` segments and folds `..` into the preceding segment.
fn normalize(path: &Utf8Path) -> Utf8PathBuf {
    let mut normalized = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}
