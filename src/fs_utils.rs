//! Filesystem helpers shared by setup and packaging.

use crate::error::{Error, Result};
use std::path::{Component, Path};
use walkdir::WalkDir;

/// Ensure a file's parent directory exists.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(Error::io("cannot create directory", parent))?;
        }
    }
    Ok(())
}

/// Remove a file or directory tree if present.
pub fn remove_path(path: &Path) -> Result<()> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(Error::io("cannot stat", path)(e)),
    };
    if meta.is_dir() {
        std::fs::remove_dir_all(path).map_err(Error::io("cannot remove", path))
    } else {
        std::fs::remove_file(path).map_err(Error::io("cannot remove", path))
    }
}

/// Copy a single file, creating parent directories as needed.
pub fn copy_file(src: &Path, dest: &Path) -> Result<u64> {
    ensure_parent_dir(dest)?;
    std::fs::copy(src, dest).map_err(|e| Error::Io {
        context: format!("copy failed: {} -> {}", src.display(), dest.display()),
        source: e,
    })
}

/// Recursively copy a directory. Symlinks are recreated on Unix and skipped elsewhere.
pub fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io {
            context: format!("cannot walk {}", src.display()),
            source: e.into(),
        })?;
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dest.join(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            std::fs::create_dir_all(&target).map_err(Error::io("cannot create directory", &target))?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            copy_file(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dest: &Path) -> Result<()> {
    let link = std::fs::read_link(src).map_err(Error::io("cannot read link", src))?;
    ensure_parent_dir(dest)?;
    std::os::unix::fs::symlink(&link, dest).map_err(Error::io("cannot create link", dest))
}

#[cfg(not(unix))]
fn copy_symlink(_src: &Path, _dest: &Path) -> Result<()> {
    Ok(())
}

/// Replace `dest` with a copy of `src` (file or directory).
///
/// An existing directory at `dest` is removed first, so the result mirrors
/// `src` exactly rather than merging into it.
pub fn replace_with_copy(src: &Path, dest: &Path) -> Result<()> {
    if src.is_dir() {
        remove_path(dest)?;
        copy_tree(src, dest)
    } else {
        if dest.is_dir() {
            remove_path(dest)?;
        }
        copy_file(src, dest).map(|_| ())
    }
}

/// Check if path is safe (no path traversal).
///
/// Rejects absolute paths and paths containing "..".
pub fn is_safe_path(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && !path.is_absolute()
        && !path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_) | Component::RootDir))
}

/// Validate a path is safe, returning error if not.
pub fn validate_safe_path(path: &Path) -> Result<()> {
    if !is_safe_path(path) {
        return Err(Error::UnsafePath(path.to_path_buf()));
    }
    Ok(())
}

/// Size in binary megabytes.
pub fn mebibytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}
