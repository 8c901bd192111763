//! Reproducible release zips
//!
//! Entries are written in sorted traversal order with pinned timestamps and
//! normalized permissions, so the same tree always produces the same bytes.

use crate::error::{Error, Result};
use crate::output;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Component, Path};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Summary of a written archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub files: usize,
    pub bytes: u64,
}

/// Zip every regular file under `source_dir` into `zip_path`.
///
/// Symlinks to files are followed and stored as plain entries. Symlinks to
/// directories and dangling links are skipped with a warning.
///
/// Entry names are relative to the parent of `source_dir`, so the archive's
/// single root is `source_dir`'s own name. The file is finished, synced and
/// closed before returning. On error the partial file is removed.
pub fn create_zip(source_dir: &Path, zip_path: &Path) -> Result<ArchiveSummary> {
    let result = write_zip(source_dir, zip_path);
    if result.is_err() {
        let _ = std::fs::remove_file(zip_path);
    }
    result
}

fn write_zip(source_dir: &Path, zip_path: &Path) -> Result<ArchiveSummary> {
    let base = source_dir.parent().unwrap_or(Path::new(""));
    let file = File::create(zip_path).map_err(Error::io("cannot create", zip_path))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));

    let mut files = 0usize;
    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io {
            context: format!("cannot walk {}", source_dir.display()),
            source: e.into(),
        })?;
        let path = entry.path();
        if entry.path_is_symlink() {
            // Linked files are stored by content; anything else is left out.
            if !std::fs::metadata(path).is_ok_and(|m| m.is_file()) {
                output::warning(&format!("skipping symlink: {}", path.display()));
                continue;
            }
        } else if !entry.file_type().is_file() {
            continue;
        }

        let rel = path.strip_prefix(base).unwrap_or(path);
        zip.start_file(entry_name(rel), file_options(path)?)?;
        let mut src = File::open(path).map_err(Error::io("cannot open", path))?;
        std::io::copy(&mut src, &mut zip).map_err(Error::io("cannot compress", path))?;
        files += 1;
    }

    let mut writer = zip.finish()?;
    writer.flush().map_err(Error::io("cannot flush", zip_path))?;
    let file = writer
        .into_inner()
        .map_err(|e| Error::io("cannot flush", zip_path)(e.into_error()))?;
    file.sync_all().map_err(Error::io("cannot sync", zip_path))?;
    let bytes = file
        .metadata()
        .map_err(Error::io("cannot stat", zip_path))?
        .len();
    drop(file);

    Ok(ArchiveSummary { files, bytes })
}

/// Zip entry name for a relative path: normal components joined with `/`.
pub fn entry_name(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn file_options(path: &Path) -> Result<SimpleFileOptions> {
    Ok(SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(normalized_mode(path)?))
}

#[cfg(unix)]
fn normalized_mode(path: &Path) -> Result<u32> {
    use std::os::unix::fs::PermissionsExt;
    let mode = std::fs::metadata(path)
        .map_err(Error::io("cannot stat", path))?
        .permissions()
        .mode();
    Ok(if mode & 0o111 != 0 { 0o755 } else { 0o644 })
}

#[cfg(not(unix))]
fn normalized_mode(_path: &Path) -> Result<u32> {
    Ok(0o644)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;

    fn sample_tree(root: &Path) -> std::path::PathBuf {
        let tree = root.join("esp32");
        std::fs::create_dir_all(tree.join("variants/bpad_proto1")).unwrap();
        std::fs::create_dir_all(tree.join("empty")).unwrap();
        std::fs::write(tree.join("platform.txt"), "name=bpad").unwrap();
        std::fs::write(tree.join("boards.txt"), "bpad.name=bpad").unwrap();
        std::fs::write(tree.join("variants/bpad_proto1/pins_arduino.h"), "#pragma once").unwrap();
        tree
    }

    #[test]
    fn test_entry_names_anchor_at_tree_name() {
        let temp = tempdir().unwrap();
        let tree = sample_tree(temp.path());
        let zip_path = temp.path().join("out.zip");

        let summary = create_zip(&tree, &zip_path).unwrap();
        assert_eq!(summary.files, 3);
        assert_eq!(summary.bytes, std::fs::metadata(&zip_path).unwrap().len());

        let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        // sorted traversal; only regular files
        assert_eq!(
            names,
            vec![
                "esp32/boards.txt",
                "esp32/platform.txt",
                "esp32/variants/bpad_proto1/pins_arduino.h",
            ]
        );
    }

    #[test]
    fn test_entries_are_deflated_and_readable() {
        let temp = tempdir().unwrap();
        let tree = sample_tree(temp.path());
        let zip_path = temp.path().join("out.zip");
        create_zip(&tree, &zip_path).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let mut entry = archive.by_name("esp32/platform.txt").unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Deflated);
        let mut text = String::new();
        entry.read_to_string(&mut text).unwrap();
        assert_eq!(text, "name=bpad");
    }

    #[cfg(unix)]
    #[test]
    fn test_file_symlinks_are_stored_by_content() {
        let temp = tempdir().unwrap();
        let tree = sample_tree(temp.path());
        std::os::unix::fs::symlink("platform.txt", tree.join("linked.txt")).unwrap();
        std::os::unix::fs::symlink("variants", tree.join("linked_dir")).unwrap();
        std::os::unix::fs::symlink("gone.txt", tree.join("dangling.txt")).unwrap();
        let zip_path = temp.path().join("out.zip");

        let summary = create_zip(&tree, &zip_path).unwrap();
        assert_eq!(summary.files, 4);

        let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        assert!(archive.by_name("esp32/dangling.txt").is_err());
        assert!(archive.by_name("esp32/linked_dir/bpad_proto1/pins_arduino.h").is_err());
        let mut entry = archive.by_name("esp32/linked.txt").unwrap();
        let mut text = String::new();
        entry.read_to_string(&mut text).unwrap();
        assert_eq!(text, "name=bpad");
    }

    #[test]
    fn test_missing_source_removes_partial_zip() {
        let temp = tempdir().unwrap();
        let zip_path = temp.path().join("out.zip");

        assert!(create_zip(&temp.path().join("nope"), &zip_path).is_err());
        assert!(!zip_path.exists());
    }

    #[test]
    fn test_entry_name_uses_forward_slashes() {
        let rel = Path::new("esp32").join("variants").join("x.h");
        assert_eq!(entry_name(&rel), "esp32/variants/x.h");
    }
}
