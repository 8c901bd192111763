//! Vendor archive extraction
//!
//! Native zip extraction (no external tools needed) plus discovery of the
//! archive's top-level directory.

use crate::error::{Error, Result};
use crate::output;
use crate::progress;
use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Top-level directory names implied by a set of archive entry names.
///
/// A first path segment counts as a directory when the entry name continues
/// past it (`esp32-2.0.17/platform.txt`) or ends with `/` (`esp32-2.0.17/`).
/// Bare top-level files are ignored.
pub fn top_level_dirs<'a>(names: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
    names
        .into_iter()
        .filter_map(|name| {
            let name = name.trim_start_matches("./");
            let (top, _) = name.split_once('/')?;
            (!top.is_empty() && top != "..").then(|| top.to_string())
        })
        .collect()
}

/// Entry names of a zip archive.
pub fn entry_names(archive_path: &Path) -> Result<Vec<String>> {
    let file = File::open(archive_path).map_err(Error::io("cannot open", archive_path))?;
    let archive = zip::ZipArchive::new(file)?;
    Ok(archive.file_names().map(str::to_string).collect())
}

/// Unpack a zip archive into `dest`, creating it if needed.
///
/// Entries whose names would escape `dest` are skipped.
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive_path).map_err(Error::io("cannot open", archive_path))?;
    let mut archive = zip::ZipArchive::new(file)?;

    std::fs::create_dir_all(dest).map_err(Error::io("cannot create directory", dest))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;

        let outpath = match entry.enclosed_name() {
            Some(path) => dest.join(path),
            None => {
                output::warning(&format!("skipping unsafe zip entry: {}", entry.name()));
                continue;
            }
        };

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath)
                .map_err(Error::io("cannot create directory", &outpath))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent).map_err(Error::io("cannot create directory", parent))?;
        }

        let mut outfile = File::create(&outpath).map_err(Error::io("cannot create", &outpath))?;
        std::io::copy(&mut entry, &mut outfile).map_err(Error::io("write error for", &outpath))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode)).ok();
            }
        }
    }

    Ok(())
}

/// Extract into a fresh `dest` and return the single top-level directory.
///
/// Any stale `dest` from an earlier failed run is wiped first. Fails with
/// [`Error::NoTopLevelDir`] when the archive holds no directory and
/// [`Error::AmbiguousTopLevel`] when it holds more than one.
pub fn extract_single_root(archive_path: &Path, dest: &Path) -> Result<PathBuf> {
    let filename = archive_path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "archive".to_string());

    let names = entry_names(archive_path)?;
    let tops = top_level_dirs(names.iter().map(String::as_str));
    output::detail(&format!(
        "zip contains top-level: {}",
        tops.iter().cloned().collect::<Vec<_>>().join(", ")
    ));

    crate::fs_utils::remove_path(dest)?;
    progress::with_spinner(&format!("extracting {}", filename), || {
        extract_zip(archive_path, dest)
    })?;

    let dirs: Vec<String> = tops
        .into_iter()
        .filter(|name| dest.join(name).is_dir())
        .collect();

    match dirs.as_slice() {
        [] => Err(Error::NoTopLevelDir(dest.to_path_buf())),
        [single] => Ok(dest.join(single)),
        _ => Err(Error::AmbiguousTopLevel(dirs)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for (name, data) in entries {
            if name.ends_with('/') {
                zip.add_directory(*name, options).unwrap();
            } else {
                zip.start_file(*name, options).unwrap();
                zip.write_all(data.as_bytes()).unwrap();
            }
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_top_level_dirs() {
        let names = [
            "esp32-2.0.17/",
            "esp32-2.0.17/platform.txt",
            "esp32-2.0.17/cores/esp32/Arduino.h",
            "README.md",
        ];
        let tops = top_level_dirs(names);
        assert_eq!(tops.into_iter().collect::<Vec<_>>(), vec!["esp32-2.0.17"]);
    }

    #[test]
    fn test_top_level_dirs_files_only() {
        assert!(top_level_dirs(["a.txt", "b.txt"]).is_empty());
    }

    #[test]
    fn test_extract_zip_with_nested_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive_path = temp_dir.path().join("nested.zip");
        let extract_dir = temp_dir.path().join("extracted");
        write_zip(
            &archive_path,
            &[("foo/bar/", ""), ("foo/bar/baz.txt", "nested zip content")],
        );

        extract_zip(&archive_path, &extract_dir).unwrap();

        assert_eq!(
            std::fs::read_to_string(extract_dir.join("foo/bar/baz.txt")).unwrap(),
            "nested zip content"
        );
    }

    #[test]
    fn test_extract_zip_skips_escaping_entries() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive_path = temp_dir.path().join("evil.zip");
        let extract_dir = temp_dir.path().join("extracted");
        write_zip(
            &archive_path,
            &[("../evil.txt", "pwned"), ("ok/good.txt", "fine")],
        );

        extract_zip(&archive_path, &extract_dir).unwrap();

        assert!(!temp_dir.path().join("evil.txt").exists());
        assert!(extract_dir.join("ok/good.txt").exists());
    }

    #[test]
    fn test_extract_single_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive_path = temp_dir.path().join("esp32.zip");
        let extract_dir = temp_dir.path().join("_temp_extract");
        write_zip(&archive_path, &[("esp32-2.0.17/platform.txt", "name=x")]);

        // stale leftovers are wiped
        std::fs::create_dir_all(extract_dir.join("old-run")).unwrap();

        let root = extract_single_root(&archive_path, &extract_dir).unwrap();
        assert_eq!(root, extract_dir.join("esp32-2.0.17"));
        assert!(root.join("platform.txt").is_file());
        assert!(!extract_dir.join("old-run").exists());
    }

    #[test]
    fn test_extract_single_root_no_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive_path = temp_dir.path().join("flat.zip");
        write_zip(&archive_path, &[("platform.txt", "name=x")]);

        let err = extract_single_root(&archive_path, &temp_dir.path().join("out")).unwrap_err();
        assert!(matches!(err, Error::NoTopLevelDir(_)));
    }

    #[test]
    fn test_extract_single_root_ambiguous() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive_path = temp_dir.path().join("two.zip");
        write_zip(&archive_path, &[("a/x.txt", "1"), ("b/y.txt", "2")]);

        let err = extract_single_root(&archive_path, &temp_dir.path().join("out")).unwrap_err();
        match err {
            Error::AmbiguousTopLevel(dirs) => assert_eq!(dirs, vec!["a", "b"]),
            other => panic!("unexpected error: {other}"),
        }
    }
}
