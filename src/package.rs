//! Package-and-checksum
//!
//! Zips the customized vendor tree into `release/` and computes the checksum
//! the Board Manager index needs.

use crate::archive;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fs_utils;
use crate::hash;
use crate::manifest::ReleaseManifest;
use crate::output;
use crate::progress;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

pub const VERSION_PROMPT: &str = "Enter release version number (e.g., 0.1.0): ";

/// An archive already present in the release directory.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseEntry {
    pub name: String,
    pub bytes: u64,
}

/// Fail unless setup has produced the vendor tree and its metadata file.
pub fn check_preconditions(config: &Config) -> Result<()> {
    if !config.vendor_dir.is_dir() {
        return Err(Error::MissingVendorTree(config.vendor_dir.clone()));
    }
    let metadata = config.metadata_path();
    if !metadata.is_file() {
        return Err(Error::MissingMetadata(metadata));
    }
    Ok(())
}

/// Prompt on `out` and read one version line from `input`.
pub fn read_version(input: &mut impl BufRead, out: &mut impl Write) -> Result<String> {
    let stdout = Path::new("<stdout>");
    write!(out, "{}", VERSION_PROMPT).map_err(Error::io("cannot write to", stdout))?;
    out.flush().map_err(Error::io("cannot flush", stdout))?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .map_err(Error::io("cannot read from", Path::new("<stdin>")))?;
    normalize_version(&line)
}

/// Trim a raw version label. Empty is an error; non-semver only warns.
pub fn normalize_version(raw: &str) -> Result<String> {
    let version = raw.trim();
    if version.is_empty() {
        return Err(Error::EmptyVersion);
    }
    if semver::Version::parse(version).is_err() {
        output::warning(&format!("'{}' is not a semantic version", version));
    }
    Ok(version.to_string())
}

pub fn version_tag(version: &str) -> String {
    format!("v{}", version)
}

/// `<product>-<tag>-<sha>.zip`
pub fn archive_name(product: &str, tag: &str, short_sha: &str) -> String {
    format!("{}-{}-{}.zip", product, tag, short_sha)
}

/// Files in the release directory, sorted by name. A missing directory is empty.
pub fn list_releases(dir: &Path) -> Result<Vec<ReleaseEntry>> {
    let read = match std::fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::io("cannot list", dir)(e)),
    };

    let mut entries = Vec::new();
    for entry in read {
        let entry = entry.map_err(Error::io("cannot list", dir))?;
        let meta = entry
            .metadata()
            .map_err(Error::io("cannot stat", &entry.path()))?;
        if meta.is_file() {
            entries.push(ReleaseEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                bytes: meta.len(),
            });
        }
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Build the release archive for `version` at revision `short_sha`.
pub fn build(config: &Config, version: &str, short_sha: &str) -> Result<ReleaseManifest> {
    check_preconditions(config)?;

    let tag = version_tag(version);
    let file_name = archive_name(&config.release.product, &tag, short_sha);

    std::fs::create_dir_all(&config.release_dir)
        .map_err(Error::io("cannot create directory", &config.release_dir))?;
    let zip_path: PathBuf = config.release_dir.join(&file_name);

    output::info(&format!(
        "Existing releases in {}:",
        config.release_dir.display()
    ));
    for release in list_releases(&config.release_dir)? {
        output::detail(&format!(
            "{} ({:.1} MB)",
            release.name,
            fs_utils::mebibytes(release.bytes)
        ));
    }
    if zip_path.exists() {
        output::warning(&format!("overwriting existing {}", file_name));
    }

    output::action(&format!("Creating zip: {}", zip_path.display()));
    let summary = progress::with_spinner(&format!("zipping {}", file_name), || {
        archive::create_zip(&config.vendor_dir, &zip_path)
    })?;
    output::detail(&format!("{} files", summary.files));

    // create_zip has closed the file; hashing sees the final bytes
    let checksum = hash::sha256_file(&zip_path)?;

    Ok(ReleaseManifest {
        version: version.to_string(),
        tag,
        file_name,
        size: summary.bytes,
        checksum,
        index_file: config.release.index_file.clone(),
        download_base: config.release.download_base.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_archive_name() {
        assert_eq!(
            archive_name("bpad_proto1", "v0.1.0", "abc1234"),
            "bpad_proto1-v0.1.0-abc1234.zip"
        );
    }

    #[test]
    fn test_read_version_trims_and_prompts() {
        let mut input = &b"  0.3.1 \n"[..];
        let mut out = Vec::new();
        assert_eq!(read_version(&mut input, &mut out).unwrap(), "0.3.1");
        assert_eq!(String::from_utf8(out).unwrap(), VERSION_PROMPT);
    }

    #[test]
    fn test_read_version_empty_is_error() {
        let mut out = Vec::new();
        assert!(matches!(
            read_version(&mut &b"\n"[..], &mut out),
            Err(Error::EmptyVersion)
        ));
        // EOF without input
        assert!(matches!(
            read_version(&mut &b""[..], &mut out),
            Err(Error::EmptyVersion)
        ));
    }

    #[test]
    fn test_non_semver_is_accepted() {
        assert_eq!(normalize_version("beta-2").unwrap(), "beta-2");
    }

    #[test]
    fn test_list_releases_sorted_files_only() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("b.zip"), vec![0u8; 10]).unwrap();
        std::fs::write(temp.path().join("a.zip"), vec![0u8; 5]).unwrap();
        std::fs::create_dir(temp.path().join("subdir")).unwrap();

        let releases = list_releases(temp.path()).unwrap();
        assert_eq!(
            releases,
            vec![
                ReleaseEntry { name: "a.zip".into(), bytes: 5 },
                ReleaseEntry { name: "b.zip".into(), bytes: 10 },
            ]
        );
    }

    #[test]
    fn test_list_releases_missing_dir() {
        let temp = tempdir().unwrap();
        assert!(list_releases(&temp.path().join("release")).unwrap().is_empty());
    }

    #[test]
    fn test_preconditions() {
        let temp = tempdir().unwrap();
        let config = Config::new(temp.path());
        assert!(matches!(
            check_preconditions(&config),
            Err(Error::MissingVendorTree(_))
        ));

        std::fs::create_dir_all(&config.vendor_dir).unwrap();
        assert!(matches!(
            check_preconditions(&config),
            Err(Error::MissingMetadata(_))
        ));

        std::fs::write(config.metadata_path(), "name=x").unwrap();
        check_preconditions(&config).unwrap();
    }
}
