//! Error types for setup and packaging.

use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that abort a setup or build run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{} directory not found (run bpad-setup first)", .0.display())]
    MissingVendorTree(PathBuf),

    #[error("{} not found (run bpad-setup first)", .0.display())]
    MissingMetadata(PathBuf),

    #[error("version cannot be empty")]
    EmptyVersion,

    #[error("download failed: {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("could not find extracted directory in {}", .0.display())]
    NoTopLevelDir(PathBuf),

    #[error("archive has more than one top-level directory: {}", .0.join(", "))]
    AmbiguousTopLevel(Vec<String>),

    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unsafe path (contains .. or is absolute): {}", .0.display())]
    UnsafePath(PathBuf),

    #[error("release directory {} is inside the vendor tree {}", release.display(), vendor.display())]
    ReleaseInsideVendor { release: PathBuf, vendor: PathBuf },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl Error {
    /// Wrap an I/O error with the operation and path that failed.
    pub fn io(action: &str, path: &Path) -> impl FnOnce(std::io::Error) -> Error + use<> {
        let context = format!("{} {}", action, path.display());
        move |source| Error::Io { context, source }
    }
}
