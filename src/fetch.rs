//! Vendor archive download
//!
//! The archive is streamed into a temp file next to the cache location and
//! renamed into place only after the whole body has been written, so an
//! interrupted transfer never looks like a cache hit.

use crate::config;
use crate::error::{Error, Result};
use crate::fs_utils;
use crate::output;
use crate::progress::{self, ProgressGuard};
use std::io::{Read, Write};
use std::path::Path;

const BUFFER_SIZE: usize = 8192;

/// What [`ensure_archive`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The cache file already existed; no request was made.
    Cached,
    Downloaded { bytes: u64 },
}

/// Make sure the archive at `dest` exists, downloading it from `url` if not.
pub fn ensure_archive(url: &str, dest: &Path) -> Result<FetchOutcome> {
    let filename = dest
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "download".to_string());

    if dest.is_file() {
        output::skip(&format!("Found existing {}, skipping download", filename));
        return Ok(FetchOutcome::Cached);
    }

    output::action(&format!("Downloading {}", url));
    output::detail(&format!("-> {}", dest.display()));

    let bytes = download(url, dest, &filename)?;
    output::detail(&format!(
        "downloaded {} ({:.1} MB)",
        filename,
        fs_utils::mebibytes(bytes)
    ));
    Ok(FetchOutcome::Downloaded { bytes })
}

fn download(url: &str, dest: &Path, filename: &str) -> Result<u64> {
    fs_utils::ensure_parent_dir(dest)?;
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let response = ureq::get(url)
        .timeout(config::http_timeout())
        .call()
        .map_err(|e| Error::Download {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let pb = progress::create_download_progress(&format!("downloading {}", filename));
    let _guard = ProgressGuard::new(&pb);
    if let Some(len) = response
        .header("content-length")
        .and_then(|s| s.parse().ok())
    {
        progress::upgrade_to_bytes(&pb, len);
    }

    // Dropped (and deleted) on any early return below.
    let mut tmp = tempfile::Builder::new()
        .prefix(".download-")
        .tempfile_in(dir)
        .map_err(Error::io("cannot create temp file in", dir))?;

    let mut reader = response.into_reader();
    let mut buffer = [0u8; BUFFER_SIZE];
    let mut total_bytes = 0u64;

    loop {
        let n = reader
            .read(&mut buffer)
            .map_err(Error::io("read error while downloading to", dest))?;
        if n == 0 {
            break;
        }
        tmp.write_all(&buffer[..n])
            .map_err(Error::io("write error for", tmp.path()))?;
        total_bytes += n as u64;
        pb.set_position(total_bytes);
    }

    tmp.as_file()
        .sync_all()
        .map_err(Error::io("cannot sync", tmp.path()))?;
    tmp.persist(dest)
        .map_err(|e| Error::io("cannot move download into", dest)(e.error))?;

    Ok(total_bytes)
}
