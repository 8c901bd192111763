//! SHA-256 checksums for release archives.

use crate::error::{Error, Result};
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::Read;
use std::path::Path;

/// Chunk size for reading files during hashing (64KB)
const CHUNK_SIZE: usize = 64 * 1024;

/// Algorithm label used in Board Manager index files.
pub const ALGORITHM: &str = "SHA-256";

/// Hex-encoded SHA-256 digest.
///
/// Displays in the index form `SHA-256:<hex>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksum {
    hex: String,
}

impl Checksum {
    pub fn hex(&self) -> &str {
        &self.hex
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", ALGORITHM, self.hex)
    }
}

/// Stream a reader through SHA-256 in fixed-size chunks.
pub fn sha256_reader(reader: &mut impl Read) -> std::io::Result<Checksum> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(Checksum {
        hex: hex::encode(hasher.finalize()),
    })
}

/// Hash a file on disk. The file must already be fully written and closed.
pub fn sha256_file(path: &Path) -> Result<Checksum> {
    let mut f = std::fs::File::open(path).map_err(Error::io("cannot open", path))?;
    sha256_reader(&mut f).map_err(Error::io("read error in", path))
}
