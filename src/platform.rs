//! `platform.txt` patching
//!
//! Renames the core and pins its version by literal substring replacement.

use crate::config::PlatformPatch;
use crate::error::{Error, Result};
use crate::output;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Patched,
    /// The metadata file does not exist; nothing was written.
    Missing,
}

/// Apply both replacements to `text`. Every occurrence is replaced.
pub fn apply(text: &str, patch: &PlatformPatch) -> String {
    text.replace(&patch.name_from, &patch.name_to)
        .replace(&patch.version_from, &patch.version_to)
}

/// Patch the metadata file in place. A missing file is a warning, not an error.
pub fn patch_file(path: &Path, patch: &PlatformPatch) -> Result<PatchOutcome> {
    if !path.is_file() {
        output::warning(&format!("{} not found!", path.display()));
        return Ok(PatchOutcome::Missing);
    }

    let text = std::fs::read_to_string(path).map_err(Error::io("cannot read", path))?;
    std::fs::write(path, apply(&text, patch)).map_err(Error::io("cannot write", path))?;
    output::detail(&format!("patched name and version in {}", path.display()));
    Ok(PatchOutcome::Patched)
}
