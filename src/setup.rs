//! Acquire-and-customize
//!
//! Rebuilds the vendor tree from the pinned vendor archive while keeping the
//! locally owned overlay files:
//!
//! 1. fetch the archive unless it is cached
//! 2. stage preserved paths into the holding area
//! 3. extract the archive and locate its single top-level directory
//! 4. park the old tree aside and move the new one into place
//! 5. restore preserved paths on top, then remove scratch directories
//! 6. patch `platform.txt`
//!
//! Nothing in the vendor tree is touched before step 4, so a malformed
//! archive leaves the existing tree intact. If a run dies between steps 4
//! and 5 the old tree is still in `_previous/` and the overlay in `_backup/`.
//! The next run sees `_previous/`, takes the overlay from `_backup/` instead
//! of the half-replaced tree, and finishes the job. A failed patch step
//! leaves no scratch directories behind.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::extract;
use crate::fetch::{self, FetchOutcome};
use crate::fs_utils;
use crate::output;
use crate::overlay::Staging;
use crate::platform::{self, PatchOutcome};
use std::path::{Path, PathBuf};

const STEPS: usize = 6;

/// Summary of a completed setup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupReport {
    pub fetch: FetchOutcome,
    /// Name of the archive's top-level directory that became the vendor tree.
    pub extracted_root: String,
    /// Preserved paths that were restored, relative to the vendor tree.
    pub restored: Vec<PathBuf>,
    pub patch: PatchOutcome,
}

/// Run the full acquire-and-customize sequence.
pub fn run(config: &Config) -> Result<SetupReport> {
    output::step(1, STEPS, "Fetching vendor archive");
    let fetch = fetch::ensure_archive(&config.vendor.url, &config.vendor.archive)?;

    output::step(2, STEPS, "Backing up custom files");
    let staging = if interrupted(config) {
        output::warning(&format!(
            "previous setup did not finish, reusing custom files from {}",
            config.backup_dir().display()
        ));
        Staging::resume(&config.preserve, &config.backup_dir())?
    } else {
        Staging::stage(&config.vendor_dir, &config.preserve, &config.backup_dir())?
    };

    output::step(
        3,
        STEPS,
        &format!("Extracting {}", config.vendor.archive.display()),
    );
    let extracted = extract::extract_single_root(&config.vendor.archive, &config.extract_dir())?;
    let extracted_root = extracted
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    output::step(
        4,
        STEPS,
        &format!("Moving {} into {}", extracted_root, config.vendor_dir.display()),
    );
    replace_tree(&extracted, &config.vendor_dir, &config.previous_dir())?;

    output::step(5, STEPS, "Restoring custom files");
    staging.restore(&config.vendor_dir)?;
    let restored = staging.staged().to_vec();

    fs_utils::remove_path(&config.extract_dir())?;
    staging.discard()?;
    fs_utils::remove_path(&config.previous_dir())?;

    output::step(6, STEPS, "Patching platform metadata");
    let patch = platform::patch_file(&config.metadata_path(), &config.platform)?;

    Ok(SetupReport {
        fetch,
        extracted_root,
        restored,
        patch,
    })
}

/// A parked old tree together with a holding area means the last run died
/// after the tree was replaced but before the overlay was put back.
fn interrupted(config: &Config) -> bool {
    config.previous_dir().exists() && config.backup_dir().is_dir()
}

/// Swap `new_tree` into `target`, parking any existing `target` at `previous`.
///
/// If the final move fails the parked tree is moved back.
fn replace_tree(new_tree: &Path, target: &Path, previous: &Path) -> Result<()> {
    fs_utils::remove_path(previous)?;

    let parked = target.exists();
    if parked {
        std::fs::rename(target, previous).map_err(Error::io("cannot move aside", target))?;
    }

    if let Err(e) = std::fs::rename(new_tree, target) {
        if parked {
            if let Err(restore) = std::fs::rename(previous, target) {
                output::warning(&format!(
                    "could not restore previous tree from {}: {}",
                    previous.display(),
                    restore
                ));
            }
        }
        return Err(Error::Io {
            context: format!("cannot move {} to {}", new_tree.display(), target.display()),
            source: e,
        });
    }

    output::detail(&format!("moved to: {}", target.display()));
    Ok(())
}
