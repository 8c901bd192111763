//! Preserved-path staging
//!
//! Locally owned files inside the vendor tree are copied into a holding area
//! before the tree is replaced and copied back on top of the new tree.

use crate::error::Result;
use crate::fs_utils;
use crate::output;
use std::path::{Path, PathBuf};

/// Holding area for preserved paths.
#[derive(Debug)]
pub struct Staging {
    holding: PathBuf,
    staged: Vec<PathBuf>,
}

impl Staging {
    /// Copy every existing `preserve` path under `tree` into `holding`.
    ///
    /// Missing paths are skipped silently; on a first run there is nothing to
    /// preserve. A stale holding area is wiped first.
    pub fn stage(tree: &Path, preserve: &[PathBuf], holding: &Path) -> Result<Self> {
        fs_utils::remove_path(holding)?;

        let mut staged = Vec::new();
        for rel in preserve {
            fs_utils::validate_safe_path(rel)?;
            let src = tree.join(rel);
            if !src.exists() {
                continue;
            }
            fs_utils::replace_with_copy(&src, &holding.join(rel))?;
            output::detail(&format!("backed up: {}", rel.display()));
            staged.push(rel.clone());
        }

        Ok(Self {
            holding: holding.to_path_buf(),
            staged,
        })
    }

    /// Pick up a holding area left behind by an interrupted run.
    ///
    /// Nothing is copied; every `preserve` path already present in `holding`
    /// counts as staged.
    pub fn resume(preserve: &[PathBuf], holding: &Path) -> Result<Self> {
        let mut staged = Vec::new();
        for rel in preserve {
            fs_utils::validate_safe_path(rel)?;
            if holding.join(rel).exists() {
                output::detail(&format!("kept from earlier run: {}", rel.display()));
                staged.push(rel.clone());
            }
        }

        Ok(Self {
            holding: holding.to_path_buf(),
            staged,
        })
    }

    /// Relative paths that were staged.
    pub fn staged(&self) -> &[PathBuf] {
        &self.staged
    }

    /// Copy staged paths back into `tree`, replacing whatever is there.
    pub fn restore(&self, tree: &Path) -> Result<()> {
        for rel in &self.staged {
            fs_utils::replace_with_copy(&self.holding.join(rel), &tree.join(rel))?;
            output::detail(&format!("restored: {}", rel.display()));
        }
        Ok(())
    }

    /// Delete the holding area.
    pub fn discard(self) -> Result<()> {
        fs_utils::remove_path(&self.holding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_stage_and_restore() {
        let temp = tempdir().unwrap();
        let tree = temp.path().join("esp32");
        std::fs::create_dir_all(tree.join("variants/bpad_proto1")).unwrap();
        std::fs::write(tree.join("boards.txt"), "custom boards").unwrap();
        std::fs::write(tree.join("variants/bpad_proto1/pins_arduino.h"), "#define X 1").unwrap();

        let preserve = vec![
            PathBuf::from("boards.txt"),
            PathBuf::from("variants/bpad_proto1"),
        ];
        let holding = temp.path().join("_backup");
        let staging = Staging::stage(&tree, &preserve, &holding).unwrap();
        assert_eq!(staging.staged(), preserve.as_slice());

        // vendor replaces everything
        std::fs::remove_dir_all(&tree).unwrap();
        std::fs::create_dir_all(tree.join("variants/bpad_proto1")).unwrap();
        std::fs::write(tree.join("boards.txt"), "vendor boards").unwrap();
        std::fs::write(tree.join("variants/bpad_proto1/vendor.h"), "stray").unwrap();

        staging.restore(&tree).unwrap();
        assert_eq!(
            std::fs::read_to_string(tree.join("boards.txt")).unwrap(),
            "custom boards"
        );
        assert_eq!(
            std::fs::read_to_string(tree.join("variants/bpad_proto1/pins_arduino.h")).unwrap(),
            "#define X 1"
        );
        assert!(!tree.join("variants/bpad_proto1/vendor.h").exists());

        staging.discard().unwrap();
        assert!(!holding.exists());
    }

    #[test]
    fn test_stage_skips_missing() {
        let temp = tempdir().unwrap();
        let tree = temp.path().join("esp32");

        let staging = Staging::stage(
            &tree,
            &[PathBuf::from("boards.txt")],
            &temp.path().join("_backup"),
        )
        .unwrap();
        assert!(staging.staged().is_empty());
    }

    #[test]
    fn test_resume_uses_existing_holding_area() {
        let temp = tempdir().unwrap();
        let tree = temp.path().join("esp32");
        let holding = temp.path().join("_backup");
        std::fs::create_dir_all(&tree).unwrap();
        std::fs::write(tree.join("boards.txt"), "vendor boards").unwrap();
        std::fs::create_dir_all(&holding).unwrap();
        std::fs::write(holding.join("boards.txt"), "custom boards").unwrap();

        let preserve = vec![
            PathBuf::from("boards.txt"),
            PathBuf::from("variants/bpad_proto1"),
        ];
        let staging = Staging::resume(&preserve, &holding).unwrap();
        assert_eq!(staging.staged(), &[PathBuf::from("boards.txt")]);

        staging.restore(&tree).unwrap();
        assert_eq!(
            std::fs::read_to_string(tree.join("boards.txt")).unwrap(),
            "custom boards"
        );
    }
}
