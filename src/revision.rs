//! Source revision lookup for release names.

use std::path::Path;
use std::process::{Command, Stdio};

/// Placeholder used when the revision cannot be determined.
pub const UNKNOWN: &str = "unknown";

/// Short SHA of `HEAD` for the repository containing `dir`.
///
/// Returns [`UNKNOWN`] when git is missing, `dir` is not a repository, or the
/// output is empty. Never fails.
pub fn short_sha(dir: &Path) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["rev-parse", "--short", "HEAD"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output();

    match output {
        Ok(out) if out.status.success() => {
            let sha = String::from_utf8_lossy(&out.stdout).trim().to_string();
            if sha.is_empty() { UNKNOWN.to_string() } else { sha }
        }
        _ => UNKNOWN.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_sha_outside_repo_is_unknown() {
        let temp = tempfile::tempdir().unwrap();
        // a temp dir is not a repository (unless TMPDIR sits inside one)
        let sha = short_sha(temp.path());
        assert!(sha == UNKNOWN || sha.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_short_sha_missing_dir_is_unknown() {
        assert_eq!(short_sha(Path::new("/nonexistent/bpad/root")), UNKNOWN);
    }
}
