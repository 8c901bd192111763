//! Release report and Board Manager index entry.

use crate::fs_utils;
use crate::hash::Checksum;
use crate::output;
use owo_colors::OwoColorize;
use serde::Serialize;

const URL_PLACEHOLDER: &str = "<your-github-release-url>";

/// Fields of a platform entry in `package_*_index.json` that change per release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub version: String,
    pub url: String,
    pub archive_file_name: String,
    pub checksum: String,
    /// Byte size as a string, the way Board Manager index files store it.
    pub size: String,
}

/// Everything an operator needs to publish a built archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseManifest {
    pub version: String,
    pub tag: String,
    pub file_name: String,
    pub size: u64,
    pub checksum: Checksum,
    pub index_file: String,
    pub download_base: Option<String>,
}

impl ReleaseManifest {
    pub fn download_url(&self) -> String {
        let base = self.download_base.as_deref().unwrap_or(URL_PLACEHOLDER);
        format!("{}/{}", base.trim_end_matches('/'), self.file_name)
    }

    pub fn index_entry(&self) -> IndexEntry {
        IndexEntry {
            version: self.version.clone(),
            url: self.download_url(),
            archive_file_name: self.file_name.clone(),
            checksum: self.checksum.to_string(),
            size: self.size.to_string(),
        }
    }

    /// Print the summary, publication checklist, and index snippet.
    pub fn print(&self) {
        println!();
        output::banner(&["Build complete!"]);
        println!();
        output::field("File", &self.file_name);
        output::field(
            "Size",
            &format!(
                "{} bytes ({:.1} MB)",
                self.size,
                fs_utils::mebibytes(self.size)
            ),
        );
        output::field("Checksum", &self.checksum.to_string());
        println!();

        println!("{}", "Next steps:".bold());
        for (i, step) in self.next_steps().iter().enumerate() {
            println!("  {}. {}", i + 1, step);
        }

        println!();
        println!("{}", format!("Index entry for {}:", self.index_file).bold());
        match serde_json::to_string_pretty(&self.index_entry()) {
            Ok(json) => println!("{}", json),
            Err(e) => output::warning(&format!("cannot render index entry: {}", e)),
        }
        println!();
    }

    fn next_steps(&self) -> Vec<String> {
        vec![
            format!("Tag this commit:  git tag {}", self.tag),
            "Push tags:        git push --tags".to_string(),
            format!("Create a GitHub Release for {}", self.tag),
            format!("Upload {} to the release", self.file_name),
            format!(
                "Update {} with version, url, archiveFileName, checksum, size",
                self.index_file
            ),
        ]
    }
}
