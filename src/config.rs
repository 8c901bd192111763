//! Layout and release configuration
//!
//! Every on-disk location and vendor constant is resolved into a [`Config`]
//! from built-in defaults, optionally overlaid by a `bpad.toml` in the root:
//!
//! ```toml
//! [layout]
//! vendor_dir = "esp32"
//! release_dir = "release"
//! preserve = ["boards.txt", "variants/bpad_proto1"]
//!
//! [vendor]
//! version = "2.0.17"
//!
//! [platform]
//! version_override = "0.1.0"
//!
//! [release]
//! product = "bpad_proto1"
//! ```

use crate::error::{Error, Result};
use crate::fs_utils;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "bpad.toml";

pub const DEFAULT_VENDOR_VERSION: &str = "2.0.17";
const DEFAULT_VENDOR_DIR: &str = "esp32";
const DEFAULT_RELEASE_DIR: &str = "release";
const DEFAULT_PRESERVE: &[&str] = &["boards.txt", "variants/bpad_proto1"];
const DEFAULT_METADATA_FILE: &str = "platform.txt";
const DEFAULT_VENDOR_NAME: &str = "ESP32 Arduino";
const DEFAULT_VERSION_OVERRIDE: &str = "0.1.0";
const DEFAULT_PRODUCT: &str = "bpad_proto1";
const DEFAULT_INDEX_FILE: &str = "package_bpad_proto1_index.json";

const BACKUP_DIR: &str = "_backup";
const EXTRACT_DIR: &str = "_temp_extract";
const PREVIOUS_DIR: &str = "_previous";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 300;

/// HTTP timeout from `BPAD_HTTP_TIMEOUT` (seconds) or the default.
/// Read once per process.
pub fn http_timeout() -> Duration {
    static TIMEOUT: OnceLock<Duration> = OnceLock::new();
    *TIMEOUT.get_or_init(|| {
        let secs = std::env::var("BPAD_HTTP_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
        Duration::from_secs(secs.clamp(5, 3600))
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigToml {
    layout: Option<LayoutToml>,
    vendor: Option<VendorToml>,
    platform: Option<PlatformToml>,
    release: Option<ReleaseToml>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct LayoutToml {
    vendor_dir: Option<PathBuf>,
    release_dir: Option<PathBuf>,
    preserve: Option<Vec<PathBuf>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct VendorToml {
    version: Option<String>,
    url: Option<String>,
    archive: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PlatformToml {
    file: Option<PathBuf>,
    vendor_name: Option<String>,
    display_name: Option<String>,
    version_override: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ReleaseToml {
    product: Option<String>,
    index_file: Option<String>,
    download_base: Option<String>,
}

/// Vendor archive source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorSource {
    pub version: String,
    pub url: String,
    /// Local cache location of the downloaded archive.
    pub archive: PathBuf,
}

/// The two literal replacements applied to the metadata file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformPatch {
    /// Metadata file, relative to the vendor tree.
    pub file: PathBuf,
    pub name_from: String,
    pub name_to: String,
    pub version_from: String,
    pub version_to: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSettings {
    pub product: String,
    pub index_file: String,
    pub download_base: Option<String>,
}

/// Fully resolved configuration. All paths are absolute (joined onto `root`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub root: PathBuf,
    pub vendor_dir: PathBuf,
    pub release_dir: PathBuf,
    /// Paths relative to `vendor_dir` that survive a vendor-tree replacement.
    pub preserve: Vec<PathBuf>,
    pub vendor: VendorSource,
    pub platform: PlatformPatch,
    pub release: ReleaseSettings,
}

impl Config {
    /// Built-in defaults for `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::resolve(root.into(), ConfigToml::default())
    }

    /// Load config for `root`.
    ///
    /// Uses `explicit` if given, else `<root>/bpad.toml` if it exists, else defaults.
    pub fn load(root: impl Into<PathBuf>, explicit: Option<&Path>) -> Result<Self> {
        let root = root.into();
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let candidate = root.join(CONFIG_FILE_NAME);
                candidate.is_file().then_some(candidate)
            }
        };

        let parsed = match path {
            Some(path) => {
                let text = std::fs::read_to_string(&path)
                    .map_err(Error::io("cannot read config", &path))?;
                toml::from_str::<ConfigToml>(&text)
                    .map_err(|source| Error::Config { path, source })?
            }
            None => ConfigToml::default(),
        };

        let config = Self::resolve(root, parsed);
        config.validate()?;
        Ok(config)
    }

    fn resolve(root: PathBuf, toml: ConfigToml) -> Self {
        let layout = toml.layout.unwrap_or_default();
        let vendor = toml.vendor.unwrap_or_default();
        let platform = toml.platform.unwrap_or_default();
        let release = toml.release.unwrap_or_default();

        let version = vendor
            .version
            .unwrap_or_else(|| DEFAULT_VENDOR_VERSION.to_string());
        let url = vendor.url.unwrap_or_else(|| default_vendor_url(&version));
        let archive = vendor
            .archive
            .unwrap_or_else(|| PathBuf::from(format!("esp32-{}.zip", version)));

        let vendor_name = platform
            .vendor_name
            .unwrap_or_else(|| DEFAULT_VENDOR_NAME.to_string());
        let display_name = platform
            .display_name
            .unwrap_or_else(|| format!("bpad proto1 (ESP32 v{})", version));
        let version_override = platform
            .version_override
            .unwrap_or_else(|| DEFAULT_VERSION_OVERRIDE.to_string());

        Self {
            vendor_dir: root.join(layout.vendor_dir.unwrap_or_else(|| DEFAULT_VENDOR_DIR.into())),
            release_dir: root.join(
                layout
                    .release_dir
                    .unwrap_or_else(|| DEFAULT_RELEASE_DIR.into()),
            ),
            preserve: layout
                .preserve
                .unwrap_or_else(|| DEFAULT_PRESERVE.iter().map(|p| PathBuf::from(*p)).collect()),
            vendor: VendorSource {
                url,
                archive: root.join(archive),
                version: version.clone(),
            },
            platform: PlatformPatch {
                file: platform
                    .file
                    .unwrap_or_else(|| DEFAULT_METADATA_FILE.into()),
                name_from: format!("name={}", vendor_name),
                name_to: format!("name={}", display_name),
                version_from: format!("version={}", version),
                version_to: format!("version={}", version_override),
            },
            release: ReleaseSettings {
                product: release
                    .product
                    .unwrap_or_else(|| DEFAULT_PRODUCT.to_string()),
                index_file: release
                    .index_file
                    .unwrap_or_else(|| DEFAULT_INDEX_FILE.to_string()),
                download_base: release.download_base,
            },
            root,
        }
    }

    fn validate(&self) -> Result<()> {
        for path in self.preserve.iter().chain(std::iter::once(&self.platform.file)) {
            fs_utils::validate_safe_path(path)?;
        }
        // release_dir must sit outside the tree that gets zipped.
        if self.release_dir.starts_with(&self.vendor_dir) {
            return Err(Error::ReleaseInsideVendor {
                release: self.release_dir.clone(),
                vendor: self.vendor_dir.clone(),
            });
        }
        Ok(())
    }

    /// Metadata file inside the vendor tree.
    pub fn metadata_path(&self) -> PathBuf {
        self.vendor_dir.join(&self.platform.file)
    }

    /// Holding area for preserved paths during a setup run.
    pub fn backup_dir(&self) -> PathBuf {
        self.root.join(BACKUP_DIR)
    }

    /// Scratch directory the vendor archive is unpacked into.
    pub fn extract_dir(&self) -> PathBuf {
        self.root.join(EXTRACT_DIR)
    }

    /// Where the old vendor tree is parked while the new one is moved in.
    pub fn previous_dir(&self) -> PathBuf {
        self.root.join(PREVIOUS_DIR)
    }
}

fn default_vendor_url(version: &str) -> String {
    format!(
        "https://github.com/espressif/arduino-esp32/releases/download/{v}/esp32-{v}.zip",
        v = version
    )
}
