//! Vendor SDK overlay and release packaging for the bpad proto1 Arduino core
//!
//! The core is the ESP32 Arduino core with a handful of locally maintained
//! files layered on top. Two tools manage it:
//!
//! - `bpad-setup` downloads the pinned ESP32 core, replaces `esp32/` with it,
//!   restores the local overlay (`boards.txt`, `variants/bpad_proto1/`) and
//!   patches the name and version in `platform.txt`. See [`setup::run`].
//! - `bpad-build` zips `esp32/` reproducibly into `release/`, computes its
//!   SHA-256, and prints what goes into the Board Manager index. See
//!   [`package::build`].
//!
//! # Layout
//!
//! ```text
//! <root>/
//!   bpad.toml              optional, see config
//!   esp32-2.0.17.zip       cached vendor archive
//!   esp32/                 vendor tree + overlay
//!     platform.txt
//!     boards.txt           preserved
//!     variants/bpad_proto1 preserved
//!   release/               built archives (append-only)
//! ```
//!
//! All locations are resolved through [`Config`], so both tools can run
//! against any root.

pub mod archive;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod fs_utils;
pub mod hash;
pub mod manifest;
pub mod output;
pub mod overlay;
pub mod package;
pub mod platform;
pub mod progress;
pub mod revision;
pub mod setup;

pub use config::Config;
pub use error::{Error, Result};
