//! bpad-setup - rebuild esp32/ from the pinned ESP32 Arduino core
//!
//! Usage:
//!   bpad-setup [--root <DIR>] [--config <FILE>]

use anyhow::{Context, Result};
use bpad_core::{Config, output, setup};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "bpad-setup")]
#[command(about = "Download the ESP32 core and apply bpad proto1 customizations")]
#[command(version)]
struct Cli {
    /// Directory holding esp32/ and release/
    #[arg(short, long, env = "BPAD_ROOT", default_value = ".")]
    root: PathBuf,

    /// Config file (defaults to <root>/bpad.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(&cli.root, cli.config.as_deref())
        .with_context(|| format!("Failed to load config for {}", cli.root.display()))?;

    output::banner(&[
        "bpad proto1 core - Setup",
        &format!("Based on ESP32 Arduino Core v{}", config.vendor.version),
    ]);
    println!();

    let report = setup::run(&config)?;

    println!();
    output::success(&format!(
        "Setup complete ({} from {}, {} custom path(s) restored)",
        config.vendor_dir.display(),
        report.extracted_root,
        report.restored.len()
    ));
    println!();
    println!("Next steps:");
    println!("  1. Test locally by copying esp32/ into your Arduino15 packages directory:");
    println!(
        "     packages/{}/hardware/esp32/{}/",
        config.release.product,
        config.platform.version_to.trim_start_matches("version=")
    );
    println!("  2. Or run 'bpad-build' to create a release zip");

    Ok(())
}
