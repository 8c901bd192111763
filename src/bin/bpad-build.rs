//! bpad-build - package esp32/ into a checksummed release zip
//!
//! Usage:
//!   bpad-build [--root <DIR>] [--config <FILE>] [--release <VERSION>]
//!
//! Without `--release` the version is read from stdin.

use anyhow::{Context, Result};
use bpad_core::{Config, output, package, revision};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "bpad-build")]
#[command(about = "Create a release zip of esp32/ for the Arduino Board Manager")]
#[command(version)]
struct Cli {
    /// Directory holding esp32/ and release/
    #[arg(short, long, env = "BPAD_ROOT", default_value = ".")]
    root: PathBuf,

    /// Config file (defaults to <root>/bpad.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Release version (prompted for when omitted)
    #[arg(long, value_name = "VERSION")]
    release: Option<String>,
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

    output::banner(&["bpad proto1 core - Build"]);
    println!();

    package::check_preconditions(&config)?;

    let version = match &cli.release {
        Some(v) => package::normalize_version(v)?,
        None => {
            let stdin = std::io::stdin();
            package::read_version(&mut stdin.lock(), &mut std::io::stdout())?
        }
    };

    let short_sha = revision::short_sha(&config.root);
    if short_sha == revision::UNKNOWN {
        output::warning("could not determine git revision, using 'unknown'");
    }

    let manifest = package::build(&config, &version, &short_sha)?;
    manifest.print();

    Ok(())
}
