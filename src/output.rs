//! Colored operator output
//!
//! Uses owo-colors for terminal colors. Progress bars live in [`crate::progress`].

use owo_colors::OwoColorize;

const RULE_WIDTH: usize = 60;

/// Print a banner framed by horizontal rules
/// Example:
/// ```text
/// ============================================================
/// bpad proto1 core - Setup
/// ============================================================
/// ```
pub fn banner(lines: &[&str]) {
    let rule = "=".repeat(RULE_WIDTH);
    println!("{}", rule.dimmed());
    for line in lines {
        println!("{}", line.bold());
    }
    println!("{}", rule.dimmed());
}

/// Print an action header (blue, bold)
/// Example: "==> Backing up custom files"
pub fn action(message: &str) {
    println!("{} {}", "==>".blue().bold(), message.bold());
}

/// Print a numbered step
/// Example: "(2/5) Extracting esp32-2.0.17.zip"
pub fn step(current: usize, total: usize, message: &str) {
    println!(
        "{} {}",
        format!("({}/{})", current, total).cyan(),
        message.bold()
    );
}

/// Print a detail line (dimmed, indented)
pub fn detail(message: &str) {
    println!("     {}", message.dimmed());
}

/// Print a key/value line for reports
pub fn field(key: &str, value: &str) {
    println!("  {:<10}{}", format!("{}:", key).cyan(), value);
}

/// Print a success message (green)
pub fn success(message: &str) {
    println!("{} {}", "==>".green().bold(), message.green());
}

/// Print an info message (cyan)
pub fn info(message: &str) {
    println!("{} {}", "::".cyan(), message);
}

/// Print a warning message (yellow)
pub fn warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
}

/// Print a fatal error. Goes to stdout so it lands next to the progress log.
pub fn error(message: &str) {
    println!("{} {}", "error:".red().bold(), message.red());
}

/// Print a skip message (dimmed)
/// Example: "==> Found existing esp32-2.0.17.zip, skipping download"
pub fn skip(message: &str) {
    println!("{} {}", "==>".dimmed(), message.dimmed());
}
