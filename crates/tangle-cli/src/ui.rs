//! Terminal status messages.
//!
//! Status lines go to stderr; command results go to stdout.

use console::style;

/// Apply `--no-color`, on top of console's own TTY and `NO_COLOR` detection.
pub fn init_colors(no_color: bool) {
    if no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
}

pub fn success(message: &str) {
    eprintln!("{} {}", style("✔").green().bold(), message);
}

pub fn info(message: &str) {
    eprintln!("{} {}", style("ℹ").blue().bold(), message);
}

pub fn warning(message: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), style(message).yellow());
}

/// Right-align a count for summary tables.
pub fn count(label: &str, value: usize) -> String {
    format!("  {:<9}{:>5}", label, style(value).cyan())
}
