//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use std::io::{self, Write};

use colored::Colorize;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Write success status (green checkmark) to `out`
pub fn write_success(out: &mut impl Write, msg: &(impl std::fmt::Display + ?Sized)) -> io::Result<()> {
    writeln!(out, "{} {}", "✓".green(), msg)
}

/// Write section header (cyan bold) to `out`
pub fn write_header(out: &mut impl Write, msg: &(impl std::fmt::Display + ?Sized)) -> io::Result<()> {
    writeln!(out, "{}", msg.to_string().cyan().bold())
}
