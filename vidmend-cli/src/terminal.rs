//! Terminal output styling for vidmend.
//!
//! Results go to stdout as labelled lines; errors go to stderr. Colour is
//! dropped when `NO_COLOR` is set or the stream is not a terminal.

use console::{Term, style};
use std::fmt::Display;
use unicode_width::UnicodeWidthStr;

/// Width the status labels are padded to.
const LABEL_WIDTH: usize = 14;

fn should_use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none() && Term::stdout().is_term()
}

/// Prints a section header.
pub fn print_section(title: &str) {
    if should_use_color() {
        println!("===== {} =====", style(title.to_uppercase()).cyan());
    } else {
        println!("===== {} =====", title.to_uppercase());
    }
}

/// Prints an aligned `label: value` line.
pub fn print_status(label: &str, value: impl Display) {
    let padding = LABEL_WIDTH.saturating_sub(label.width()).max(1);
    let label = format!("{label}:");
    if should_use_color() {
        println!("  {}{} {value}", style(label).bold(), " ".repeat(padding));
    } else {
        println!("  {label}{} {value}", " ".repeat(padding));
    }
}

pub fn print_success(message: &str) {
    if should_use_color() {
        println!("  {} {}", style("✓").green(), style(message).green());
    } else {
        println!("  ✓ {message}");
    }
}

pub fn print_warning(message: &str) {
    if should_use_color() {
        println!("  {} {message}", style("!").yellow().bold());
    } else {
        println!("  ! {message}");
    }
}

/// Prints an error to stderr.
pub fn print_error(message: &str) {
    if std::env::var_os("NO_COLOR").is_none() && Term::stderr().is_term() {
        eprintln!("{} {message}", style("Error:").red().bold());
    } else {
        eprintln!("Error: {message}");
    }
}
