//! Terminal output.
//!
//! Logs go to stderr through `tracing`; these helpers write the command's
//! own output.

use std::fmt::Display;

/// Print one line of command output to stdout.
#[allow(clippy::print_stdout)]
pub fn line(text: impl Display) {
    println!("{text}");
}

/// Print a failure message to stderr.
#[allow(clippy::print_stderr)]
pub fn failure(message: &str) {
    eprintln!("error: {message}");
}
