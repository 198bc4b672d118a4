//! Password input.
//!
//! Passwords are never taken as arguments. They are read from stdin, one per
//! line, so they stay out of argv and shell history:
//!
//! ```bash
//! printf '%s\n' "$PASSWORD" | hs-cli login -e ada@example.com
//! ```
//!
//! When stdin is a terminal a prompt is written to stderr first.

use std::io::{self, BufRead, IsTerminal, Write};

use secrecy::SecretString;

use homeservice_app::AppError;

/// Line-oriented source of secrets.
pub struct SecretReader<R> {
    input: R,
    interactive: bool,
}

impl SecretReader<io::StdinLock<'static>> {
    /// Read from the process's stdin.
    #[must_use]
    pub fn stdin() -> Self {
        let stdin = io::stdin();
        let interactive = stdin.is_terminal();
        Self {
            input: stdin.lock(),
            interactive,
        }
    }
}

impl<R: BufRead> SecretReader<R> {
    /// Read from `input` without prompting.
    pub const fn new(input: R) -> Self {
        Self {
            input,
            interactive: false,
        }
    }

    /// Read the next line as a secret, prompting with `label` when
    /// interactive.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` when input ends before a line is read
    /// or cannot be read.
    pub fn read(&mut self, label: &str) -> Result<SecretString, AppError> {
        if self.interactive {
            let mut stderr = io::stderr();
            // A failed prompt write does not stop the read
            let _ = write!(stderr, "{label}: ");
            let _ = stderr.flush();
        }

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|e| AppError::BadRequest(format!("Could not read {label}: {e}")))?;
        if read == 0 {
            return Err(AppError::BadRequest(format!(
                "Expected {label} on stdin, one per line"
            )));
        }

        let len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(len);
        Ok(SecretString::from(line))
    }
}
