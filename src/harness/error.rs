//! Error types for MSI test orchestration.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while driving external tools or checking their effects
#[derive(Error, Debug)]
pub enum Error {
    /// Required file, directory or tool could not be located
    #[error("{0}")]
    NotFound(String),

    /// External command could not be started
    #[error("failed to run `{command}`: {error}")]
    CommandFailed {
        /// Command line that was attempted
        command: String,
        /// Spawn or wait error
        #[source]
        error: std::io::Error,
    },

    /// External command exited with an unexpected status
    #[error("`{command}` exited with code {code:?}, expected {expected}{}", format_stderr(.stderr))]
    UnexpectedExitCode {
        /// Command line that was run
        command: String,
        /// Actual exit code (None when killed by a signal)
        code: Option<i32>,
        /// Expected exit code
        expected: i32,
        /// Captured stderr lines
        stderr: Vec<String>,
    },

    /// External command did not finish in time
    #[error("`{command}` timed out after {seconds} seconds")]
    CommandTimeout {
        /// Command line that was run
        command: String,
        /// Timeout that elapsed
        seconds: u64,
    },

    /// Observed state differs from what an install should have produced
    #[error("assertion failed: {what}: expected [{expected}], actual [{actual}]")]
    Assertion {
        /// What was checked
        what: String,
        /// Expected value
        expected: String,
        /// Observed value
        actual: String,
    },

    /// Filesystem error with the path and operation involved
    #[error("{context} ({}): {source}", .path.display())]
    Fs {
        /// What was being done
        context: String,
        /// Path involved
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Plain IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Directory traversal error
    #[error("directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Anything else
    #[error("{0}")]
    GenericError(String),
}

fn format_stderr(stderr: &[String]) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr.join("\n"))
    }
}

impl Error {
    /// Shorthand for an [`Error::Assertion`].
    pub fn assertion(what: impl Into<String>, expected: impl ToString, actual: impl ToString) -> Self {
        Self::Assertion {
            what: what.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Attaches path context to IO results.
pub trait ErrorExt<T> {
    /// Wraps an IO error with the operation and path it concerned.
    fn fs_context(self, context: &str, path: &Path) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &str, path: &Path) -> Result<T> {
        self.map_err(|source| Error::Fs {
            context: context.to_string(),
            path: path.to_path_buf(),
            source,
        })
    }
}
