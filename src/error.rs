//! Top-level error types for the installermsi tool.
//!
//! Module errors are wrapped here so the CLI can report any failure with a
//! single exit path.

use thiserror::Error;

/// Result type alias for installermsi operations
pub type Result<T> = std::result::Result<T, InstallerMsiError>;

/// Main error type for all installermsi operations
#[derive(Error, Debug)]
pub enum InstallerMsiError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// Descriptor stamping errors
    #[error("{0}")]
    Stamp(#[from] crate::stamp::StampError),

    /// Descriptor parse/serialize errors
    #[error("{0}")]
    Descriptor(#[from] crate::descriptor::Error),

    /// MSI build/test orchestration errors
    #[error("{0}")]
    Harness(#[from] crate::harness::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl InstallerMsiError {
    /// Process exit code for this error. Every failure maps to 1.
    pub fn exit_code(&self) -> i32 {
        1
    }
}
