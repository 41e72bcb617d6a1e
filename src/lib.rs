//! OpenJDK MSI installer descriptor tooling
//!
//! This library provides:
//! - a lossless XML document model for the WiX descriptor (`descriptor`)
//! - the version placeholder stamper (`stamp`)
//! - helpers for building, installing and checking MSI packages (`harness`)
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod cli;
pub mod descriptor;
pub mod error;
pub mod harness;
pub mod stamp;

// Re-export commonly used types
pub use error::{CliError, InstallerMsiError, Result};
pub use stamp::{StampError, StampReport, Versions, stamp, stamp_document};
