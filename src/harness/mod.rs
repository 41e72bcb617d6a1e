//! MSI installer test orchestration.
//!
//! Locates build artifacts, drives WiX, `msiexec`, `reg` and the
//! descriptor extension examples as external processes, and checks the
//! files and registry entries an install leaves behind.
//!
//! # Module Organization
//!
//! - `config` - `HarnessConfig` and environment variable names
//! - `process` - command execution with timeout and output capture
//! - `paths` - build root, JDK image, installer and tool discovery
//! - `registry` - `reg query` wrapper and registry/environment assertions
//! - `files` - installed file assertions and copy helpers
//! - `wix` - `candle`/`light` invocation
//! - `msiexec` - install, uninstall and administrative unpack
//! - `extend` - descriptor extension examples (Deno, DOM, JAXB)

mod config;
mod error;

pub mod extend;
pub mod files;
pub mod msiexec;
pub mod paths;
pub mod process;
pub mod registry;
pub mod wix;

pub use config::{
    DEFAULT_COMMAND_TIMEOUT, HarnessConfig, INSTALLERMSI_TEST_BUILD_ROOT, INSTALLERMSI_TEST_JDK,
    INSTALLERMSI_TEST_SRC, MSIEXEC_INSTALL_IN_PROGRESS,
};
pub use error::{Error, ErrorExt, Result};
