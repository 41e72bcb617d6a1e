//! Harness configuration gathered from the environment.

use std::path::PathBuf;
use std::time::Duration;

use path_absolutize::Absolutize;

use super::error::{Error, Result};

/// Environment variable overriding build root discovery.
pub const INSTALLERMSI_TEST_BUILD_ROOT: &str = "INSTALLERMSI_TEST_BUILD_ROOT";
/// Directory holding the installermsi test sources.
pub const INSTALLERMSI_TEST_SRC: &str = "INSTALLERMSI_TEST_SRC";
/// JDK used to run the Java-based descriptor extension examples.
pub const INSTALLERMSI_TEST_JDK: &str = "INSTALLERMSI_TEST_JDK";

/// Default timeout for a single external command (10 minutes).
/// MSI installs of a full JDK image can take several minutes.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(600);

/// msiexec exit code for "another installation is already in progress".
pub const MSIEXEC_INSTALL_IN_PROGRESS: i32 = 1618;

/// Settings shared by all harness operations.
#[derive(Clone, Debug)]
pub struct HarnessConfig {
    /// Directory the test runs in; unique install/unpack dirs go here
    pub work_dir: PathBuf,
    /// installermsi test sources directory (or any directory below it)
    pub test_src_dir: Option<PathBuf>,
    /// JDK running the tests
    pub test_jdk: Option<PathBuf>,
    /// Explicit build root, consulted after the automatic lookups
    pub build_root: Option<PathBuf>,
    /// Windows directory, home of msiexec, cmd, whoami and icacls
    pub windir: PathBuf,
    /// Timeout applied to each external command
    pub command_timeout: Duration,
    /// How many times msiexec is retried while another install runs
    pub msiexec_retries: u32,
    /// Delay between msiexec retries
    pub msiexec_retry_delay: Duration,
}

impl HarnessConfig {
    /// Builds a configuration rooted at `work_dir` with default settings.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            test_src_dir: None,
            test_jdk: None,
            build_root: None,
            windir: PathBuf::from(r"C:\Windows"),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            msiexec_retries: 10,
            msiexec_retry_delay: Duration::from_secs(10),
        }
    }

    /// Reads the configuration from the current process environment.
    pub fn from_env() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let work_dir = cwd
            .absolutize()
            .map_err(|e| Error::GenericError(format!("cannot resolve working directory: {e}")))?
            .into_owned();

        let mut config = Self::new(work_dir);
        config.test_src_dir = std::env::var_os(INSTALLERMSI_TEST_SRC).map(PathBuf::from);
        config.test_jdk = std::env::var_os(INSTALLERMSI_TEST_JDK).map(PathBuf::from);
        config.build_root = std::env::var_os(INSTALLERMSI_TEST_BUILD_ROOT).map(PathBuf::from);
        if let Some(windir) = std::env::var_os("WINDIR") {
            config.windir = PathBuf::from(windir);
        }
        log::debug!("Harness configuration: {:?}", config);
        Ok(config)
    }

    pub fn with_build_root(mut self, build_root: impl Into<PathBuf>) -> Self {
        self.build_root = Some(build_root.into());
        self
    }

    pub fn with_test_src_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.test_src_dir = Some(dir.into());
        self
    }

    pub fn with_test_jdk(mut self, dir: impl Into<PathBuf>) -> Self {
        self.test_jdk = Some(dir.into());
        self
    }

    /// Path of a tool under `%WINDIR%\system32`.
    pub fn system32(&self, exe: &str) -> PathBuf {
        self.windir.join("system32").join(exe)
    }
}
