//! Discovery of source, build and tool locations for MSI tests.
//!
//! Mirrors how the tests are launched: under `make run-test` the working
//! directory sits below `<build root>/test-support`, otherwise the default
//! build directory or `INSTALLERMSI_TEST_BUILD_ROOT` is used.

use std::path::{Path, PathBuf};

use path_absolutize::Absolutize;

use super::config::{HarnessConfig, INSTALLERMSI_TEST_BUILD_ROOT, INSTALLERMSI_TEST_SRC};
use super::error::{Error, Result};
use super::registry::system_env_var;

/// Environment variable naming the Deno installation directory.
pub const DENO_HOME: &str = "DENO_HOME";
/// Environment variable naming the WiX toolset directory.
pub const WIX: &str = "WIX";
/// Environment variable naming the JAXB jars used by the JAXB extension example.
pub const INSTALLERMSI_JAXB_EXTEND_LIBS_DIR: &str = "INSTALLERMSI_JAXB_EXTEND_LIBS_DIR";

const TEST_SRC_SEARCH_DEPTH: usize = 8;
const BUILD_ROOT_SEARCH_DEPTH: usize = 10;
const DEFAULT_BUILD_DIR: &str = "build/windows-x86_64-server-release";

/// Normalized absolute form of `path`, resolved against the current directory.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    path.absolutize()
        .map(|p| p.into_owned())
        .map_err(|e| Error::GenericError(format!("cannot resolve path {}: {e}", path.display())))
}

/// [`absolute`] rendered for comparison with registry and command-line values.
pub fn absolute_display(path: &Path) -> Result<String> {
    Ok(absolute(path)?.display().to_string())
}

/// The `installermsi` test sources directory, at or above the configured dir.
pub fn find_test_src_dir(config: &HarnessConfig) -> Result<PathBuf> {
    let start = config.test_src_dir.as_deref().ok_or_else(|| {
        Error::NotFound(format!(
            "Unable to locate test sources root path, '{INSTALLERMSI_TEST_SRC}' is not set"
        ))
    })?;
    let start = absolute(start)?;

    start
        .ancestors()
        .take(TEST_SRC_SEARCH_DEPTH)
        .find(|dir| dir.file_name().is_some_and(|name| name == "installermsi") && dir.is_dir())
        .map(Path::to_path_buf)
        .ok_or_else(|| Error::NotFound("Unable to locate test sources root path".to_string()))
}

/// The JDK source root, three levels above the test sources.
pub fn find_src_root(config: &HarnessConfig) -> Result<PathBuf> {
    let test_src_dir = find_test_src_dir(config)?;
    let src_root = absolute(&test_src_dir.join("../../.."))?;
    if src_root.join("src").is_dir() {
        return Ok(src_root);
    }
    Err(Error::NotFound("Unable to locate sources root path".to_string()))
}

/// The JDK build output directory.
pub fn find_build_root(config: &HarnessConfig) -> Result<PathBuf> {
    // running under make run-test
    if let Some(root) = config
        .work_dir
        .ancestors()
        .take(BUILD_ROOT_SEARCH_DEPTH)
        .find(|dir| dir.join("test-support").is_dir())
    {
        return absolute(root);
    }

    // default build dir inside the source tree
    if let Ok(src_root) = find_src_root(config) {
        let default_root = src_root.join(DEFAULT_BUILD_DIR);
        if default_root.is_dir() {
            return absolute(&default_root);
        }
    }

    if let Some(root) = &config.build_root
        && root.is_dir()
    {
        return absolute(root);
    }

    Err(Error::NotFound(format!(
        "Unable to locate build root path, please specify \
         '{INSTALLERMSI_TEST_BUILD_ROOT}=c:/path/to/jdk/build/root' environment variable"
    )))
}

/// `<build root>/images/jdk`.
pub fn find_jdk_image(config: &HarnessConfig) -> Result<PathBuf> {
    let image = find_build_root(config)?.join("images").join("jdk");
    if image.is_dir() {
        return absolute(&image);
    }
    Err(Error::NotFound("Unable to locate jdk image path".to_string()))
}

/// First regular `openjdk-*.<extension>` file in `dir`.
fn find_openjdk_file(dir: &Path, extension: &str) -> Result<Option<PathBuf>> {
    let pattern = dir.join(format!("openjdk-*.{extension}"));
    let pattern = pattern
        .to_str()
        .ok_or_else(|| Error::GenericError(format!("path is not valid UTF-8: {}", dir.display())))?;
    let entries = glob::glob(pattern)
        .map_err(|e| Error::GenericError(format!("invalid glob pattern {pattern}: {e}")))?;

    let mut matches: Vec<PathBuf> = entries.filter_map(|entry| entry.ok()).filter(|p| p.is_file()).collect();
    matches.sort();
    matches.into_iter().next().map(|p| absolute(&p)).transpose()
}

/// The built `openjdk-*.msi` installer.
pub fn find_installer_msi(config: &HarnessConfig) -> Result<PathBuf> {
    let msi_dir = find_build_root(config)?.join("images").join("installermsi");
    find_openjdk_file(&msi_dir, "msi")?.ok_or_else(|| {
        Error::NotFound(
            "Unable to locate MSI installer, please run 'make installer-msi' and re-run the test".to_string(),
        )
    })
}

/// The stamped `openjdk-*.xml` descriptor produced alongside the installer.
pub fn find_installer_msi_xml(config: &HarnessConfig) -> Result<PathBuf> {
    let msi_dir = find_build_root(config)?.join("images").join("installermsi");
    find_openjdk_file(&msi_dir, "xml")?.ok_or_else(|| {
        Error::NotFound(
            "Unable to locate MSI installer XML, please run 'make installer-msi-xml' and re-run the test"
                .to_string(),
        )
    })
}

/// Directory named by a system environment variable, which must exist.
async fn env_dir(config: &HarnessConfig, var: &str, what: &str) -> Result<PathBuf> {
    let value = system_env_var(config, var)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Unable to find {what}, '{var}' variable is not set")))?;
    let dir = PathBuf::from(value);
    if !dir.is_dir() {
        return Err(Error::NotFound(format!(
            "Unable to find {what}, please check that '{var}' variable is set correctly"
        )));
    }
    Ok(dir)
}

/// The WiX toolset directory from the `WIX` variable.
pub async fn find_wix_dir(config: &HarnessConfig) -> Result<PathBuf> {
    env_dir(config, WIX, "WiX directory").await
}

/// `deno.exe` inside the `DENO_HOME` directory.
pub async fn find_deno_exe(config: &HarnessConfig) -> Result<PathBuf> {
    let deno_dir = env_dir(config, DENO_HOME, "Deno directory").await?;
    let deno_exe = deno_dir.join("deno.exe");
    if !deno_exe.exists() {
        return Err(Error::NotFound(format!(
            "Unable to find Deno executable, path: [{}] please check that '{DENO_HOME}' variable is set correctly",
            deno_exe.display()
        )));
    }
    Ok(deno_exe)
}

/// The JAXB jars directory, `None` when the variable is not set.
pub async fn find_jaxb_libs_dir(config: &HarnessConfig) -> Result<Option<PathBuf>> {
    if system_env_var(config, INSTALLERMSI_JAXB_EXTEND_LIBS_DIR).await?.is_none() {
        return Ok(None);
    }
    env_dir(config, INSTALLERMSI_JAXB_EXTEND_LIBS_DIR, "JAXB libraries")
        .await
        .map(Some)
}

/// `java.exe` of the JDK running the tests.
pub fn find_test_java_exe(config: &HarnessConfig) -> Result<PathBuf> {
    let test_jdk = config
        .test_jdk
        .as_deref()
        .ok_or_else(|| Error::NotFound("Unable to locate test JDK, 'INSTALLERMSI_TEST_JDK' is not set".to_string()))?;
    Ok(test_jdk.join("bin").join("java.exe"))
}
