//! Running the descriptor extension examples shipped with the tests.
//!
//! Each example reads the stamped installer descriptor, adds vendor
//! content (a `vendor_ext1` directory, extra environment variables) and
//! writes a `.wxs` file for [`super::wix::create_extended_installer`].

use std::path::{Path, PathBuf};

use super::config::HarnessConfig;
use super::error::{ErrorExt, Result};
use super::paths::{absolute, find_deno_exe, find_installer_msi_xml, find_test_java_exe, find_test_src_dir};
use super::process::Executor;

/// File name of the transformed descriptor in the installer build directory.
pub const EXTENDED_WXS: &str = "jdk.wxs";

/// Descriptor extension example to run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Extension {
    /// `extend/ExtendScript.js` under Deno
    Script,
    /// `extended/example/ExtendDom.java` as a single-file Java program
    Dom,
    /// `extended/example/ExtendJaxb.java` with the JAXB jars on the classpath
    Jaxb {
        /// Directory holding the JAXB jars
        libs_dir: PathBuf,
    },
}

impl Extension {
    /// Example source path relative to the test sources directory.
    pub fn source(&self) -> &'static str {
        match self {
            Self::Script => "extend/ExtendScript.js",
            Self::Dom => "extended/example/ExtendDom.java",
            Self::Jaxb { .. } => "extended/example/ExtendJaxb.java",
        }
    }
}

/// Runs `extension` on the built descriptor and returns the written `.wxs`.
pub async fn transform_descriptor(
    config: &HarnessConfig,
    extension: &Extension,
    inst_build_dir: &Path,
) -> Result<PathBuf> {
    let jdk_xml = find_installer_msi_xml(config)?;
    let example = absolute(&find_test_src_dir(config)?.join(extension.source()))?;
    let wxs = absolute(&inst_build_dir.join(EXTENDED_WXS))?;

    let exec = match extension {
        Extension::Script => Executor::of(find_deno_exe(config).await?, ["run", "-A"]),
        Extension::Dom => Executor::of(find_test_java_exe(config)?, Vec::<String>::new()),
        Extension::Jaxb { libs_dir } => Executor::of(find_test_java_exe(config)?, ["-cp"])
            .arg(collect_jar_classpath(libs_dir).await?),
    };

    log::info!("Extending descriptor with {}", example.display());
    exec.arg(example)
        .arg(jdk_xml)
        .arg(&wxs)
        .current_dir(inst_build_dir)
        .timeout(config.command_timeout)
        .execute()
        .await?;
    Ok(wxs)
}

/// `;`-separated absolute paths of the `.jar` files in `dir`, sorted.
pub async fn collect_jar_classpath(dir: &Path) -> Result<String> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .fs_context("listing JAXB libraries", dir)?;
    let mut jars = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .fs_context("listing JAXB libraries", dir)?
    {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "jar") {
            jars.push(absolute(&path)?.display().to_string());
        }
    }
    jars.sort();
    Ok(jars.join(";"))
}
