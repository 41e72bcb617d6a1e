//! WiX toolset driving: compile a `.wxs` descriptor into an MSI.

use std::path::{Path, PathBuf};

use super::config::HarnessConfig;
use super::error::{Error, ErrorExt, Result};
use super::files::copy_dir_recursive;
use super::paths::{absolute, find_wix_dir};
use super::process::Executor;

/// Compiler and linker executables of a WiX 3 installation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WixToolset {
    pub candle: PathBuf,
    pub light: PathBuf,
}

impl WixToolset {
    /// Looks for `candle.exe` and `light.exe` in `<wix>/bin`, then `<wix>`.
    pub fn in_dir(wix_dir: &Path) -> Result<Self> {
        Ok(Self {
            candle: locate_tool(wix_dir, "candle")?,
            light: locate_tool(wix_dir, "light")?,
        })
    }

    /// Uses the `WIX` directory, falling back to tools found on `PATH`.
    pub async fn locate(config: &HarnessConfig) -> Result<Self> {
        match find_wix_dir(config).await {
            Ok(dir) => Self::in_dir(&dir),
            Err(err) => match (which::which("candle"), which::which("light")) {
                (Ok(candle), Ok(light)) => {
                    log::debug!("WIX not usable ({}), using WiX from PATH", err);
                    Ok(Self { candle, light })
                }
                _ => Err(err),
            },
        }
    }

    /// `candle -nologo -arch x64 <wxs>`, producing `<name>.wixobj` in `dir`.
    pub async fn compile(&self, config: &HarnessConfig, dir: &Path, wxs: &Path) -> Result<PathBuf> {
        log::info!("Running candle on {}", wxs.display());
        Executor::of(&self.candle, ["-nologo", "-arch", "x64"])
            .arg(absolute(wxs)?)
            .current_dir(dir)
            .timeout(config.command_timeout)
            .execute()
            .await?;
        Ok(dir.join(wxs.with_extension("wixobj").file_name().unwrap_or_default()))
    }

    /// `light` with the UI and util extensions, producing `<name>.msi` in `dir`.
    pub async fn link(&self, config: &HarnessConfig, dir: &Path, wixobj: &Path) -> Result<PathBuf> {
        log::info!("Running light on {}", wixobj.display());
        Executor::of(
            &self.light,
            [
                "-nologo",
                "-sw1076",
                "-ext",
                "WixUIExtension",
                "-ext",
                "WixUtilExtension",
            ],
        )
        .arg(absolute(wixobj)?)
        .current_dir(dir)
        .timeout(config.command_timeout)
        .execute()
        .await?;
        Ok(dir.join(wixobj.with_extension("msi").file_name().unwrap_or_default()))
    }
}

fn locate_tool(wix_dir: &Path, tool: &str) -> Result<PathBuf> {
    let exe = format!("{tool}.exe");
    [wix_dir.join("bin").join(&exe), wix_dir.join(&exe)]
        .into_iter()
        .find(|candidate| candidate.exists())
        .ok_or_else(|| {
            Error::NotFound(format!(
                "Unable to find '{tool}' utility, WiX directory: [{}]",
                wix_dir.display()
            ))
        })
}

/// Builds an MSI from a transformed descriptor.
///
/// Lays out the inputs with [`stage_installer_inputs`], then compiles and
/// links `wxs`.
pub async fn create_extended_installer(
    config: &HarnessConfig,
    build_root: &Path,
    scratch_images_dir: &Path,
    inst_build_dir: &Path,
    wxs: &Path,
) -> Result<PathBuf> {
    stage_installer_inputs(build_root, scratch_images_dir, inst_build_dir).await?;

    let toolset = WixToolset::locate(config).await?;
    let wixobj = toolset.compile(config, inst_build_dir, wxs).await?;
    let msi = toolset.link(config, inst_build_dir, &wixobj).await?;
    log::info!("✓ Created MSI installer: {}", msi.display());
    Ok(msi)
}

/// Places the files an extended descriptor references relative to the
/// build directory: `<scratch>/jdk`, `<inst_build>/resources` and
/// `<scratch>/vendor_ext1`, moved from where the transform wrote it.
pub async fn stage_installer_inputs(
    build_root: &Path,
    scratch_images_dir: &Path,
    inst_build_dir: &Path,
) -> Result<()> {
    let vendor_ext1 = inst_build_dir.join("vendor_ext1");
    if !vendor_ext1.is_dir() {
        return Err(Error::NotFound(format!(
            "Unable to find vendor extension files, path: [{}]",
            vendor_ext1.display()
        )));
    }

    let jdk_image = build_root.join("images").join("jdk");
    copy_dir_recursive(&jdk_image, &scratch_images_dir.join("jdk")).await?;
    let resources = build_root.join("images").join("installermsi").join("resources");
    copy_dir_recursive(&resources, &inst_build_dir.join("resources")).await?;

    let dest = scratch_images_dir.join("vendor_ext1");
    tokio::fs::rename(&vendor_ext1, &dest)
        .await
        .fs_context("moving vendor extension files", &vendor_ext1)?;
    Ok(())
}
