//! Installing, uninstalling and unpacking MSI packages with `msiexec`.

use std::path::{Path, PathBuf};

use super::config::{HarnessConfig, MSIEXEC_INSTALL_IN_PROGRESS};
use super::error::{Error, ErrorExt, Result};
use super::files::unique_path;
use super::paths::absolute_display;
use super::process::{ExecOutput, Executor};

/// Well-known SID of the local Administrators group as shown by `whoami`.
const ADMINISTRATORS_GROUP_SID: &str = "S-1-5-114";

/// Runs an msiexec invocation, retrying while another install is running.
async fn run_msiexec_with_retries(config: &HarnessConfig, exec: Executor) -> Result<ExecOutput> {
    let exec = exec.timeout(config.command_timeout);
    let mut attempt = 0;
    loop {
        let output = exec.output().await?;
        match output.code {
            Some(0) => return Ok(output),
            Some(MSIEXEC_INSTALL_IN_PROGRESS) if attempt < config.msiexec_retries => {
                attempt += 1;
                log::warn!(
                    "Another installation is in progress, retrying in {}s (attempt {}/{})",
                    config.msiexec_retry_delay.as_secs(),
                    attempt,
                    config.msiexec_retries
                );
                tokio::time::sleep(config.msiexec_retry_delay).await;
            }
            code => {
                return Err(Error::UnexpectedExitCode {
                    command: exec.command_line(),
                    code,
                    expected: 0,
                    stderr: output.stderr,
                });
            }
        }
    }
}

/// Writes `line` to a fresh `.bat` file in the working directory.
///
/// Property values holding paths with spaces (`INSTALLDIR="..."`) survive
/// `cmd` quoting but not direct argument passing.
async fn write_batch(config: &HarnessConfig, name: &str, line: &str) -> Result<PathBuf> {
    let bat = unique_path(&config.work_dir, name);
    tokio::fs::write(&bat, format!("{line}\r\n"))
        .await
        .fs_context("writing batch file", &bat)?;
    Ok(bat)
}

/// Command line of a quiet msiexec install into `installed`.
pub fn install_command_line(
    msiexec: &Path,
    msi: &Path,
    installed: &Path,
    options: &[&str],
) -> Result<String> {
    let mut parts = vec![
        absolute_display(msiexec)?,
        "/q".to_string(),
        "/i".to_string(),
        absolute_display(msi)?,
        "/norestart".to_string(),
        "/l*v".to_string(),
        "install.log".to_string(),
        format!("INSTALLDIR=\"{}\"", absolute_display(installed)?),
    ];
    parts.extend(options.iter().map(|o| o.to_string()));
    Ok(parts.join(" "))
}

/// Installs `msi` quietly into a new unique directory and returns it.
///
/// `options` are extra MSI properties such as `ADDLOCAL=jdk_env_path`.
pub async fn install(config: &HarnessConfig, msi: &Path, options: &[&str]) -> Result<PathBuf> {
    let installed = unique_path(&config.work_dir, "installed");
    let line = install_command_line(&config.system32("msiexec.exe"), msi, &installed, options)?;
    let bat = write_batch(config, "install.bat", &line).await?;

    log::info!("Installing {} into {}", msi.display(), installed.display());
    let exec = Executor::of(config.system32("cmd.exe"), ["/c"])
        .arg(absolute_display(&bat)?)
        .current_dir(&config.work_dir);
    run_msiexec_with_retries(config, exec).await?;
    Ok(installed)
}

/// Uninstalls `msi` quietly.
pub async fn uninstall(config: &HarnessConfig, msi: &Path) -> Result<()> {
    log::info!("Uninstalling {}", msi.display());
    let exec = Executor::of(config.system32("msiexec.exe"), ["/q", "/x"])
        .arg(absolute_display(msi)?)
        .arg("/l*v")
        .arg("uninstall.log")
        .current_dir(&config.work_dir);
    run_msiexec_with_retries(config, exec).await?;
    Ok(())
}

/// Performs an administrative install of `msi` and returns the unpacked JDK.
///
/// Works without administrator rights once `Users` may modify the target.
pub async fn unpack(config: &HarnessConfig, msi: &Path) -> Result<PathBuf> {
    let unpacked = unique_path(&config.work_dir, "unpacked");
    tokio::fs::create_dir_all(&unpacked)
        .await
        .fs_context("creating unpack directory", &unpacked)?;

    Executor::of(config.system32("icacls.exe"), Vec::<String>::new())
        .arg(absolute_display(&unpacked)?)
        .arg("/inheritance:e")
        .arg("/grant")
        .arg("Users:M")
        .timeout(config.command_timeout)
        .execute()
        .await?;

    let line = [
        absolute_display(&config.system32("msiexec.exe"))?,
        "/q".to_string(),
        "/a".to_string(),
        absolute_display(msi)?,
        "/l*v".to_string(),
        "unpack.log".to_string(),
        format!("TARGETDIR=\"{}\"", absolute_display(&unpacked)?),
    ]
    .join(" ");
    let bat = write_batch(config, "unpack.bat", &line).await?;

    log::info!("Unpacking {} into {}", msi.display(), unpacked.display());
    let exec = Executor::of(config.system32("cmd.exe"), ["/c"])
        .arg(absolute_display(&bat)?)
        .current_dir(&config.work_dir);
    run_msiexec_with_retries(config, exec).await?;
    Ok(unpacked.join("openjdk"))
}

/// Whether `whoami /groups` output lists the Administrators group.
pub fn groups_include_administrators(lines: &[String]) -> bool {
    lines.iter().any(|line| line.contains(ADMINISTRATORS_GROUP_SID))
}

pub async fn member_of_administrators_group(config: &HarnessConfig) -> Result<bool> {
    let output = Executor::of(config.system32("whoami.exe"), ["/groups"])
        .timeout(config.command_timeout)
        .execute()
        .await?;
    Ok(groups_include_administrators(&output.stdout))
}

/// Returns true (and warns) when the current user cannot install MSIs.
///
/// Administrators group membership alone does not guarantee success, but
/// its absence guarantees failure.
pub async fn user_cannot_install_msi_packages(config: &HarnessConfig) -> Result<bool> {
    if member_of_administrators_group(config).await? {
        return Ok(false);
    }
    log::warn!("OS user does not have enough permissions to install MSI packages, test run skipped.");
    Ok(true)
}
