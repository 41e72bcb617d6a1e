//! Command line interface for installermsi.
//!
//! Parses arguments, dispatches to the stamper or the MSI builder and maps
//! failures to exit code 1.

mod args;

pub use args::{Args, Command, StampArgs};

use std::path::{Path, PathBuf};

use clap::Parser;
use clap::error::ErrorKind;

use crate::error::{CliError, Result};
use crate::harness::paths::{absolute, find_build_root};
use crate::harness::{HarnessConfig, files::unique_path, wix::create_extended_installer};
use crate::stamp;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    run_from(std::env::args_os()).await
}

/// Runs the CLI with explicit arguments (first item is the program name).
pub async fn run_from<I, T>(argv: I) -> Result<i32>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let args = match Args::try_parse_from(argv) {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.print()?;
            return Ok(0);
        }
        Err(e) => {
            return Err(CliError::InvalidArguments {
                reason: e.to_string().trim_end().to_string(),
            }
            .into());
        }
    };

    match args.command {
        Command::Stamp { args } => {
            let stamp_args = StampArgs::from_positional(&args)?;
            stamp::stamp(&stamp_args.input, &stamp_args.output, &stamp_args.versions).await?;
        }
        Command::BuildMsi {
            wxs,
            build_root,
            images,
        } => {
            let msi = build_msi(&wxs, build_root, images).await?;
            println!("{}", msi.display());
        }
    }
    Ok(0)
}

async fn build_msi(
    wxs: &Path,
    build_root: Option<PathBuf>,
    images: Option<PathBuf>,
) -> Result<PathBuf> {
    let config = HarnessConfig::from_env()?;

    let wxs = absolute(wxs)?;
    let inst_build_dir = wxs.parent().map(Path::to_path_buf).ok_or_else(|| {
        CliError::ExecutionFailed {
            command: "build-msi".to_string(),
            reason: format!("descriptor has no parent directory: {}", wxs.display()),
        }
    })?;
    let build_root = match build_root {
        Some(dir) => absolute(&dir)?,
        None => find_build_root(&config)?,
    };
    let scratch_images_dir = match images {
        Some(dir) => dir,
        None => unique_path(&config.work_dir, "images"),
    };
    tokio::fs::create_dir_all(&scratch_images_dir).await?;

    let msi = create_extended_installer(
        &config,
        &build_root,
        &scratch_images_dir,
        &inst_build_dir,
        &wxs,
    )
    .await?;
    Ok(msi)
}
