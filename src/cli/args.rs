//! Command line argument parsing and validation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::harness::INSTALLERMSI_TEST_BUILD_ROOT;
use crate::stamp::{StampError, Versions};

/// OpenJDK MSI installer descriptor tooling
#[derive(Parser, Debug)]
#[command(
    name = "installermsi",
    version,
    about = "OpenJDK MSI installer descriptor tooling",
    long_about = "Stamps version numbers into the WiX installer descriptor and builds MSI packages from extended descriptors.

Usage:
  installermsi stamp jdk.xml jdk-stamped.xml 21 21.0.2 21.0.2.0
  installermsi build-msi --wxs build/jdk.wxs --build-root build/windows-x86_64-server-release

Exit code 0 = output written."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replace version placeholders in the installer descriptor
    Stamp {
        /// input.xml output.xml VERSION_FEATURE VERSION_NUMBER VERSION_NUMBER_FOUR_POSITIONS
        #[arg(value_name = "ARGS", num_args = 0.., allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Compile and link an extended descriptor into an MSI with WiX
    BuildMsi {
        /// Transformed `.wxs` descriptor; its directory is the installer build directory
        #[arg(long, value_name = "PATH")]
        wxs: PathBuf,

        /// JDK build output directory (contains `images/jdk`)
        #[arg(long, value_name = "DIR", env = INSTALLERMSI_TEST_BUILD_ROOT)]
        build_root: Option<PathBuf>,

        /// Scratch directory the JDK image and vendor files are copied to
        #[arg(long, value_name = "DIR")]
        images: Option<PathBuf>,
    },
}

/// Validated arguments of the `stamp` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub versions: Versions,
}

impl StampArgs {
    /// Requires exactly five positional arguments.
    pub fn from_positional(args: &[String]) -> Result<Self, StampError> {
        match args {
            [input, output, feature, number, number_four] => Ok(Self {
                input: PathBuf::from(input),
                output: PathBuf::from(output),
                versions: Versions::new(feature, number, number_four),
            }),
            _ => Err(StampError::Usage {
                reason: format!("expected 5 arguments, got {}", args.len()),
            }),
        }
    }
}
