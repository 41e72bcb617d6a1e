//! installermsi - OpenJDK MSI installer descriptor tooling.
//!
//! This binary stamps version numbers into the WiX installer descriptor and
//! builds MSI packages from extended descriptors.

use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match installermsi::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };

    process::exit(exit_code);
}
