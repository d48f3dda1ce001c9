// Prints the version this binary was built from.

use anyhow::Result;
use std::process::ExitCode;

pub fn run() -> Result<ExitCode> {
    println!("dotbins {}", env!("CARGO_PKG_VERSION"));
    Ok(ExitCode::SUCCESS)
}
