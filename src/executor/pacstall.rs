use anyhow::{bail, Context, Result};
use std::process::Command;

/// Test-install the patched pacscript with pacstall. Interactive output goes
/// straight to the operator's terminal.
pub fn install(stem: &str) -> Result<()> {
    let status = Command::new("pacstall")
        .arg("-Il")
        .arg(stem)
        .status()
        .context("Failed to launch pacstall")?;

    if !status.success() {
        match status.code() {
            Some(code) => bail!("pacstall exited with return code {}", code),
            None => bail!("pacstall terminated by signal"),
        }
    }
    Ok(())
}
