use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use licensed_ci_core::Inputs;
use tracing::info;

/// Validate the environment before any mutating subprocess runs.
pub fn run_all(inputs: &Inputs) -> Result<()> {
    check_git()?;
    check_command(&inputs.command)?;
    check_config_file(&inputs.config_file)?;
    info!("all preflight checks passed");
    Ok(())
}

fn check_git() -> Result<()> {
    let output = Command::new("git")
        .arg("--version")
        .output()
        .context("git is not installed")?;
    if !output.status.success() {
        bail!("git --version failed");
    }
    info!("git: {}", String::from_utf8_lossy(&output.stdout).trim());
    Ok(())
}

/// The command string may carry leading words (`bundle exec licensed`);
/// only the first token must resolve on PATH.
fn check_command(command: &str) -> Result<()> {
    let program = command
        .split_whitespace()
        .next()
        .context("license tool command is empty")?;
    which::which(program)
        .with_context(|| format!("license tool `{program}` was not found on PATH"))?;
    Ok(())
}

fn check_config_file(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("config file {} does not exist", path.display());
    }
    Ok(())
}
