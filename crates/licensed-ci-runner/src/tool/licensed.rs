use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use licensed_ci_core::CliOptions;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{LicenseTool, StatusOutcome};

#[derive(Debug, Deserialize)]
struct EnvReport {
    apps: Vec<EnvApp>,
}

#[derive(Debug, Deserialize)]
struct EnvApp {
    cache_path: String,
}

/// The `licensed` CLI, invoked as configured by the action inputs.
pub struct LicensedCli {
    program: String,
    leading_args: Vec<String>,
    options: CliOptions,
    work_dir: PathBuf,
}

impl LicensedCli {
    /// Split a command string such as `bundle exec licensed` into the
    /// program and its leading arguments.
    pub fn new(command: &str, options: CliOptions, work_dir: &Path) -> Result<Self> {
        let mut words = command.split_whitespace().map(String::from);
        let program = words.next().context("license tool command is empty")?;
        Ok(Self {
            program,
            leading_args: words.collect(),
            options,
            work_dir: work_dir.to_path_buf(),
        })
    }

    async fn run(&self, args: &[String]) -> Result<Output> {
        Command::new(&self.program)
            .args(&self.leading_args)
            .args(args)
            .current_dir(&self.work_dir)
            .output()
            .await
            .with_context(|| format!("spawn {}", self.program))
    }
}

#[async_trait]
impl LicenseTool for LicensedCli {
    async fn cache(&self) -> Result<()> {
        let output = self.run(&self.options.cache_args()).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{} cache failed: {}", self.program, stderr.trim());
        }
        Ok(())
    }

    async fn status(&self) -> Result<StatusOutcome> {
        let output = self.run(&self.options.status_args()).await?;
        Ok(StatusOutcome {
            success: output.status.success(),
            log: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }

    async fn cache_paths(&self) -> Vec<String> {
        let output = match self.run(&self.options.env_args()).await {
            Ok(output) => output,
            Err(e) => {
                warn!("env lookup failed: {e}");
                return vec![".".to_string()];
            }
        };

        if output.status.success() && !output.stdout.is_empty() {
            match serde_json::from_slice::<EnvReport>(&output.stdout) {
                Ok(report) => {
                    return report.apps.into_iter().map(|app| app.cache_path).collect();
                }
                Err(e) => debug!("env output not parseable: {e}"),
            }
        }

        // Stage the whole tree when the tool cannot report its cache paths.
        vec![".".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> CliOptions {
        CliOptions::new(PathBuf::from(".licensed.yml"), Vec::new(), None)
    }

    #[test]
    fn splits_command_into_program_and_args() {
        let cli = LicensedCli::new("bundle exec licensed", options(), Path::new(".")).unwrap();
        assert_eq!(cli.program, "bundle");
        assert_eq!(cli.leading_args, vec!["exec", "licensed"]);
    }

    #[test]
    fn bare_command_has_no_leading_args() {
        let cli = LicensedCli::new("licensed", options(), Path::new(".")).unwrap();
        assert_eq!(cli.program, "licensed");
        assert!(cli.leading_args.is_empty());
    }

    #[test]
    fn empty_command_is_an_error() {
        assert!(LicensedCli::new("  ", options(), Path::new(".")).is_err());
    }

    #[test]
    fn env_report_decodes_cache_paths() {
        let raw = r#"{
            "apps": [
                { "name": "gem", "cache_path": "a/licenses" },
                { "name": "npm", "cache_path": "b/licenses" }
            ]
        }"#;
        let report: EnvReport = serde_json::from_str(raw).unwrap();
        let paths: Vec<_> = report.apps.into_iter().map(|a| a.cache_path).collect();
        assert_eq!(paths, vec!["a/licenses", "b/licenses"]);
    }
}
