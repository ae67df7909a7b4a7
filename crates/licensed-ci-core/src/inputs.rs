use std::path::PathBuf;

use clap::Parser;

use crate::error::ConfigError;
use crate::options::CliOptions;

/// Action inputs for one invocation.
///
/// GitHub Actions delivers inputs as `INPUT_*` environment variables; the
/// equivalent long flags are accepted for local runs. Inputs the action
/// declares as required are validated separately with [`Inputs::validate`]
/// because Actions sets unset inputs to an empty string rather than leaving
/// the variable undefined.
#[derive(Debug, Clone, Parser)]
#[command(name = "licensed-ci", about = "Keep cached license metadata in sync from CI")]
pub struct Inputs {
    /// Update workflow to run (branch, push or push_for_bots).
    #[arg(long, env = "INPUT_WORKFLOW")]
    pub workflow: String,

    /// Token used for pushes and hosting API calls.
    #[arg(long, env = "INPUT_GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: String,

    /// License tool invocation, e.g. `licensed` or `bundle exec licensed`.
    #[arg(long, env = "INPUT_COMMAND")]
    pub command: String,

    /// Path to the license tool configuration file.
    #[arg(long, env = "INPUT_CONFIG_FILE")]
    pub config_file: PathBuf,

    /// Commit author name.
    #[arg(long, env = "INPUT_USER_NAME")]
    pub user_name: String,

    /// Commit author email.
    #[arg(long, env = "INPUT_USER_EMAIL")]
    pub user_email: String,

    /// Commit message used for metadata updates.
    #[arg(long, env = "INPUT_COMMIT_MESSAGE")]
    pub commit_message: String,

    /// Comment posted on an open pull request after an update.
    #[arg(long, env = "INPUT_PR_COMMENT")]
    pub pr_comment: Option<String>,

    /// Close the licenses pull request and delete its branch once the
    /// status check passes.
    #[arg(long, env = "INPUT_CLEANUP_ON_SUCCESS")]
    pub cleanup_on_success: bool,

    /// Branch to operate on instead of the one derived from GITHUB_REF.
    #[arg(long, env = "INPUT_BRANCH")]
    pub branch: Option<String>,

    /// Restrict the license tool to these dependency sources.
    #[arg(long, env = "INPUT_SOURCES", value_delimiter = ',')]
    pub sources: Vec<String>,

    /// Cache format passed through to the license tool.
    #[arg(long, env = "INPUT_FORMAT")]
    pub format: Option<String>,
}

impl Inputs {
    /// Reject required inputs that arrived as empty strings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workflow.is_empty() {
            return Err(ConfigError::MissingInput("workflow"));
        }
        if self.github_token.is_empty() {
            return Err(ConfigError::MissingInput("github_token"));
        }
        if self.command.is_empty() {
            return Err(ConfigError::MissingInput("command"));
        }
        if self.config_file.as_os_str().is_empty() {
            return Err(ConfigError::MissingInput("config_file"));
        }
        if self.user_name.is_empty() {
            return Err(ConfigError::MissingInput("user_name"));
        }
        if self.user_email.is_empty() {
            return Err(ConfigError::MissingInput("user_email"));
        }
        if self.commit_message.is_empty() {
            return Err(ConfigError::MissingInput("commit_message"));
        }
        Ok(())
    }

    /// The PR comment input, when a non-empty one was provided. Actions
    /// delivers unset inputs as empty strings.
    pub fn pr_comment(&self) -> Option<&str> {
        self.pr_comment.as_deref().filter(|c| !c.is_empty())
    }

    /// The branch override, when a non-empty one was provided.
    pub fn branch_override(&self) -> Option<&str> {
        self.branch.as_deref().filter(|b| !b.is_empty())
    }

    /// Argument shaping for the license tool subcommands.
    pub fn cli_options(&self) -> CliOptions {
        CliOptions::new(
            self.config_file.clone(),
            self.sources
                .iter()
                .filter(|s| !s.is_empty())
                .cloned()
                .collect(),
            self.format.clone().filter(|f| !f.is_empty()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Vec<&'static str> {
        vec![
            "licensed-ci",
            "--workflow",
            "push",
            "--github-token",
            "token",
            "--command",
            "licensed",
            "--config-file",
            ".licensed.yml",
            "--user-name",
            "Licensed CI",
            "--user-email",
            "licensed-ci@example.com",
            "--commit-message",
            "Auto-update license files",
        ]
    }

    #[test]
    fn parses_required_inputs() {
        let inputs = Inputs::try_parse_from(base_args()).unwrap();
        inputs.validate().unwrap();
        assert_eq!(inputs.workflow, "push");
        assert_eq!(inputs.config_file, PathBuf::from(".licensed.yml"));
        assert!(!inputs.cleanup_on_success);
        assert!(inputs.sources.is_empty());
    }

    #[test]
    fn missing_token_is_an_error() {
        let args: Vec<_> = base_args()
            .into_iter()
            .filter(|a| *a != "--github-token" && *a != "token")
            .collect();
        let err = Inputs::try_parse_from(args).unwrap_err();
        assert!(err.to_string().contains("--github-token"));
    }

    #[test]
    fn empty_required_input_names_the_input() {
        let mut args = base_args();
        args[4] = ""; // github token value
        let inputs = Inputs::try_parse_from(args).unwrap();
        let err = inputs.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "required input `github_token` is missing"
        );
    }

    #[test]
    fn empty_user_email_names_the_input() {
        let mut args = base_args();
        args[12] = ""; // user email value
        let inputs = Inputs::try_parse_from(args).unwrap();
        let err = inputs.validate().unwrap_err();
        assert!(err.to_string().contains("user_email"));
    }

    #[test]
    fn empty_optional_inputs_read_as_absent() {
        let mut args = base_args();
        args.extend(["--pr-comment", "", "--branch", "", "--format", ""]);
        let inputs = Inputs::try_parse_from(args).unwrap();
        assert_eq!(inputs.pr_comment(), None);
        assert_eq!(inputs.branch_override(), None);
        assert_eq!(inputs.cli_options().format, None);
    }

    #[test]
    fn sources_are_comma_separated() {
        let mut args = base_args();
        args.extend(["--sources", "bundler,npm"]);
        let inputs = Inputs::try_parse_from(args).unwrap();
        assert_eq!(inputs.sources, vec!["bundler", "npm"]);
    }
}
