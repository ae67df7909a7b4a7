pub mod branch;
pub mod push;
pub mod push_for_bots;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::Result;
use licensed_ci_core::{ConfigError, Context, Inputs, StepOutputs};
use licensed_ci_github::GitHubApi;

use crate::tool::LicenseTool;

/// Suffix of the companion branch used to stage metadata updates.
pub const LICENSES_SUFFIX: &str = "-licenses";

pub const VALID_WORKFLOWS: &str = "branch, push, push_for_bots";

/// The closed set of update workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    Branch,
    Push,
    PushForBots,
}

impl FromStr for Workflow {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "branch" => Ok(Self::Branch),
            "push" => Ok(Self::Push),
            "push_for_bots" => Ok(Self::PushForBots),
            other => Err(ConfigError::UnknownWorkflow {
                value: other.to_string(),
                valid: VALID_WORKFLOWS.to_string(),
            }),
        }
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Branch => "branch",
            Self::Push => "push",
            Self::PushForBots => "push_for_bots",
        })
    }
}

impl Workflow {
    pub async fn run(self, env: &WorkflowEnv<'_>) -> Result<()> {
        match self {
            Self::Branch => branch::run(env).await,
            Self::Push => push::run(env).await,
            Self::PushForBots => push_for_bots::run(env).await,
        }
    }
}

/// Collaborators and configuration for one workflow invocation.
pub struct WorkflowEnv<'a> {
    pub context: &'a Context,
    pub inputs: &'a Inputs,
    pub github: &'a dyn GitHubApi,
    pub tool: &'a dyn LicenseTool,
    pub outputs: &'a StepOutputs,
    pub work_dir: &'a Path,
}

impl WorkflowEnv<'_> {
    /// The branch this invocation operates on.
    pub fn user_branch(&self) -> Result<String, ConfigError> {
        self.context.branch(self.inputs.branch_override())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_workflows() {
        assert_eq!("branch".parse::<Workflow>().unwrap(), Workflow::Branch);
        assert_eq!("push".parse::<Workflow>().unwrap(), Workflow::Push);
        assert_eq!(
            "push_for_bots".parse::<Workflow>().unwrap(),
            Workflow::PushForBots
        );
    }

    #[test]
    fn unknown_workflow_lists_valid_names() {
        let err = "rebase".parse::<Workflow>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "workflow input value \"rebase\" must be one of: branch, push, push_for_bots"
        );
    }

    #[test]
    fn display_round_trips() {
        for w in [Workflow::Branch, Workflow::Push, Workflow::PushForBots] {
            assert_eq!(w.to_string().parse::<Workflow>().unwrap(), w);
        }
    }
}
