use anyhow::{bail, Context as _, Result};
use clap::Parser;
use licensed_ci_core::{Context, Inputs, StepOutputs};
use licensed_ci_github::GitHubClient;
use licensed_ci_runner::tool::{LicenseTool, LicensedCli};
use licensed_ci_runner::workflows::{Workflow, WorkflowEnv};
use licensed_ci_runner::{git, preflight};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let inputs = Inputs::parse();
    inputs.validate()?;
    let workflow: Workflow = inputs.workflow.parse()?;
    let context = Context::from_env()?;

    preflight::run_all(&inputs)?;

    let work_dir = std::env::current_dir().context("resolve working directory")?;

    git::configure_user(&work_dir, &inputs.user_name, &inputs.user_email).await?;
    git::add_remote(
        &work_dir,
        &git::token_url(&context.repository, &inputs.github_token),
    )
    .await?;

    let github = GitHubClient::new(&inputs.github_token);
    let tool = LicensedCli::new(&inputs.command, inputs.cli_options(), &work_dir)?;
    let outputs = StepOutputs::from_env();

    let env = WorkflowEnv {
        context: &context,
        inputs: &inputs,
        github: &github,
        tool: &tool,
        outputs: &outputs,
        work_dir: &work_dir,
    };

    info!("running {workflow} workflow for {}", context.repository);
    workflow.run(&env).await?;

    // Final verification on the checked-out branch. The branch workflow
    // leaves the user branch failing here until its pull request merges.
    let status = tool.status().await?;
    if !status.success {
        if !status.log.is_empty() {
            info!("{}", status.log.trim());
        }
        bail!("Cached metadata checks failed");
    }

    Ok(())
}
