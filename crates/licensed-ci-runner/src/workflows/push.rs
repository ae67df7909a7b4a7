//! Push workflow: commit metadata updates directly to the triggering branch.

use anyhow::{bail, Result};
use tracing::info;

use super::WorkflowEnv;
use crate::git;

pub async fn run(env: &WorkflowEnv<'_>) -> Result<()> {
    let branch = env.user_branch()?;
    env.outputs.set("licenses_branch", &branch);
    env.outputs.set("user_branch", &branch);

    // Fast path: cached metadata already matches the dependency state.
    if env.tool.status().await?.success {
        info!("cached metadata up to date");
        env.outputs.set("licenses_updated", "false");
        return Ok(());
    }

    git::ensure_branch(env.work_dir, &branch, &branch).await?;

    // Find an open pull request for the branch, if one exists.
    let pull_request = env
        .github
        .find_pull_request(&env.context.repository, &branch, None)
        .await?;

    env.tool.cache().await?;

    let cache_paths = env.tool.cache_paths().await;
    git::add(env.work_dir, &cache_paths).await?;

    let mut licenses_updated = false;
    if git::has_staged_changes(env.work_dir, &cache_paths).await? {
        git::commit(
            env.work_dir,
            &env.inputs.commit_message,
            &env.inputs.user_name,
            &env.inputs.user_email,
        )
        .await?;
        git::push(env.work_dir, &branch).await?;
        licenses_updated = true;

        if let (Some(comment), Some(pr)) = (env.inputs.pr_comment(), &pull_request) {
            info!("adding comment to pull request #{}", pr.number);
            env.github
                .create_comment(&env.context.repository, pr.number, comment)
                .await?;
        }
    }

    env.outputs
        .set("licenses_updated", if licenses_updated { "true" } else { "false" });
    if let Some(pr) = &pull_request {
        env.outputs.set("pr_url", &pr.html_url);
        env.outputs.set("pr_number", &pr.number.to_string());
    }

    if !env.tool.status().await?.success {
        bail!("Cached metadata checks failed");
    }
    Ok(())
}
