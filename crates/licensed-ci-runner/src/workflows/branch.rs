//! Branch workflow: stage metadata updates on a companion `<branch>-licenses`
//! branch and route them through a reviewable pull request.

use anyhow::{bail, Result};
use licensed_ci_github::PullRequest;
use tracing::{info, warn};

use super::{WorkflowEnv, LICENSES_SUFFIX};
use crate::git;

const PULL_REQUEST_BODY: &str = "\
This PR was automatically opened by the licensed-ci action.
It contains updates to cached dependency license metadata to be merged into <base>.

Please review the changed files and adjust as needed before merging.

<comment>

/cc @<actor>";

pub async fn run(env: &WorkflowEnv<'_>) -> Result<()> {
    let user_branch = env.user_branch()?;
    if user_branch.ends_with(LICENSES_SUFFIX) {
        info!("{user_branch} is already a licenses branch, nothing to do");
        env.outputs.set("user_branch", &user_branch);
        env.outputs.set("licenses_branch", &user_branch);
        env.outputs.set("licenses_updated", "false");
        return Ok(());
    }

    let licenses_branch = format!("{user_branch}{LICENSES_SUFFIX}");
    env.outputs.set("user_branch", &user_branch);
    env.outputs.set("licenses_branch", &licenses_branch);

    // Fast path: cached metadata already matches the dependency state.
    if env.tool.status().await?.success {
        info!("cached metadata up to date");
        env.outputs.set("licenses_updated", "false");
        if env.inputs.cleanup_on_success {
            cleanup(env, &licenses_branch, &user_branch).await?;
        }
        return Ok(());
    }

    git::ensure_branch(env.work_dir, &licenses_branch, &user_branch).await?;

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
        git::push(env.work_dir, &licenses_branch).await?;
        licenses_updated = true;

        let existing = env
            .github
            .find_pull_request(&env.context.repository, &licenses_branch, Some(&user_branch))
            .await?;
        let pull_request = match existing {
            Some(pr) => {
                if let Some(comment) = env.inputs.pr_comment() {
                    info!("adding comment to pull request #{}", pr.number);
                    env.github
                        .create_comment(&env.context.repository, pr.number, comment)
                        .await?;
                }
                pr
            }
            None => open_pull_request(env, &licenses_branch, &user_branch).await?,
        };
        env.outputs.set("pr_url", &pull_request.html_url);
        env.outputs.set("pr_number", &pull_request.number.to_string());
    }

    env.outputs
        .set("licenses_updated", if licenses_updated { "true" } else { "false" });

    if !env.tool.status().await?.success {
        bail!("Cached metadata checks failed");
    }

    git::checkout(env.work_dir, &user_branch).await?;
    Ok(())
}

/// Open the licenses pull request and ask the triggering actor for review.
async fn open_pull_request(
    env: &WorkflowEnv<'_>,
    head: &str,
    base: &str,
) -> Result<PullRequest> {
    let comment = env.inputs.pr_comment().unwrap_or_default();
    let body = PULL_REQUEST_BODY
        .replace("<base>", base)
        .replace("<comment>", comment)
        .replace("<actor>", &env.context.actor);
    let title = format!("License updates for {base}");

    let pull_request = env
        .github
        .create_pull_request(&env.context.repository, head, base, &title, &body)
        .await?;

    // Review requests are best-effort; the actor may not be a collaborator.
    if !env.context.actor.is_empty() {
        if let Err(e) = env
            .github
            .request_review(
                &env.context.repository,
                pull_request.number,
                &[env.context.actor.clone()],
            )
            .await
        {
            warn!("review request failed: {e}");
        }
    }

    Ok(pull_request)
}

/// The metadata is in sync: retire the staging PR and its branch.
async fn cleanup(env: &WorkflowEnv<'_>, licenses_branch: &str, user_branch: &str) -> Result<()> {
    let pull_request = env
        .github
        .find_pull_request(&env.context.repository, licenses_branch, Some(user_branch))
        .await?;
    if let Some(pr) = pull_request {
        if pr.is_open() {
            info!("closing pull request #{}", pr.number);
            env.github
                .close_pull_request(&env.context.repository, pr.number)
                .await?;
        }
    }

    git::delete_remote_branch(env.work_dir, licenses_branch).await?;
    Ok(())
}
