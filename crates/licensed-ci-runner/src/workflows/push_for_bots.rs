//! Dispatcher for runs triggered by bots: direct pushes for bot senders,
//! reviewable pull requests for everyone else.

use anyhow::Result;
use tracing::info;

use super::{branch, push, WorkflowEnv, LICENSES_SUFFIX};
use crate::git;

/// Choose between the branch and push workflows, preferring the reviewable
/// branch workflow whenever the situation is ambiguous.
pub async fn run(env: &WorkflowEnv<'_>) -> Result<()> {
    if has_licenses_branch(env).await? {
        info!("licenses branch detected, choosing branch workflow");
        branch::run(env).await
    } else if !env.context.is_bot_sender() {
        info!("user sender detected, choosing branch workflow");
        branch::run(env).await
    } else {
        info!("bot sender and no licenses branch, choosing push workflow");
        push::run(env).await
    }
}

async fn has_licenses_branch(env: &WorkflowEnv<'_>) -> Result<bool> {
    let branch = env.user_branch()?;
    if branch.ends_with(LICENSES_SUFFIX) {
        return Ok(true);
    }
    git::remote_branch_exists(env.work_dir, &format!("{branch}{LICENSES_SUFFIX}")).await
}
