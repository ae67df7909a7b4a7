mod client;
pub mod mock;
mod retry;

pub use client::GitHubClient;
pub use mock::MockGitHub;
pub use retry::RetryConfig;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("rate limited: {message}")]
    RateLimited {
        message: String,
        /// Delay requested by the server, when it sent one.
        retry_after_ms: Option<u64>,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("http error: {0}")]
    Http(String),

    #[error("json decode: {0}")]
    Decode(String),
}

/// A pull request as reported by the hosting API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
    pub state: String,
}

impl PullRequest {
    pub fn is_open(&self) -> bool {
        self.state == "open"
    }
}

/// The hosting API operations the workflows need.
///
/// `GitHubClient` is the REST implementation; `MockGitHub` records calls for
/// tests.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Find the most recently updated open pull request from `head`,
    /// optionally restricted to a base branch.
    async fn find_pull_request(
        &self,
        repo: &str,
        head: &str,
        base: Option<&str>,
    ) -> Result<Option<PullRequest>, ApiError>;

    async fn create_comment(
        &self,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<(), ApiError>;

    async fn create_pull_request(
        &self,
        repo: &str,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest, ApiError>;

    async fn close_pull_request(&self, repo: &str, number: u64) -> Result<PullRequest, ApiError>;

    async fn request_review(
        &self,
        repo: &str,
        number: u64,
        reviewers: &[String],
    ) -> Result<(), ApiError>;
}
