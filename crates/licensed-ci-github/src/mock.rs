//! In-memory API double for workflow tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{ApiError, GitHubApi, PullRequest};

/// A recorded pull request creation.
#[derive(Debug, Clone)]
pub struct CreatedPull {
    pub head: String,
    pub base: String,
    pub title: String,
    pub body: String,
    pub number: u64,
}

/// Mock hosting API that returns a configurable search result and records
/// every mutating call for assertions.
#[derive(Default)]
pub struct MockGitHub {
    open_pr: Mutex<Option<PullRequest>>,
    created: Mutex<Vec<CreatedPull>>,
    comments: Mutex<Vec<(u64, String)>>,
    closed: Mutex<Vec<u64>>,
    review_requests: Mutex<Vec<(u64, Vec<String>)>>,
    review_fail: bool,
    pr_counter: AtomicU64,
}

impl MockGitHub {
    pub fn new() -> Self {
        Self {
            pr_counter: AtomicU64::new(1),
            ..Self::default()
        }
    }

    /// Make `find_pull_request` return this pull request.
    pub fn with_open_pr(self, pr: PullRequest) -> Self {
        *self.open_pr.lock().unwrap() = Some(pr);
        self
    }

    pub fn with_review_fail(mut self) -> Self {
        self.review_fail = true;
        self
    }

    pub fn created_pulls(&self) -> Vec<CreatedPull> {
        self.created.lock().unwrap().clone()
    }

    pub fn comments(&self) -> Vec<(u64, String)> {
        self.comments.lock().unwrap().clone()
    }

    pub fn closed_numbers(&self) -> Vec<u64> {
        self.closed.lock().unwrap().clone()
    }

    pub fn review_requests(&self) -> Vec<(u64, Vec<String>)> {
        self.review_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GitHubApi for MockGitHub {
    async fn find_pull_request(
        &self,
        _repo: &str,
        _head: &str,
        _base: Option<&str>,
    ) -> Result<Option<PullRequest>, ApiError> {
        Ok(self.open_pr.lock().unwrap().clone())
    }

    async fn create_comment(
        &self,
        _repo: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<(), ApiError> {
        self.comments
            .lock()
            .unwrap()
            .push((issue_number, body.to_string()));
        Ok(())
    }

    async fn create_pull_request(
        &self,
        _repo: &str,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest, ApiError> {
        let number = self.pr_counter.fetch_add(1, Ordering::SeqCst);
        self.created.lock().unwrap().push(CreatedPull {
            head: head.to_string(),
            base: base.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            number,
        });
        Ok(PullRequest {
            number,
            html_url: format!("https://github.com/test/repo/pull/{number}"),
            state: "open".to_string(),
        })
    }

    async fn close_pull_request(&self, _repo: &str, number: u64) -> Result<PullRequest, ApiError> {
        self.closed.lock().unwrap().push(number);
        Ok(PullRequest {
            number,
            html_url: format!("https://github.com/test/repo/pull/{number}"),
            state: "closed".to_string(),
        })
    }

    async fn request_review(
        &self,
        _repo: &str,
        number: u64,
        reviewers: &[String],
    ) -> Result<(), ApiError> {
        if self.review_fail {
            return Err(ApiError::Api {
                status: 422,
                message: "Reviews may only be requested from collaborators".into(),
            });
        }
        self.review_requests
            .lock()
            .unwrap()
            .push((number, reviewers.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_created_pulls() {
        let mock = MockGitHub::new();
        let pr = mock
            .create_pull_request("t/r", "main-licenses", "main", "title", "body")
            .await
            .unwrap();
        assert_eq!(pr.number, 1);
        let created = mock.created_pulls();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].head, "main-licenses");
        assert_eq!(created[0].base, "main");
    }

    #[tokio::test]
    async fn find_returns_seeded_pr() {
        let mock = MockGitHub::new().with_open_pr(PullRequest {
            number: 9,
            html_url: "https://github.com/t/r/pull/9".into(),
            state: "open".into(),
        });
        let found = mock.find_pull_request("t/r", "main", None).await.unwrap();
        assert_eq!(found.unwrap().number, 9);
    }

    #[tokio::test]
    async fn review_fail_is_configurable() {
        let mock = MockGitHub::new().with_review_fail();
        let err = mock
            .request_review("t/r", 1, &["octocat".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Api { status: 422, .. }));
    }
}
