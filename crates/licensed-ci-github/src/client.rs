use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::info;

use crate::retry::{self, RetryConfig};
use crate::{ApiError, GitHubApi, PullRequest};

const DEFAULT_API_URL: &str = "https://api.github.com";
const AGENT: &str = "licensed-ci";

#[derive(Debug, serde::Deserialize)]
struct SearchResults {
    total_count: u64,
    items: Vec<PullRequest>,
}

/// REST client for the hosting API.
///
/// Every call carries the token and retries rate-limited responses with
/// backoff before giving up.
pub struct GitHubClient {
    api_url: String,
    client: Client,
    token: String,
    retry: RetryConfig,
}

impl GitHubClient {
    /// Build a client against the default API endpoint, honoring a
    /// `GITHUB_API_URL` override when the environment provides one.
    pub fn new(token: &str) -> Self {
        let api_url =
            std::env::var("GITHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::with_api_url(&api_url, token)
    }

    pub fn with_api_url(api_url: &str, token: &str) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            token: token.to_string(),
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.api_url))
            .bearer_auth(&self.token)
            .header(USER_AGENT, AGENT)
            .header(ACCEPT, "application/vnd.github+json")
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, &str)]>,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        retry::with_retry(&self.retry, || {
            let mut req = self.request(method.clone(), path);
            if let Some(query) = query {
                req = req.query(query);
            }
            if let Some(body) = &body {
                req = req.json(body);
            }
            async move {
                let resp = req.send().await.map_err(|e| ApiError::Http(e.to_string()))?;
                handle_response(resp).await
            }
        })
        .await
    }
}

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return resp
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()));
    }

    // Header inspection happens before the body is consumed.
    let retry_after_ms = retry::retry_after_hint(resp.headers());
    let remaining = resp
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["message"].as_str().map(String::from))
        .unwrap_or(body);

    let rate_limited = status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN
            && (retry_after_ms.is_some() || remaining.as_deref() == Some("0")));

    if rate_limited {
        Err(ApiError::RateLimited {
            message,
            retry_after_ms,
        })
    } else if status == StatusCode::NOT_FOUND {
        Err(ApiError::NotFound(message))
    } else {
        Err(ApiError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Issue search query for open pull requests from a head branch.
fn search_query(repo: &str, head: &str, base: Option<&str>) -> String {
    let mut query = format!("is:pr is:open repo:{repo} head:\"{head}\"");
    if let Some(base) = base {
        query.push_str(&format!(" base:\"{base}\""));
    }
    query
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn find_pull_request(
        &self,
        repo: &str,
        head: &str,
        base: Option<&str>,
    ) -> Result<Option<PullRequest>, ApiError> {
        let query = search_query(repo, head, base);
        let results: SearchResults = self
            .execute(
                Method::GET,
                "/search/issues",
                Some(&[("q", query.as_str())]),
                None,
            )
            .await?;

        if results.total_count == 0 {
            return Ok(None);
        }
        Ok(results.items.into_iter().next())
    }

    async fn create_comment(
        &self,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .execute(
                Method::POST,
                &format!("/repos/{repo}/issues/{issue_number}/comments"),
                None,
                Some(serde_json::json!({ "body": body })),
            )
            .await?;
        Ok(())
    }

    async fn create_pull_request(
        &self,
        repo: &str,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest, ApiError> {
        let pull: PullRequest = self
            .execute(
                Method::POST,
                &format!("/repos/{repo}/pulls"),
                None,
                Some(serde_json::json!({
                    "title": title,
                    "head": head,
                    "base": base,
                    "body": body,
                })),
            )
            .await?;
        info!("opened pull request #{}: {}", pull.number, pull.html_url);
        Ok(pull)
    }

    async fn close_pull_request(&self, repo: &str, number: u64) -> Result<PullRequest, ApiError> {
        self.execute(
            Method::PATCH,
            &format!("/repos/{repo}/pulls/{number}"),
            None,
            Some(serde_json::json!({ "state": "closed" })),
        )
        .await
    }

    async fn request_review(
        &self,
        repo: &str,
        number: u64,
        reviewers: &[String],
    ) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .execute(
                Method::POST,
                &format!("/repos/{repo}/pulls/{number}/requested_reviewers"),
                None,
                Some(serde_json::json!({ "reviewers": reviewers })),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_query_with_head_only() {
        assert_eq!(
            search_query("octo/repo", "main-licenses", None),
            "is:pr is:open repo:octo/repo head:\"main-licenses\""
        );
    }

    #[test]
    fn search_query_with_base() {
        assert_eq!(
            search_query("octo/repo", "main-licenses", Some("main")),
            "is:pr is:open repo:octo/repo head:\"main-licenses\" base:\"main\""
        );
    }

    #[test]
    fn api_url_trailing_slash_is_trimmed() {
        let client = GitHubClient::with_api_url("https://github.example.com/api/v3/", "token");
        assert_eq!(client.api_url, "https://github.example.com/api/v3");
    }

    #[test]
    fn search_results_decode() {
        let raw = r#"{
            "total_count": 1,
            "incomplete_results": false,
            "items": [
                { "number": 42, "html_url": "https://github.com/octo/repo/pull/42",
                  "state": "open", "title": "License updates for main" }
            ]
        }"#;
        let results: SearchResults = serde_json::from_str(raw).unwrap();
        assert_eq!(results.total_count, 1);
        assert_eq!(results.items[0].number, 42);
        assert!(results.items[0].is_open());
    }
}
