//! GitHub REST gateway.
//!
//! [`GithubApi`] is the seam the orchestrator talks to; [`GithubClient`] is
//! the `reqwest` implementation. Pagination and mergeability polling live in
//! free functions on top of the trait so they work with any implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::config::GatewayConfig;
use crate::error::{CoreError, CoreResult};
use crate::event::Repository;

/// Page size used when listing pull request files.
pub const FILES_PER_PAGE: u32 = 100;

const ACCEPT: &str = "application/vnd.github+json";
const USER_AGENT: &str = "tfgate";
const TEST_ID_HEADER: &str = "E2E-TestId";

/// Pull request operations used by the orchestrator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GithubApi: Send + Sync {
    /// One page of the paths changed by a pull request, relative to the
    /// repository root.
    async fn list_files(
        &self,
        repository: &Repository,
        number: u64,
        page: u32,
        per_page: u32,
    ) -> CoreResult<Vec<String>>;

    /// The `mergeable` flag; `None` while GitHub is still computing it.
    async fn mergeable(&self, repository: &Repository, number: u64) -> CoreResult<Option<bool>>;

    /// Post a comment on the pull request's conversation.
    async fn create_comment(&self, repository: &Repository, number: u64, body: &str)
        -> CoreResult<()>;

    async fn merge(&self, repository: &Repository, number: u64) -> CoreResult<()>;
}

#[derive(Debug, Deserialize)]
struct PullRequestFile {
    filename: String,
}

#[derive(Debug, Deserialize)]
struct PullRequest {
    mergeable: Option<bool>,
}

/// `reqwest` backed implementation of [`GithubApi`].
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    test_id: Option<String>,
}

impl GithubClient {
    pub fn new(config: &GatewayConfig) -> CoreResult<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: config.github_api_url.trim_end_matches('/').to_string(),
            token: config.github_token.clone(),
            test_id: config.e2e_test_id.clone(),
        })
    }

    fn url(&self, repository: &Repository, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.base_url, repository.owner, repository.name, path
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut request = self
            .client
            .request(method, url)
            .header("Accept", ACCEPT);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        if let Some(id) = &self.test_id {
            request = request.header(TEST_ID_HEADER, id);
        }
        request
    }

    async fn send(&self, method: Method, url: &str, request: RequestBuilder) -> CoreResult<Response> {
        debug!(method = %method, url, "GitHub API request");
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CoreError::GithubApi {
                method: method.to_string(),
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl GithubApi for GithubClient {
    async fn list_files(
        &self,
        repository: &Repository,
        number: u64,
        page: u32,
        per_page: u32,
    ) -> CoreResult<Vec<String>> {
        let url = self.url(repository, &format!("pulls/{}/files", number));
        let request = self
            .request(Method::GET, &url)
            .query(&[("page", page), ("per_page", per_page)]);
        let files: Vec<PullRequestFile> = self.send(Method::GET, &url, request).await?.json().await?;
        Ok(files.into_iter().map(|f| f.filename).collect())
    }

    async fn mergeable(&self, repository: &Repository, number: u64) -> CoreResult<Option<bool>> {
        let url = self.url(repository, &format!("pulls/{}", number));
        let request = self.request(Method::GET, &url);
        let pull: PullRequest = self.send(Method::GET, &url, request).await?.json().await?;
        Ok(pull.mergeable)
    }

    async fn create_comment(
        &self,
        repository: &Repository,
        number: u64,
        body: &str,
    ) -> CoreResult<()> {
        let url = self.url(repository, &format!("issues/{}/comments", number));
        let request = self
            .request(Method::POST, &url)
            .json(&json!({ "body": body }));
        self.send(Method::POST, &url, request).await?;
        Ok(())
    }

    async fn merge(&self, repository: &Repository, number: u64) -> CoreResult<()> {
        let url = self.url(repository, &format!("pulls/{}/merge", number));
        let request = self.request(Method::PUT, &url).json(&json!({}));
        self.send(Method::PUT, &url, request).await?;
        Ok(())
    }
}

/// Every path changed by a pull request, fetching pages until one comes back
/// short.
pub async fn changed_files(
    api: &dyn GithubApi,
    repository: &Repository,
    number: u64,
) -> CoreResult<Vec<String>> {
    let mut files = Vec::new();
    for page in 1.. {
        let batch = api
            .list_files(repository, number, page, FILES_PER_PAGE)
            .await?;
        let done = batch.len() < FILES_PER_PAGE as usize;
        files.extend(batch);
        if done {
            break;
        }
    }
    info!(repository = %repository, number, files = files.len(), "Fetched changed files");
    Ok(files)
}

/// Ask for mergeability up to `attempts` times while GitHub answers `null`.
/// An answer that stays `null` counts as not mergeable.
pub async fn wait_for_mergeable(
    api: &dyn GithubApi,
    repository: &Repository,
    number: u64,
    attempts: u32,
    interval: Duration,
) -> CoreResult<bool> {
    let attempts = attempts.max(1);
    for attempt in 1..=attempts {
        if let Some(mergeable) = api.mergeable(repository, number).await? {
            debug!(number, mergeable, attempt, "Mergeability known");
            return Ok(mergeable);
        }
        if attempt < attempts {
            debug!(number, attempt, "Mergeability not computed yet");
            tokio::time::sleep(interval).await;
        }
    }
    Ok(false)
}
