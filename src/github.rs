use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::fetch::{FetchResult, RepositoryFetcher};
use crate::model::{Repository, RepositoryResult, UserProfile};

pub const GITHUB_API_URL: &str = "https://api.github.com";
const PER_PAGE: usize = 100;
const MAX_RETRIES: usize = 4;
const DEFAULT_RETRY_AFTER_SECS: u64 = 2;
const MAX_RETRY_AFTER_SECS: u64 = 60;

#[derive(Deserialize)]
struct UserPayload {
    avatar_url: String,
    name: Option<String>,
    location: Option<String>,
}

#[derive(Deserialize)]
struct RepoPayload {
    name: String,
    html_url: String,
    description: Option<String>,
}

/// Fetches profiles and repositories straight from the GitHub REST API.
#[derive(Clone)]
pub struct GithubClient {
    token: Option<Arc<String>>,
    http: Arc<Client>,
    base_url: Arc<String>,
}

impl GithubClient {
    pub fn new(token: Option<String>, timeout: Duration) -> Result<Self> {
        Self::with_base_url(GITHUB_API_URL, token, timeout)
    }

    /// Same as [`GithubClient::new`] against a different API root.
    pub fn with_base_url(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            token: token.filter(|t| !t.is_empty()).map(Arc::new),
            http: Arc::new(http),
            base_url: Arc::new(base_url.trim_end_matches('/').to_string()),
        })
    }

    /// API root with `segments` appended, each percent-encoded as one segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid GitHub API URL {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("GitHub API URL {} cannot have a path", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET with retry/backoff. `Ok(None)` means the resource does not exist.
    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        let url = self.endpoint(segments)?;
        let path = url.path().to_string();
        let mut attempt = 0usize;

        loop {
            attempt += 1;

            let mut req = self
                .http
                .get(url.clone())
                .query(query)
                .header("User-Agent", "gh-repo-finder")
                .header("Accept", "application/vnd.github+json");
            if let Some(token) = &self.token {
                req = req.bearer_auth(token.as_str());
            }

            let resp = req
                .send()
                .await
                .with_context(|| format!("Network error requesting {path}"))?;

            let status = resp.status();
            if status.is_success() {
                let parsed = resp
                    .json::<T>()
                    .await
                    .with_context(|| format!("Failed to parse JSON from GitHub for {path}"))?;
                return Ok(Some(parsed));
            }

            if status == StatusCode::NOT_FOUND {
                return Ok(None);
            }

            let headers = resp.headers().clone();
            let rate_limited = status == StatusCode::TOO_MANY_REQUESTS
                || (status == StatusCode::FORBIDDEN
                    && headers
                        .get("x-ratelimit-remaining")
                        .and_then(|v| v.to_str().ok())
                        == Some("0"));

            if rate_limited {
                if attempt >= MAX_RETRIES {
                    anyhow::bail!(
                        "GitHub API returned {} (rate-limited) and retries exhausted",
                        status.as_u16()
                    );
                }
                let wait = retry_after(&headers);
                warn!(
                    path = %path,
                    wait_secs = wait.as_secs(),
                    attempt,
                    "rate limited by GitHub, waiting"
                );
                sleep(wait).await;
                continue;
            }

            if status.is_server_error() && attempt < MAX_RETRIES {
                let backoff = Duration::from_millis(250u64.saturating_mul(1 << (attempt - 1)));
                warn!(
                    path = %path,
                    status = status.as_u16(),
                    attempt,
                    "GitHub server error, retrying"
                );
                sleep(backoff).await;
                continue;
            }

            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("GitHub API returned HTTP {}: {}", status.as_u16(), body.trim());
        }
    }

    /// All public repositories of `username`, following pages until a short one.
    /// `Ok(None)` if the user vanished between the profile and repo requests.
    pub async fn list_repos(&self, username: &str) -> Result<Option<Vec<Repository>>> {
        let mut out = Vec::new();
        let mut page = 1usize;

        loop {
            let query = [("per_page", PER_PAGE.to_string()), ("page", page.to_string())];
            let Some(batch) = self
                .get::<Vec<RepoPayload>>(&["users", username, "repos"], &query)
                .await?
            else {
                return Ok(None);
            };

            let len = batch.len();
            out.extend(batch.into_iter().map(|r| Repository {
                name: r.name,
                html_url: r.html_url,
                description: r.description,
            }));

            if len < PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(Some(out))
    }

    /// Profile plus repositories for one user, `None` if GitHub has no such user.
    pub async fn user_result(&self, username: &str) -> Result<Option<RepositoryResult>> {
        let Some(user) = self
            .get::<UserPayload>(&["users", username], &[])
            .await
            .with_context(|| format!("Failed to fetch profile for {username}"))?
        else {
            debug!(username, "GitHub user not found");
            return Ok(None);
        };

        let Some(repositories) = self
            .list_repos(username)
            .await
            .with_context(|| format!("Failed to fetch repositories for {username}"))?
        else {
            return Ok(None);
        };

        Ok(Some(RepositoryResult {
            username: username.to_string(),
            profile: UserProfile {
                display_name: user.name,
                avatar_url: user.avatar_url,
                location: user.location,
            },
            repositories,
        }))
    }
}

/// Seconds to wait after a rate-limited response: `Retry-After` if it is a
/// plain number of seconds, capped at [`MAX_RETRY_AFTER_SECS`].
fn retry_after(headers: &HeaderMap) -> Duration {
    let secs = headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
    Duration::from_secs(secs.min(MAX_RETRY_AFTER_SECS))
}

#[async_trait]
impl RepositoryFetcher for GithubClient {
    async fn fetch(&self, usernames: &[String]) -> FetchResult<Vec<RepositoryResult>> {
        let lookups = usernames
            .iter()
            .filter(|u| !u.is_empty())
            .map(|u| self.user_result(u));

        let found: Vec<RepositoryResult> = try_join_all(lookups)
            .await?
            .into_iter()
            .flatten()
            .collect();

        info!(
            requested = usernames.len(),
            returned = found.len(),
            "GitHub fetch finished"
        );
        Ok(found)
    }

    async fn fetch_one(&self, username: &str) -> FetchResult<Option<RepositoryResult>> {
        if username.is_empty() {
            return Ok(None);
        }
        Ok(self.user_result(username).await?)
    }
}
