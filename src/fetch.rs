//! Fetch boundary: one batched call from usernames to repository results.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::FetchFailure;
use crate::model::RepositoryResult;
use crate::registry::SEPARATOR;

pub type FetchResult<T> = Result<T, FetchFailure>;

/// Source of repository results.
///
/// `fetch` is all-or-nothing: either every returned record is valid or the
/// whole call fails. Users the source does not know are omitted from the
/// output rather than reported as errors.
#[async_trait]
pub trait RepositoryFetcher: Send + Sync {
    async fn fetch(&self, usernames: &[String]) -> FetchResult<Vec<RepositoryResult>>;

    /// Looks up a single user.
    async fn fetch_one(&self, username: &str) -> FetchResult<Option<RepositoryResult>> {
        let results = self.fetch(&[username.to_string()]).await?;
        Ok(results.into_iter().find(|r| r.username == username))
    }
}

/// Client for the repository backend's `/api/v1` endpoints.
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct SingleUserResponse {
    result: Option<RepositoryResult>,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> FetchResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gh-repo-finder/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL with `segments` appended as percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> FetchResult<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|err| {
            FetchFailure::new(format!("Invalid backend URL {}: {err}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                FetchFailure::new(format!("Backend URL {} cannot have a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> FetchResult<T> {
        let url = self.endpoint(segments)?;
        debug!(%url, "backend request");

        let resp = self.http.get(url).query(query).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchFailure::new(format!(
                "Backend returned HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl RepositoryFetcher for BackendClient {
    async fn fetch(&self, usernames: &[String]) -> FetchResult<Vec<RepositoryResult>> {
        if usernames.is_empty() {
            debug!("empty username list, skipping backend request");
            return Ok(Vec::new());
        }

        let joined = usernames.join(SEPARATOR.to_string().as_str());
        let results: Vec<RepositoryResult> = self
            .get_json(&["api", "v1", "users"], &[("users", joined.as_str())])
            .await?;

        info!(
            requested = usernames.len(),
            returned = results.len(),
            "backend fetch finished"
        );
        Ok(results)
    }

    async fn fetch_one(&self, username: &str) -> FetchResult<Option<RepositoryResult>> {
        if username.is_empty() {
            return Ok(None);
        }
        let resp: SingleUserResponse = self
            .get_json(&["api", "v1", "user", username], &[])
            .await?;
        Ok(resp.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> BackendClient {
        BackendClient::new(base_url, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn endpoint_encodes_username_segment() {
        let url = client("http://127.0.0.1:5000")
            .endpoint(&["api", "v1", "user", "alice#x?admin=1/.."])
            .unwrap();
        assert_eq!(url.path(), "/api/v1/user/alice%23x%3Fadmin=1%2F..");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let url = client("http://localhost/finder/")
            .endpoint(&["api", "v1", "users"])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost/finder/api/v1/users");
    }

    #[test]
    fn endpoint_rejects_unparseable_base() {
        let err = client("not a url").endpoint(&["api"]).unwrap_err();
        assert!(err.message().starts_with("Invalid backend URL"));
    }
}
