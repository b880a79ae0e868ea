use serde::{Deserialize, Serialize};

/// Profile block attached to every result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "name")]
    pub display_name: Option<String>,
    #[serde(rename = "avatarUrl")]
    pub avatar_url: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    #[serde(rename = "repoName")]
    pub name: String,
    #[serde(rename = "repoHtmlUrl")]
    pub html_url: String,
    #[serde(rename = "repoDescription")]
    pub description: Option<String>,
}

/// One user's profile and public repositories, as returned by a fetch.
///
/// Field names on the wire follow the backend's record layout
/// (`userInformation`, `repositoryInformation`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryResult {
    pub username: String,
    #[serde(rename = "userInformation")]
    pub profile: UserProfile,
    #[serde(rename = "repositoryInformation", default)]
    pub repositories: Vec<Repository>,
}

impl RepositoryResult {
    pub fn profile_url(&self) -> String {
        format!("https://github.com/{}", self.username)
    }

    pub fn repo_count(&self) -> usize {
        self.repositories.len()
    }
}
