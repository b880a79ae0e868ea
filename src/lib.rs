//! Look up public repositories for a list of usernames.
//!
//! Usernames go into a [`registry::UsernameRegistry`], a
//! [`fetch::RepositoryFetcher`] resolves them in one batch, and a
//! [`session::Session`] tracks the outcome: results, the usernames that came
//! back empty, errors, and the paginated detail view.

pub mod config;
pub mod error;
pub mod fetch;
pub mod github;
pub mod model;
pub mod reconcile;
pub mod registry;
pub mod render;
pub mod repl;
pub mod session;

pub use error::FetchFailure;
pub use fetch::{BackendClient, RepositoryFetcher};
pub use github::GithubClient;
pub use model::{Repository, RepositoryResult, UserProfile};
pub use registry::{UsernameEntry, UsernameRegistry};
pub use session::{ClickTarget, Pager, Phase, Session, PAGE_SIZE};

use config::{Config, Source};

/// Builds the fetcher selected by `config`.
pub fn build_fetcher(config: &Config) -> anyhow::Result<Box<dyn RepositoryFetcher>> {
    Ok(match config.source {
        Source::Backend => Box::new(BackendClient::new(&config.backend_url, config.timeout)?),
        Source::Github => Box::new(GithubClient::new(config.token.clone(), config.timeout)?),
    })
}
