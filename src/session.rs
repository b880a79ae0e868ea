//! Presentation state: the submit/fetch lifecycle, the detail view and its
//! pagination cursor.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::FetchFailure;
use crate::fetch::RepositoryFetcher;
use crate::model::{Repository, RepositoryResult};
use crate::reconcile;
use crate::registry::UsernameRegistry;

/// Number of repositories revealed per "show more" step, and the initial cursor.
pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Success {
        results: Vec<RepositoryResult>,
        not_found: Vec<String>,
        fetched_at: DateTime<Utc>,
    },
    Error {
        message: String,
    },
}

/// Where a click landed while the detail view is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Backdrop,
    CloseButton,
    Content,
}

impl ClickTarget {
    fn dismisses(self) -> bool {
        matches!(self, ClickTarget::Backdrop | ClickTarget::CloseButton)
    }
}

/// Count of repositories currently shown. Bounds are enforced by disabling
/// the controls, not by clamping the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    cursor: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self { cursor: PAGE_SIZE }
    }
}

impl Pager {
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn can_show_more(&self, total: usize) -> bool {
        self.cursor < total
    }

    pub fn can_show_less(&self) -> bool {
        self.cursor > PAGE_SIZE
    }

    pub fn show_more(&mut self, total: usize) -> bool {
        if !self.can_show_more(total) {
            return false;
        }
        self.cursor += PAGE_SIZE;
        true
    }

    pub fn show_less(&mut self) -> bool {
        if !self.can_show_less() {
            return false;
        }
        self.cursor -= PAGE_SIZE;
        true
    }

    pub fn visible<'a>(&self, repos: &'a [Repository]) -> &'a [Repository] {
        &repos[..self.cursor.min(repos.len())]
    }
}

/// The open detail view for one result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub username: String,
    pub pager: Pager,
}

/// Registry plus presentation state for one user of the interface.
#[derive(Debug, Default)]
pub struct Session {
    registry: UsernameRegistry,
    phase: Phase,
    detail: Option<DetailView>,
}

/// Usernames captured when a submission starts. Reconciliation always runs
/// against this snapshot, never the live registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub usernames: Vec<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &UsernameRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut UsernameRegistry {
        &mut self.registry
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading)
    }

    pub fn results(&self) -> &[RepositoryResult] {
        match &self.phase {
            Phase::Success { results, .. } => results,
            _ => &[],
        }
    }

    pub fn not_found(&self) -> &[String] {
        match &self.phase {
            Phase::Success { not_found, .. } => not_found,
            _ => &[],
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            Phase::Error { message } => Some(message),
            _ => None,
        }
    }

    /// Moves to `Loading` and snapshots the registry.
    pub fn begin_submit(&mut self) -> Submission {
        let usernames = self.registry.values();
        info!(count = usernames.len(), "submitting usernames");
        self.phase = Phase::Loading;
        Submission { usernames }
    }

    /// Applies the outcome of a fetch started by [`Session::begin_submit`].
    pub fn complete_submit(
        &mut self,
        submission: Submission,
        outcome: Result<Vec<RepositoryResult>, FetchFailure>,
    ) {
        match outcome {
            Ok(results) => {
                let not_found = reconcile::not_found(&submission.usernames, &results);
                debug!(
                    returned = results.len(),
                    not_found = not_found.len(),
                    "fetch succeeded"
                );
                if let Some(detail) = &self.detail {
                    if !results.iter().any(|r| r.username == detail.username) {
                        self.detail = None;
                    }
                }
                self.phase = Phase::Success {
                    results,
                    not_found,
                    fetched_at: Utc::now(),
                };
            }
            Err(failure) => {
                warn!(error = %failure, "fetch failed");
                self.detail = None;
                self.phase = Phase::Error {
                    message: failure.user_message(),
                };
            }
        }
    }

    /// Full submission: snapshot, fetch, apply.
    pub async fn submit<F>(&mut self, fetcher: &F)
    where
        F: RepositoryFetcher + ?Sized,
    {
        let submission = self.begin_submit();
        let outcome = fetcher.fetch(&submission.usernames).await;
        self.complete_submit(submission, outcome);
    }

    /// Opens the detail view for `username`. A username without a current
    /// result leaves the view as it was and returns `None`.
    pub fn open_detail(&mut self, username: &str) -> Option<&RepositoryResult> {
        let idx = self.results().iter().position(|r| r.username == username);
        let Some(idx) = idx else {
            debug!(username, "no result to open");
            return None;
        };

        self.detail = Some(DetailView {
            username: username.to_string(),
            pager: Pager::default(),
        });
        self.results().get(idx)
    }

    /// Closes the detail view if `target` is one of the dismissal affordances.
    pub fn click(&mut self, target: ClickTarget) -> bool {
        if self.detail.is_none() || !target.dismisses() {
            return false;
        }
        self.detail = None;
        true
    }

    pub fn detail(&self) -> Option<&DetailView> {
        self.detail.as_ref()
    }

    /// The result shown in the open detail view.
    pub fn active(&self) -> Option<&RepositoryResult> {
        let detail = self.detail.as_ref()?;
        self.results().iter().find(|r| r.username == detail.username)
    }

    /// Pager of the open detail view; a closed view reports the initial cursor.
    pub fn pager(&self) -> Pager {
        self.detail.as_ref().map(|d| d.pager).unwrap_or_default()
    }

    fn active_total(&self) -> usize {
        self.active().map(RepositoryResult::repo_count).unwrap_or(0)
    }

    /// Paging controls only act on a detail view that is actually shown,
    /// which rules out the `Loading` and `Error` phases.
    pub fn can_show_more(&self) -> bool {
        self.active().is_some() && self.pager().can_show_more(self.active_total())
    }

    pub fn can_show_less(&self) -> bool {
        self.active().is_some() && self.pager().can_show_less()
    }

    pub fn show_more(&mut self) -> bool {
        if self.active().is_none() {
            return false;
        }
        let total = self.active_total();
        match self.detail.as_mut() {
            Some(detail) => detail.pager.show_more(total),
            None => false,
        }
    }

    pub fn show_less(&mut self) -> bool {
        if self.active().is_none() {
            return false;
        }
        match self.detail.as_mut() {
            Some(detail) => detail.pager.show_less(),
            None => false,
        }
    }

    /// Repositories currently revealed in the detail view.
    pub fn visible_repositories(&self) -> &[Repository] {
        match self.active() {
            Some(active) => self.pager().visible(&active.repositories),
            None => &[],
        }
    }
}
