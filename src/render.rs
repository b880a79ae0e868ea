//! Plain-text rendering of a [`Session`].
//!
//! Every function returns a `String`; printing is left to the caller.

use crate::model::RepositoryResult;
use crate::registry::UsernameRegistry;
use crate::session::{Phase, Session};

const MIN_CARD_WIDTH: usize = 40;

pub const EMPTY_REPOSITORIES: &str = "No public repositories to display";
pub const NO_DESCRIPTION: &str = "*No Description*";

/// `key: ....... value`, padded with dots to `align_width`.
pub fn build_row(key: &str, value: &str, align_width: usize) -> String {
    let key_part = format!("{key}: ");
    let base_len = key_part.chars().count() + value.chars().count();
    let available = align_width.saturating_sub(base_len);

    let dots = match available {
        0 => "".to_string(),
        1 => " ".to_string(),
        2 => ". ".to_string(),
        n => format!("{} ", ".".repeat(n - 1)),
    };

    format!("{key_part}{dots}{value}")
}

fn build_header_line(label: &str, align_width: usize) -> String {
    let base = format!("{label} ");
    let dash_count = align_width.saturating_sub(base.chars().count()) + 2;
    format!("{base}{}", "-".repeat(dash_count))
}

/// Username chips, e.g. `[alice] [bob]`.
pub fn chips(registry: &UsernameRegistry) -> String {
    registry
        .entries()
        .iter()
        .map(|e| format!("[{}]", e.value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Line listing usernames without data, or `None` when every user was found.
pub fn not_found_line(not_found: &[String]) -> Option<String> {
    if not_found.is_empty() {
        return None;
    }
    let quoted = not_found
        .iter()
        .map(|u| format!("\"{u}\""))
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!(
        "No data for the following user(s) in the database: {quoted}."
    ))
}

pub fn card(result: &RepositoryResult) -> String {
    let repos = result.repo_count().to_string();
    let profile_url = result.profile_url();
    let name = result.profile.display_name.clone().unwrap_or_default();

    let mut rows: Vec<(&str, &str)> = vec![("Profile", profile_url.as_str())];
    if !name.is_empty() {
        rows.push(("Name", name.as_str()));
    }
    if let Some(location) = &result.profile.location {
        rows.push(("Location", location.as_str()));
    }
    rows.push(("Repositories", repos.as_str()));

    let align_width = rows
        .iter()
        .map(|(k, v)| k.len() + 2 + v.chars().count())
        .max()
        .unwrap_or(0)
        .max(MIN_CARD_WIDTH);

    let mut out = build_header_line(&result.username, align_width);
    out.push('\n');
    for (key, value) in rows {
        out.push_str(&build_row(key, value, align_width));
        out.push('\n');
    }
    out
}

/// The open detail view with its visible slice and control state.
pub fn detail(session: &Session) -> Option<String> {
    let active = session.active()?;
    let total = active.repo_count();

    let mut out = format!(
        "{}'s Public Repositories:\n({total} total repositories)\n",
        active.username
    );

    if total == 0 {
        out.push_str(EMPTY_REPOSITORIES);
        out.push('\n');
    }

    for (idx, repo) in session.visible_repositories().iter().enumerate() {
        out.push_str(&format!("{}. {}  <{}>\n", idx + 1, repo.name, repo.html_url));
        match &repo.description {
            Some(desc) => out.push_str(&format!("   Description: {desc}\n")),
            None => out.push_str(&format!("   {NO_DESCRIPTION}\n")),
        }
    }

    out.push_str(&format!(
        "{}  {}\n",
        control("Show More", session.can_show_more()),
        control("Show Less", session.can_show_less())
    ));
    Some(out)
}

fn control(label: &str, enabled: bool) -> String {
    if enabled {
        format!("[{label}]")
    } else {
        format!("[{label} (disabled)]")
    }
}

/// Everything below the input: status line, cards, and the detail view.
pub fn screen(session: &Session) -> String {
    let mut out = String::new();

    match session.phase() {
        Phase::Idle => {}
        Phase::Loading => out.push_str("Loading...\n"),
        Phase::Error { message } => {
            out.push_str(message);
            out.push('\n');
        }
        Phase::Success {
            results,
            not_found,
            fetched_at,
        } => {
            if let Some(line) = not_found_line(not_found) {
                out.push_str(&line);
                out.push('\n');
            }
            for result in results {
                out.push('\n');
                out.push_str(&card(result));
            }
            out.push_str(&format!(
                "\nFetched {} result(s) at {}\n",
                results.len(),
                fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
    }

    if let Some(view) = detail(session) {
        out.push('\n');
        out.push_str(&view);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchFailure;
    use crate::model::{Repository, UserProfile};

    fn result(username: &str, repos: usize, location: Option<&str>) -> RepositoryResult {
        RepositoryResult {
            username: username.to_string(),
            profile: UserProfile {
                display_name: Some("Alice Liddell".to_string()),
                avatar_url: String::new(),
                location: location.map(str::to_string),
            },
            repositories: (0..repos)
                .map(|i| Repository {
                    name: format!("repo-{i}"),
                    html_url: format!("https://github.com/{username}/repo-{i}"),
                    description: (i % 2 == 0).then(|| format!("project {i}")),
                })
                .collect(),
        }
    }

    fn loaded(results: Vec<RepositoryResult>, requested: &[&str]) -> Session {
        let mut session = Session::new();
        for name in requested {
            session.registry_mut().add(name);
        }
        let submission = session.begin_submit();
        session.complete_submit(submission, Ok(results));
        session
    }

    #[test]
    fn row_is_padded_to_width() {
        let row = build_row("Repositories", "3", 24);
        assert_eq!(row.chars().count(), 24);
        assert!(row.starts_with("Repositories: ."));
        assert!(row.ends_with(" 3"));
    }

    #[test]
    fn not_found_line_quotes_each_user() {
        assert_eq!(not_found_line(&[]), None);
        let line = not_found_line(&["bob".to_string(), "carol".to_string()]).unwrap();
        assert_eq!(
            line,
            "No data for the following user(s) in the database: \"bob\", \"carol\"."
        );
    }

    #[test]
    fn card_shows_location_only_when_present() {
        let with = card(&result("alice", 2, Some("Wonderland")));
        assert!(with.contains("Location"));
        assert!(with.contains("https://github.com/alice"));

        let without = card(&result("alice", 2, None));
        assert!(!without.contains("Location"));
    }

    #[test]
    fn chips_follow_registry_order() {
        let mut registry = UsernameRegistry::new();
        registry.add("bob");
        registry.add("alice");
        assert_eq!(chips(&registry), "[bob] [alice]");
    }

    #[test]
    fn empty_detail_view_has_indicator_and_disabled_controls() {
        let mut session = loaded(vec![result("alice", 0, None)], &["alice"]);
        session.open_detail("alice");

        let view = detail(&session).unwrap();
        assert!(view.contains("(0 total repositories)"));
        assert!(view.contains(EMPTY_REPOSITORIES));
        assert!(view.contains("[Show More (disabled)]"));
        assert!(view.contains("[Show Less (disabled)]"));
    }

    #[test]
    fn detail_view_numbers_visible_slice() {
        let mut session = loaded(vec![result("alice", 12, None)], &["alice"]);
        session.open_detail("alice");

        let view = detail(&session).unwrap();
        assert!(view.contains("10. repo-9"));
        assert!(!view.contains("11. repo-10"));
        assert!(view.contains("Description: project 0"));
        assert!(view.contains(NO_DESCRIPTION));
        assert!(view.contains("[Show More]"));

        session.show_more();
        let view = detail(&session).unwrap();
        assert!(view.contains("12. repo-11"));
        assert!(view.contains("[Show Less]"));
    }

    #[test]
    fn error_phase_renders_message_only() {
        let mut session = Session::new();
        let submission = session.begin_submit();
        session.complete_submit(submission, Err(FetchFailure::new("Network timeout")));

        let out = screen(&session);
        assert_eq!(
            out,
            "Uh oh! Unable to retrieve the data for the following reason: Network timeout\n"
        );
    }

    #[test]
    fn success_renders_not_found_and_cards() {
        let session = loaded(vec![result("alice", 1, None)], &["alice", "bob"]);
        let out = screen(&session);
        assert!(out.contains("\"bob\"."));
        assert!(out.contains("alice ---"));
        assert!(out.contains("Fetched 1 result(s)"));
    }
}
