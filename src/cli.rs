//! CLI argument parsing and command dispatch

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tokio::io::BufReader;

use gh_repo_finder::config::{Config, Source};
use gh_repo_finder::{Session, build_fetcher, render, repl};

/// Look up public repositories for a list of usernames
#[derive(Parser, Debug)]
#[command(name = "gh-repo-finder")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Where to fetch data from [env: GH_REPO_FINDER_SOURCE]
    #[arg(long, global = true, value_enum)]
    source: Option<Source>,

    /// Base URL of the repository backend [env: GH_REPO_FINDER_BACKEND_URL]
    #[arg(long, global = true, value_name = "URL")]
    backend_url: Option<String>,

    /// Request timeout in seconds [env: GH_REPO_FINDER_TIMEOUT_SECS]
    #[arg(long, global = true, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Look up several users at once
    Search {
        /// Usernames, duplicates are ignored
        #[arg(required = true)]
        usernames: Vec<String>,

        /// Also show this user's repositories
        #[arg(long, value_name = "USER")]
        open: Option<String>,

        /// Number of repository pages to reveal with --open
        #[arg(long, default_value_t = 1, requires = "open")]
        pages: usize,
    },
    /// Show one user's repositories
    User { username: String },
    /// Interactive prompt (default)
    Interactive,
}

impl Cli {
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    fn config(&self) -> Result<Config> {
        let mut config = Config::from_env()?;
        if let Some(source) = self.source {
            config.source = source;
        }
        if let Some(url) = &self.backend_url {
            config.backend_url = url.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub async fn execute(self) -> Result<()> {
        let config = self.config()?;
        tracing::debug!(?config.source, backend = %config.backend_url, "resolved configuration");
        let fetcher = build_fetcher(&config)?;
        let mut stdout = io::stdout().lock();

        match self.command.unwrap_or(Commands::Interactive) {
            Commands::Search {
                usernames,
                open,
                pages,
            } => {
                let mut session = Session::new();
                for name in &usernames {
                    session.registry_mut().add(name.trim());
                }
                session.submit(fetcher.as_ref()).await;
                write!(stdout, "{}", render::screen(&session))?;

                if let Some(user) = open {
                    if session.open_detail(&user).is_none() {
                        bail!("no results for \"{user}\"");
                    }
                    for _ in 1..pages {
                        if !session.show_more() {
                            break;
                        }
                    }
                    writeln!(stdout)?;
                    write!(stdout, "{}", render::detail(&session).unwrap_or_default())?;
                }

                if session.error_message().is_some() {
                    bail!("lookup failed");
                }
            }
            Commands::User { username } => {
                let mut session = Session::new();
                session.registry_mut().add(&username);
                let submission = session.begin_submit();
                let outcome = fetcher
                    .fetch_one(&username)
                    .await
                    .map(|found| found.into_iter().collect());
                session.complete_submit(submission, outcome);

                if let Some(message) = session.error_message() {
                    bail!("{message}");
                }
                if session.open_detail(&username).is_none() {
                    let line = render::not_found_line(session.not_found()).unwrap_or_default();
                    writeln!(stdout, "{line}")?;
                    return Ok(());
                }
                if let Some(active) = session.active() {
                    writeln!(stdout, "{}", render::card(active))?;
                }
                write!(stdout, "{}", render::detail(&session).unwrap_or_default())?;
            }
            Commands::Interactive => {
                let mut session = Session::new();
                let stdin = BufReader::new(tokio::io::stdin());
                repl::run(stdin, &mut session, fetcher.as_ref(), &mut stdout).await?;
            }
        }
        Ok(())
    }
}
