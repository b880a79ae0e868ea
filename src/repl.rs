//! Line-oriented front end for a [`Session`].
//!
//! A plain line commits a username, like pressing Enter in a text field.
//! Lines starting with `:` are commands.

use std::io::Write;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::fetch::RepositoryFetcher;
use crate::registry::SEPARATOR;
use crate::render;
use crate::session::{ClickTarget, Session};

pub const HELP: &str = "\
Type a username and press Enter to add it.
  :rm <n|name>  remove a username (by position or value)
  :ls           list usernames
  :send         look up all usernames
  :open <user>  open a user's repositories
  :more         show 10 more repositories
  :less         show 10 fewer repositories
  :close        close the repository view
  :backdrop     click outside the repository view
  :show         redraw results
  :help         this text
  :quit         exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(String),
    Remove(String),
    List,
    Send,
    Open(String),
    More,
    Less,
    Click(ClickTarget),
    Show,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(rest) = line.strip_prefix(':') else {
            return Command::Add(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match (name, arg) {
            ("rm", a) if !a.is_empty() => Command::Remove(a.to_string()),
            ("ls", _) => Command::List,
            ("send", _) => Command::Send,
            ("open", a) if !a.is_empty() => Command::Open(a.to_string()),
            ("more", _) => Command::More,
            ("less", _) => Command::Less,
            ("close", _) => Command::Click(ClickTarget::CloseButton),
            ("backdrop", _) => Command::Click(ClickTarget::Backdrop),
            ("show", _) => Command::Show,
            ("help", _) => Command::Help,
            ("quit" | "q" | "exit", _) => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

/// Removes by 1-based position or by exact value.
fn remove(session: &mut Session, target: &str) -> Option<String> {
    let registry = session.registry_mut();
    let entry = match target.parse::<usize>() {
        Ok(pos) if pos >= 1 && !registry.contains(target) => registry.entries().get(pos - 1),
        _ => registry.find(target),
    }?;
    let id = entry.id;
    registry.remove(id).map(|e| e.value)
}

/// Runs one command. Returns `false` when the loop should stop.
pub async fn execute<F, W>(
    command: Command,
    session: &mut Session,
    fetcher: &F,
    out: &mut W,
) -> Result<bool>
where
    F: RepositoryFetcher + ?Sized,
    W: Write,
{
    debug!(?command, "repl command");
    match command {
        Command::Add(name) => {
            if session.registry_mut().add(&name).is_none() {
                if name.contains(SEPARATOR) {
                    writeln!(
                        out,
                        "\"{name}\" is not a valid username ('{SEPARATOR}' is not allowed)"
                    )?;
                } else if !name.is_empty() {
                    writeln!(out, "\"{name}\" is already in the list")?;
                }
            }
            writeln!(out, "{}", render::chips(session.registry()))?;
        }
        Command::Remove(target) => {
            match remove(session, &target) {
                Some(name) => writeln!(out, "removed \"{name}\"")?,
                None => writeln!(out, "no username matches \"{target}\"")?,
            }
            writeln!(out, "{}", render::chips(session.registry()))?;
        }
        Command::List => writeln!(out, "{}", render::chips(session.registry()))?,
        Command::Send => {
            let submission = session.begin_submit();
            write!(out, "{}", render::screen(session))?;
            out.flush()?;
            let outcome = fetcher.fetch(&submission.usernames).await;
            session.complete_submit(submission, outcome);
            write!(out, "{}", render::screen(session))?;
        }
        Command::Open(user) => {
            if session.open_detail(&user).is_some() {
                write!(out, "{}", render::detail(session).unwrap_or_default())?;
            } else {
                writeln!(out, "no results for \"{user}\"")?;
            }
        }
        Command::More => {
            if session.show_more() {
                write!(out, "{}", render::detail(session).unwrap_or_default())?;
            } else {
                writeln!(out, "Show More is disabled")?;
            }
        }
        Command::Less => {
            if session.show_less() {
                write!(out, "{}", render::detail(session).unwrap_or_default())?;
            } else {
                writeln!(out, "Show Less is disabled")?;
            }
        }
        Command::Click(target) => {
            if session.click(target) {
                writeln!(out, "closed")?;
            }
        }
        Command::Show => write!(out, "{}", render::screen(session))?,
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => return Ok(false),
        Command::Unknown(line) => writeln!(out, "unknown command: {line} (try :help)")?,
    }
    Ok(true)
}

/// Reads commands from `input` until EOF or `:quit`.
pub async fn run<R, F, W>(input: R, session: &mut Session, fetcher: &F, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    F: RepositoryFetcher + ?Sized,
    W: Write,
{
    let mut lines = input.lines();
    writeln!(out, "{HELP}")?;

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        if !execute(Command::parse(&line), session, fetcher, out).await? {
            break;
        }
    }
    Ok(())
}
