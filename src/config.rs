use std::{env, fmt::Display, str::FromStr, time::Duration};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info};

pub const BACKEND_URL_VAR: &str = "GH_REPO_FINDER_BACKEND_URL";
pub const TIMEOUT_VAR: &str = "GH_REPO_FINDER_TIMEOUT_SECS";
pub const SOURCE_VAR: &str = "GH_REPO_FINDER_SOURCE";
pub const TOKEN_VAR: &str = "ACCESS_TOKEN";

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where repository results come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Source {
    /// The repository backend (`/api/v1/users`).
    #[default]
    Backend,
    /// The GitHub REST API directly.
    Github,
}

impl FromStr for Source {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "backend" => Ok(Source::Backend),
            "github" => Ok(Source::Github),
            other => Err(anyhow!("unknown source '{other}', expected 'backend' or 'github'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub source: Source,
    pub backend_url: String,
    pub timeout: Duration,
    pub token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: Source::Backend,
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token: None,
        }
    }
}

impl Config {
    /// Reads the environment, falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let timeout_secs: u64 = try_load(&lookup, TIMEOUT_VAR, DEFAULT_TIMEOUT_SECS)?;

        Ok(Self {
            source: try_load(&lookup, SOURCE_VAR, defaults.source)?,
            backend_url: lookup(BACKEND_URL_VAR)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.backend_url),
            timeout: Duration::from_secs(timeout_secs),
            token: lookup(TOKEN_VAR).filter(|t| !t.is_empty()),
        })
    }
}

fn try_load<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Debug,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => {
            debug!(key, value = %raw, "loaded from environment");
            raw.trim()
                .parse()
                .map_err(|e| anyhow!("{e}"))
                .with_context(|| format!("Invalid {key} value: {raw:?}"))
        }
        None => {
            info!(key, ?default, "not set, using default");
            Ok(default)
        }
    }
}
