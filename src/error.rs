use thiserror::Error;

/// Prefix of the message shown to the user when a fetch fails.
pub const FETCH_ERROR_PREFIX: &str = "Uh oh! Unable to retrieve the data for the following reason: ";

/// The only failure a fetch can report.
///
/// Network errors, non-success statuses and malformed payloads all collapse
/// into this one kind; only the message differs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FetchFailure {
    message: String,
}

impl FetchFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Message as displayed by the presentation layer.
    pub fn user_message(&self) -> String {
        format!("{FETCH_ERROR_PREFIX}{}", self.message)
    }
}

impl From<reqwest::Error> for FetchFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new("Network timeout")
        } else if err.is_decode() {
            Self::new(format!("Malformed response: {err}"))
        } else {
            Self::new(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchFailure {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("Malformed response: {err}"))
    }
}

impl From<anyhow::Error> for FetchFailure {
    fn from(err: anyhow::Error) -> Self {
        Self::new(format!("{err:#}"))
    }
}
