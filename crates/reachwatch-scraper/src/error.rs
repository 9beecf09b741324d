use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limiting or an anti-bot challenge. Expected to clear on its own.
    #[error("{0}")]
    Blocked(String),

    #[error("{service} responded with status {status}")]
    UnexpectedStatus { service: &'static str, status: u16 },

    #[error("{0}")]
    Parse(String),

    #[error("{service} API error: {message}")]
    Api {
        service: &'static str,
        message: String,
    },

    #[error("channel id could not be resolved: {0}")]
    Resolve(String),

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl FetchError {
    /// The only place a failure is classified as a temporary block.
    #[must_use]
    pub fn is_temporary_block(&self) -> bool {
        matches!(self, FetchError::Blocked(_))
    }
}
