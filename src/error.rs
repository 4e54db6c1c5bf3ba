use thiserror::Error;

/// Startup failures. Fatal: the agent refuses chat traffic until fixed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Per-call upstream failures. Recoverable; the session stays usable.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request error: {0}")]
    Transport(String),
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("Request error: upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to parse response: {0}")]
    Decode(String),
    #[error("Failed to parse response: missing `{0}`")]
    MissingField(&'static str),
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Message must not be empty")]
    EmptyMessage,
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout(e.to_string())
        } else if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}
