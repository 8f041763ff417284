use shared::error::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("invalid server url '{0}'")]
    InvalidServerUrl(String),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("backend returned {status} for {url}: {message}")]
    Status {
        url: String,
        status: u16,
        code: Option<ErrorCode>,
        message: String,
    },
    /// The body did not match the listing contract, including rows whose role
    /// is missing or not one of the known roles.
    #[error("malformed documents page from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("page numbers start at 1, got {0}")]
    InvalidPage(u32),
    #[error("row {0} is not on the displayed page")]
    UnknownRow(usize),
    #[error("fetch task ended abnormally: {0}")]
    TaskAborted(String),
}

impl GridError {
    /// HTTP status of a backend rejection, if that is what this error is.
    pub fn status(&self) -> Option<u16> {
        match self {
            GridError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
