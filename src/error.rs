//! Error types for the leaderboard store and its HTTP endpoints.

use thiserror::Error;

/// Failures reaching or reading a score store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed score data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("network error: {0}")]
    Network(String),

    #[error("store responded with status {0}")]
    Status(u16),
}

impl From<ureq::Error> for StoreError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, _) => StoreError::Status(code),
            ureq::Error::Transport(transport) => StoreError::Network(transport.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid name or score")]
    Validation,

    #[error("Only POST requests allowed")]
    Method,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Validation => 400,
            ApiError::Method => 405,
            ApiError::Store(_) => 500,
        }
    }
}
