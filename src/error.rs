use thiserror::Error;

pub use anyhow::Context;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    /// Rejected client-side by the request gate before any call was made.
    #[error("{0}")]
    Throttled(String),
    /// A request reached the API and failed; `message` is already user-facing.
    #[error("{message}")]
    Api {
        status: Option<reqwest::StatusCode>,
        message: String,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn message<T: Into<String>>(msg: T) -> Self {
        AppError::Message(msg.into())
    }

    pub fn api<T: Into<String>>(status: Option<reqwest::StatusCode>, msg: T) -> Self {
        AppError::Api {
            status,
            message: msg.into(),
        }
    }
}
