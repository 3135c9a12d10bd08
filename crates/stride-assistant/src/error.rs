use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("rate limit exceeded, try again later")]
    RateLimited,

    #[error("assistant credits exhausted")]
    QuotaExhausted,

    #[error("assistant returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("assistant response has no body")]
    MissingBody,

    #[error("a reply is already in progress")]
    Busy,

    #[error("message is empty")]
    EmptyMessage,

    #[error("stream aborted")]
    Aborted,

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] stride_core::StrideError),

    #[error("tracker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl AssistantError {
    /// Build the error for a non-success status code.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            429 => AssistantError::RateLimited,
            402 => AssistantError::QuotaExhausted,
            _ => AssistantError::Status { status, body },
        }
    }
}
