use thiserror::Error;

/// Errors raised while reaching the webhook at all.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("{0}")]
    Connect(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Everything that can end an invocation with a non-zero exit.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Discord webhook URL not configured")]
    MissingWebhook,

    #[error("Failed to parse alert JSON: {0}")]
    InvalidInput(#[from] serde_json::Error),

    #[error("Discord webhook returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Failed to connect to Discord: {0}")]
    Transport(#[from] TransportError),

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Input,
    Delivery,
}

impl NotifyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NotifyError::MissingWebhook => ErrorKind::Configuration,
            NotifyError::InvalidInput(_) => ErrorKind::Input,
            NotifyError::Http { .. } | NotifyError::Transport(_) | NotifyError::Unexpected(_) => {
                ErrorKind::Delivery
            }
        }
    }

    /// The single line written to stderr for this failure.
    pub fn report_line(&self) -> String {
        format!("ERROR: {}", self)
    }
}

pub fn exit_code(result: &Result<(), NotifyError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(_) => 1,
    }
}
