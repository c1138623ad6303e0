use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    /// Input rejected before any state change (bad login name, empty send).
    #[error("{0}")]
    Validation(String),

    #[error("Audio capture failed: {0}")]
    Capture(String),

    /// Non-2xx response or network failure. `status` is set when the server answered.
    #[error("Webhook transport error: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    #[error("Malformed webhook reply: {0}")]
    Decode(String),

    #[error("Could not encode outbound message: {0}")]
    Encoding(String),

    #[error("Name store error: {0}")]
    Storage(#[from] std::io::Error),
}

impl ChatError {
    pub fn validation(message: impl Into<String>) -> Self {
        ChatError::Validation(message.into())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ChatError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        ChatError::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::Decode(err.to_string())
    }
}
