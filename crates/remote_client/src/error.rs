//! Error types for the remote client

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RemoteError>;

/// PostgREST code returned when a single-row read matches no row.
pub const NO_ROWS_CODE: &str = "PGRST116";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RemoteError {
    /// The backend answered and supplied an error payload.
    #[error("{message}")]
    Server {
        status: Option<u16>,
        code: Option<String>,
        message: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid JSON from backend: {0}")]
    Decode(String),

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl RemoteError {
    pub fn server(message: impl Into<String>) -> Self {
        RemoteError::Server {
            status: None,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        RemoteError::Server {
            status: None,
            code: Some(code.into()),
            message: message.into(),
        }
    }

    pub fn no_rows() -> Self {
        RemoteError::Server {
            status: Some(406),
            code: Some(NO_ROWS_CODE.to_string()),
            message: "JSON object requested, multiple (or no) rows returned".to_string(),
        }
    }

    /// Message supplied by the backend, if it supplied one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            RemoteError::Server { message, .. } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            RemoteError::Server { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Server { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_no_rows(&self) -> bool {
        self.code() == Some(NO_ROWS_CODE)
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else {
            RemoteError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        RemoteError::Decode(err.to_string())
    }
}
