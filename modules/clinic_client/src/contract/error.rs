use thiserror::Error;

use crate::domain::ports::StorageError;

/// Errors surfaced by the clinic client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The server answered 401/403. The local session has already been torn
    /// down when this is returned; the caller should send the user to login.
    #[error("Session expired")]
    SessionExpired,

    /// Any other non-2xx response.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Network-level failure (unreachable host, transport timeout, ...).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx JSON body that does not match the expected record shape.
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// A record was expected but the server sent an empty/non-JSON response.
    #[error("Empty response from {path}")]
    EmptyResponse { path: String },

    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),

    /// The request could not be assembled (bad origin, unusable header value).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Local required-field check failed; no request was made.
    #[error("Validation error: {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
}

impl ClientError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// HTTP status of an `Api` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Failures a best-effort fetch may downgrade to an empty result.
    /// Session expiry is never one of them.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Api { .. } | Self::Transport(_) | Self::Decode(_) | Self::EmptyResponse { .. }
        )
    }
}
