use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use crate::api::TransportError;

/// Failures of authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer token is persisted.
    #[error("no token")]
    NoToken,

    /// The API rejected the request. `message` is the server's `detail` or a
    /// generic fallback and is safe to show to the user.
    #[error("{message}")]
    Rejected {
        status: StatusCode,
        message: String,
    },

    /// No response could be obtained.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The identity fetch exceeded its deadline.
    #[error("identity fetch timed out after {0:?}")]
    Timeout(Duration),

    /// A success response carried no token.
    #[error("response did not include an access token")]
    MissingAccessToken,

    /// A success response could not be decoded.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The session was reset while the identity fetch was in flight, so its
    /// result was discarded.
    #[error("session was reset during the identity fetch")]
    Superseded,
}

impl AuthError {
    /// Message to show on a form: the server's message for rejections,
    /// `fallback` for everything else.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            _ => fallback.to_string(),
        }
    }

    /// HTTP status reported by the API, if one was received.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
