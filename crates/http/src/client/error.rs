//! Client error types

use portal_core::ValidationError;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Failure of a dispatched API call
#[derive(Debug, Error)]
pub enum ClientError {
    /// Protected call attempted with no stored access credential
    #[error("Not authenticated")]
    Unauthenticated,

    /// The session could not be renewed; the caller must return to the
    /// unauthenticated state
    #[error("Authentication expired")]
    AuthenticationExpired,

    /// Server answered with a non-2xx status
    #[error("Server error {status}: {message}")]
    Api {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    /// Network or transport failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// 2xx response whose body does not match the endpoint contract
    #[error("Invalid response: {0}")]
    InvalidResponse(#[source] serde_json::Error),

    /// Request body could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Form input rejected before any request was made
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Build an `Api` error from a status and raw response body.
    ///
    /// The message is the first of `error`, `detail` or `message` found in a
    /// JSON body, then the raw text, then the status reason phrase.
    pub fn from_response(status: StatusCode, bytes: &[u8]) -> Self {
        let body = serde_json::from_slice::<Value>(bytes).ok();
        let message = body
            .as_ref()
            .and_then(extract_message)
            .or_else(|| {
                let text = String::from_utf8_lossy(bytes).trim().to_string();
                (!text.is_empty()).then_some(text)
            })
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());

        Self::Api {
            status: status.as_u16(),
            message,
            body,
        }
    }

    /// Errors that end the session rather than being shown inline
    pub fn is_auth_terminal(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::AuthenticationExpired)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Request(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn extract_message(body: &Value) -> Option<String> {
    ["error", "detail", "message"].iter().find_map(|key| {
        match body.get(key)? {
            Value::String(text) => Some(text.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    })
}

/// Terminal failure of a credential refresh. The store has been cleared
/// unless another session replaced it in the meantime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshDenied {
    #[error("no refresh credential stored")]
    MissingCredential,

    #[error("refresh credential rejected with status {status}")]
    Rejected { status: u16 },

    #[error("refresh request failed: {0}")]
    Transport(String),

    #[error("refresh response invalid: {0}")]
    InvalidResponse(String),

    /// Logout or a new login happened since the refresh was requested
    #[error("session changed while refreshing")]
    Superseded,
}
